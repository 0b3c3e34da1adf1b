/// The scheduler's view of one task: just enough to decide readiness and
/// lock contention. Deliberately decoupled from the task-graph's YAML
/// shape (`orcharden-graph::TaskRecord`) so the scheduler can be driven
/// by anything that can produce this, including tests.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub id: String,
    pub depends_on: Vec<String>,
    pub locks: Vec<String>,
}

/// A task's lifecycle state inside a single run.
///
/// `Failed` is terminal and does not revert: a failed task's locks are
/// released so siblings can proceed, but its dependents remain `Pending`
/// forever unless a fix task is appended upstream (in `orcharden-graph`)
/// and a new `Scheduler` is built over the updated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Why a task is not currently admissible, returned by
/// [`crate::Scheduler::explain_block`] for progress reporting and
/// deadlock diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockReason {
    pub unmet_dependencies: Vec<String>,
    /// `(lock name, id of the task currently holding it)` pairs.
    pub lock_conflicts: Vec<(String, String)>,
}

impl BlockReason {
    pub fn is_blocked(&self) -> bool {
        !self.unmet_dependencies.is_empty() || !self.lock_conflicts.is_empty()
    }
}
