//! The DAG + resource-lock scheduler (C4): one coordinator-owned object
//! deciding which tasks are ready to run, admitting them, and tracking
//! which locks are held by which running task.
//!
//! Grounded on the same shape as a dependency-and-resource scheduler: a
//! `running` set, `occupied` lock map, and a `get_runnable_tasks`/
//! `is_blocked` pair — generalized here from single-resource occupancy to
//! a named multi-lock model, since a task can declare more than one lock.

use std::collections::HashMap;

use orcharden_core::{Error, Result};

use crate::types::{BlockReason, TaskInfo, TaskState};

/// Owns the entire scheduling decision for one run. Intended to have
/// exactly one writer (the coordinator task) — see the workspace's
/// concurrency model, where supervisors report outcomes back over a
/// channel rather than mutating this directly.
pub struct Scheduler {
    tasks: HashMap<String, TaskInfo>,
    state: HashMap<String, TaskState>,
    /// Declaration order, used to break ties between equally-ready tasks
    /// so admission order is deterministic across runs.
    seq: HashMap<String, u64>,
    /// Lock name -> id of the task currently holding it.
    holder: HashMap<String, String>,
}

impl Scheduler {
    /// Build a scheduler from the task list and the set of ids already
    /// marked completed in the persisted graph (so a resumed run doesn't
    /// re-admit finished work).
    pub fn new(tasks: Vec<TaskInfo>, already_completed: &[String]) -> Self {
        let mut state = HashMap::new();
        let mut seq = HashMap::new();
        let mut by_id = HashMap::new();
        for (index, task) in tasks.into_iter().enumerate() {
            let id = task.id.clone();
            let initial = if already_completed.contains(&id) {
                TaskState::Completed
            } else {
                TaskState::Pending
            };
            state.insert(id.clone(), initial);
            seq.insert(id.clone(), index as u64);
            by_id.insert(id, task);
        }
        Self {
            tasks: by_id,
            state,
            seq,
            holder: HashMap::new(),
        }
    }

    pub fn state_of(&self, id: &str) -> Option<TaskState> {
        self.state.get(id).copied()
    }

    fn dependencies_met(&self, task: &TaskInfo) -> bool {
        task.depends_on
            .iter()
            .all(|dep| matches!(self.state.get(dep.as_str()), Some(TaskState::Completed)))
    }

    fn lock_conflicts(&self, task: &TaskInfo) -> Vec<(String, String)> {
        task.locks
            .iter()
            .filter_map(|lock| {
                self.holder
                    .get(lock.as_str())
                    .filter(|holder_id| *holder_id != &task.id)
                    .map(|holder_id| (lock.clone(), holder_id.clone()))
            })
            .collect()
    }

    /// Why a pending task cannot be admitted right now. Empty on both
    /// fields means the task is ready.
    pub fn explain_block(&self, id: &str) -> BlockReason {
        let Some(task) = self.tasks.get(id) else {
            return BlockReason::default();
        };
        let unmet_dependencies = task
            .depends_on
            .iter()
            .filter(|dep| !matches!(self.state.get(dep.as_str()), Some(TaskState::Completed)))
            .cloned()
            .collect();
        BlockReason {
            unmet_dependencies,
            lock_conflicts: self.lock_conflicts(task),
        }
    }

    /// Every pending task whose dependencies are satisfied and whose
    /// locks are free, in deterministic (declaration) order.
    pub fn ready(&self) -> Vec<&str> {
        let mut ready: Vec<&str> = self
            .tasks
            .values()
            .filter(|task| self.state.get(task.id.as_str()) == Some(&TaskState::Pending))
            .filter(|task| self.dependencies_met(task))
            .filter(|task| self.lock_conflicts(task).is_empty())
            .map(|task| task.id.as_str())
            .collect();
        ready.sort_by_key(|id| self.seq.get(*id).copied().unwrap_or(u64::MAX));
        ready
    }

    /// Admit a ready task: transition it to `Running` and acquire its
    /// locks. Fails if the task is not actually ready, so callers can't
    /// accidentally double-admit or jump a lock.
    pub fn admit(&mut self, id: &str) -> Result<()> {
        let task = self
            .tasks
            .get(id)
            .ok_or_else(|| Error::Integration(format!("unknown task id: {id}")))?
            .clone();
        if self.state.get(id) != Some(&TaskState::Pending) {
            return Err(Error::Integration(format!(
                "task {id} is not pending, cannot admit"
            )));
        }
        if !self.dependencies_met(&task) {
            return Err(Error::Integration(format!(
                "task {id} has unmet dependencies"
            )));
        }
        if !self.lock_conflicts(&task).is_empty() {
            return Err(Error::Integration(format!(
                "task {id} has conflicting locks held"
            )));
        }
        for lock in &task.locks {
            self.holder.insert(lock.clone(), id.to_string());
        }
        self.state.insert(id.to_string(), TaskState::Running);
        Ok(())
    }

    fn release_locks(&mut self, id: &str) {
        if let Some(task) = self.tasks.get(id) {
            for lock in &task.locks {
                if self.holder.get(lock.as_str()).map(String::as_str) == Some(id) {
                    self.holder.remove(lock.as_str());
                }
            }
        }
    }

    /// Mark a running task completed and release its locks.
    pub fn complete(&mut self, id: &str) -> Result<()> {
        if self.state.get(id) != Some(&TaskState::Running) {
            return Err(Error::Integration(format!("task {id} is not running")));
        }
        self.release_locks(id);
        self.state.insert(id.to_string(), TaskState::Completed);
        Ok(())
    }

    /// Mark a running task failed and release its locks. Dependents stay
    /// `Pending` forever: there is no automatic retry path at the
    /// scheduler level, only at the supervisor level (see C6/C7).
    pub fn fail(&mut self, id: &str) -> Result<()> {
        if self.state.get(id) != Some(&TaskState::Running) {
            return Err(Error::Integration(format!("task {id} is not running")));
        }
        self.release_locks(id);
        self.state.insert(id.to_string(), TaskState::Failed);
        Ok(())
    }

    /// True if every task has reached a terminal state.
    pub fn is_done(&self) -> bool {
        self.state
            .values()
            .all(|s| matches!(s, TaskState::Completed | TaskState::Failed))
    }

    /// True if the run is stuck: no task is running, at least one task
    /// is still pending, and none of the pending tasks are ready. This
    /// can only happen due to a failed dependency (since the graph was
    /// already validated acyclic at load time) — it is not itself a
    /// lock deadlock, which the scheduler's single-admission-at-a-time
    /// design makes structurally impossible.
    pub fn is_deadlocked(&self) -> bool {
        let any_running = self
            .state
            .values()
            .any(|s| matches!(s, TaskState::Running));
        let any_pending = self
            .state
            .values()
            .any(|s| matches!(s, TaskState::Pending));
        any_pending && !any_running && self.ready().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: &str, deps: &[&str], locks: &[&str]) -> TaskInfo {
        TaskInfo {
            id: id.to_string(),
            depends_on: deps.iter().map(|s| s.to_string()).collect(),
            locks: locks.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn independent_tasks_are_all_ready() {
        let scheduler = Scheduler::new(vec![info("A", &[], &[]), info("B", &[], &[])], &[]);
        assert_eq!(scheduler.ready(), vec!["A", "B"]);
    }

    #[test]
    fn dependent_task_is_blocked_until_dependency_completes() {
        let mut scheduler = Scheduler::new(vec![info("A", &[], &[]), info("B", &["A"], &[])], &[]);
        assert_eq!(scheduler.ready(), vec!["A"]);
        scheduler.admit("A").unwrap();
        scheduler.complete("A").unwrap();
        assert_eq!(scheduler.ready(), vec!["B"]);
    }

    #[test]
    fn shared_lock_serializes_two_otherwise_independent_tasks() {
        let mut scheduler =
            Scheduler::new(vec![info("A", &[], &["lockfile"]), info("B", &[], &["lockfile"])], &[]);
        assert_eq!(scheduler.ready(), vec!["A", "B"]);
        scheduler.admit("A").unwrap();
        assert_eq!(scheduler.ready(), Vec::<&str>::new());
        let reason = scheduler.explain_block("B");
        assert_eq!(reason.lock_conflicts, vec![("lockfile".to_string(), "A".to_string())]);
        scheduler.complete("A").unwrap();
        assert_eq!(scheduler.ready(), vec!["B"]);
    }

    #[test]
    fn failed_dependency_leaves_dependent_pending_forever() {
        let mut scheduler = Scheduler::new(vec![info("A", &[], &[]), info("B", &["A"], &[])], &[]);
        scheduler.admit("A").unwrap();
        scheduler.fail("A").unwrap();
        assert_eq!(scheduler.state_of("B"), Some(TaskState::Pending));
        assert!(scheduler.ready().is_empty());
        assert!(scheduler.is_deadlocked());
    }

    #[test]
    fn already_completed_tasks_are_seeded_on_resume() {
        let scheduler = Scheduler::new(
            vec![info("A", &[], &[]), info("B", &["A"], &[])],
            &["A".to_string()],
        );
        assert_eq!(scheduler.state_of("A"), Some(TaskState::Completed));
        assert_eq!(scheduler.ready(), vec!["B"]);
    }

    #[test]
    fn admit_rejects_a_task_that_is_not_ready() {
        let mut scheduler = Scheduler::new(vec![info("A", &[], &[]), info("B", &["A"], &[])], &[]);
        assert!(scheduler.admit("B").is_err());
    }
}
