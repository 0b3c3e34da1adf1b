//! The task-graph store (C1): load, read, and the exactly-two mutations
//! a task-graph document may undergo during a run — marking a task
//! completed, and appending a fix task discovered during integration
//! review. Every other field is read-only once the graph is validated.

use std::path::Path;

use orcharden_core::{Error, Result};

use crate::locks::effective_locks;
use crate::types::{TaskGraphDocument, TaskRecord};
use crate::validate::validate;

/// Capability token proving the caller is entitled to append a fix task.
///
/// A plain `bool` or no guard at all would let any call site append a
/// task; requiring this token instead means `append_fix_task` reads, at
/// the call site, as something only the integration pipeline is meant to
/// reach for — the orchestrator's own coordinator loop has no reason to
/// ever construct one. Only `orcharden-integrate` does, and its
/// `FixTaskAuthority` is the one place in the workspace that mints a
/// token, keeping the "only a fix task grows the graph" invariant
/// visible in one place even though the type itself doesn't forbid a
/// stray `FixTaskToken::mint()` elsewhere.
pub struct FixTaskToken(());

impl FixTaskToken {
    /// Mint a token. Prefer going through `orcharden-integrate`'s
    /// `FixTaskAuthority` rather than calling this directly outside the
    /// integration pipeline.
    pub fn mint() -> Self {
        Self(())
    }
}

/// An in-memory, validated task-graph, backed by its source file path so
/// callers can reload or re-persist it.
pub struct TaskGraphStore {
    doc: TaskGraphDocument,
}

impl TaskGraphStore {
    /// Load a task-graph document from a YAML file and validate it.
    /// Returns every structural defect found, not just the first.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_str(&text)
    }

    /// Parse and validate a task-graph document from YAML text directly,
    /// bypassing the filesystem. Used by tests and by callers that
    /// already have the document in memory.
    pub fn from_str(text: &str) -> Result<Self> {
        let doc: TaskGraphDocument = serde_yaml::from_str(text)?;
        let report = validate(&doc);
        if !report.is_valid() {
            let messages = report.errors.iter().map(|e| e.to_string()).collect();
            return Err(Error::Validation(messages));
        }
        Ok(Self { doc })
    }

    /// All task ids, in document order.
    pub fn task_ids(&self) -> Vec<&str> {
        self.doc.tasks.iter().map(|t| t.id.as_str()).collect()
    }

    /// Look up a task by id.
    pub fn get(&self, id: &str) -> Option<&TaskRecord> {
        self.doc.tasks.iter().find(|t| t.id == id)
    }

    /// A task's declared dependency ids.
    pub fn depends_on(&self, id: &str) -> &[String] {
        self.get(id).map(|t| t.depends_on.as_slice()).unwrap_or(&[])
    }

    /// A task's effective lock set (explicit `locks` plus locks inferred
    /// from `touches`), deduplicated in stable order.
    pub fn locks(&self, id: &str) -> Vec<String> {
        self.get(id).map(effective_locks).unwrap_or_default()
    }

    /// Whether a task is already marked completed.
    pub fn is_completed(&self, id: &str) -> bool {
        self.get(id).map(|t| t.completed).unwrap_or(false)
    }

    /// All tasks, in document order.
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.doc.tasks
    }

    pub fn branch_name(&self) -> Option<&str> {
        self.doc.branch_name.as_deref()
    }

    /// Mark a task completed. Idempotent: marking an already-completed
    /// task a second time is a no-op, not an error, since a resumed run
    /// may revisit tasks it already finished in a prior attempt.
    pub fn mark_completed(&mut self, id: &str) -> Result<()> {
        match self.doc.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.completed = true;
                Ok(())
            }
            None => Err(Error::Integration(format!("unknown task id: {id}"))),
        }
    }

    /// Append a fix task discovered during integration review. Requires
    /// a [`FixTaskToken`], so only the integration pipeline can grow the
    /// graph; the graph otherwise never gains tasks mid-run.
    pub fn append_fix_task(&mut self, _token: &FixTaskToken, task: TaskRecord) -> Result<()> {
        if self.doc.tasks.iter().any(|t| t.id == task.id) {
            return Err(Error::Integration(format!(
                "fix task id already exists: {}",
                task.id
            )));
        }
        self.doc.tasks.push(task);
        Ok(())
    }

    /// Serialize the current document back to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.doc)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version: 1
tasks:
  - id: T-1
    title: First task
  - id: T-2
    title: Second task
    dependsOn: [T-1]
"#;

    #[test]
    fn loads_and_reads_back_fields() {
        let store = TaskGraphStore::from_str(SAMPLE).unwrap();
        assert_eq!(store.task_ids(), vec!["T-1", "T-2"]);
        assert_eq!(store.depends_on("T-2"), &["T-1".to_string()]);
        assert!(!store.is_completed("T-1"));
    }

    #[test]
    fn mark_completed_is_idempotent() {
        let mut store = TaskGraphStore::from_str(SAMPLE).unwrap();
        store.mark_completed("T-1").unwrap();
        assert!(store.is_completed("T-1"));
        store.mark_completed("T-1").unwrap();
        assert!(store.is_completed("T-1"));
    }

    #[test]
    fn mark_completed_rejects_unknown_id() {
        let mut store = TaskGraphStore::from_str(SAMPLE).unwrap();
        assert!(store.mark_completed("T-missing").is_err());
    }

    #[test]
    fn append_fix_task_requires_token_and_rejects_duplicates() {
        let mut store = TaskGraphStore::from_str(SAMPLE).unwrap();
        let token = FixTaskToken::mint();
        let fix = TaskRecord::fix_task("FIX-001", "Resolve merge blocker");
        store.append_fix_task(&token, fix).unwrap();
        assert!(store.get("FIX-001").is_some());

        let dup = TaskRecord::fix_task("FIX-001", "Duplicate");
        assert!(store.append_fix_task(&token, dup).is_err());
    }

    #[test]
    fn rejects_invalid_graph_at_load() {
        let cyclic = "version: 1\ntasks:\n  - id: A\n    title: a\n    dependsOn: [A]\n";
        assert!(TaskGraphStore::from_str(cyclic).is_err());
    }
}
