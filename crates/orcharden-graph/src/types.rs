use serde::{Deserialize, Serialize};

/// A single task record as it appears in the persisted task-graph document.
///
/// Mirrors the wire format in `spec.md` §6: every optional field defaults
/// to empty/false on read, and the legacy `mutex` field name is accepted
/// as an alias for `locks` so older task-graphs keep loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, rename = "dependsOn")]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub touches: Vec<String>,
    #[serde(default, alias = "mutex")]
    pub locks: Vec<String>,
    #[serde(default, rename = "mergeNotes")]
    pub merge_notes: String,
    #[serde(default)]
    pub verify: Vec<String>,
}

impl TaskRecord {
    /// Construct a fix task: empty deps, empty locks, a deterministic ID.
    /// Used only by the integration pipeline (C8) when appending corrective
    /// tasks for reviewer-reported blockers.
    pub fn fix_task(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            depends_on: Vec::new(),
            touches: Vec::new(),
            locks: Vec::new(),
            merge_notes: String::new(),
            verify: Vec::new(),
        }
    }
}

/// The top-level persisted task-graph document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGraphDocument {
    pub version: u64,
    #[serde(default, rename = "branchName")]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// Schema version this build understands. `spec.md` §6: unrecognized
/// versions fail with a dedicated error at load time.
pub const SUPPORTED_SCHEMA_VERSION: u64 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_mutex_alias_reads_as_locks() {
        let yaml = r#"
id: T-1
title: Legacy task
mutex: ["lockfile"]
"#;
        let task: TaskRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(task.locks, vec!["lockfile".to_string()]);
    }

    #[test]
    fn defaults_are_empty() {
        let yaml = r#"
id: T-1
title: Minimal task
"#;
        let task: TaskRecord = serde_yaml::from_str(yaml).unwrap();
        assert!(!task.completed);
        assert!(task.depends_on.is_empty());
        assert!(task.touches.is_empty());
        assert!(task.locks.is_empty());
        assert_eq!(task.merge_notes, "");
    }

    #[test]
    fn fix_task_has_no_deps_or_locks() {
        let task = TaskRecord::fix_task("FIX-001", "Resolve blocker: X");
        assert!(task.depends_on.is_empty());
        assert!(task.locks.is_empty());
        assert_eq!(task.title, "Resolve blocker: X");
    }
}
