use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a task failed, used to decide whether the external-failure
/// controller should latch the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureType {
    External,
    Internal,
    Unknown,
}

/// Terminal status of one task, as persisted by the artifact writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Done,
    Failed,
}

/// One task's terminal report (C9 §3): everything persisted once a
/// supervisor finishes, regardless of outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "taskId")]
    pub task_id: String,
    pub title: String,
    pub branch: String,
    pub status: ReportStatus,
    #[serde(rename = "failureType", skip_serializing_if = "Option::is_none")]
    pub failure_type: Option<FailureType>,
    #[serde(rename = "errorMessage", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub commits: u64,
    #[serde(rename = "changedFiles")]
    pub changed_files: String,
    #[serde(rename = "progressNotes")]
    pub progress_notes: String,
    pub timestamp: DateTime<Utc>,
    /// Which concrete engine (`"a"`..`"d"`) produced this result. Not
    /// named in the persisted schema's original field list; carried so
    /// a run mixing engines across tasks (e.g. during a migration from
    /// one engine to another) stays auditable from the report alone.
    pub engine: String,
    /// Changed files outside the task's declared `touches`, when any
    /// were declared. A warning, not a failure — a task's `touches` is
    /// metadata the scheduler uses for lock inference, not a sandbox.
    #[serde(rename = "undeclaredTouches", default, skip_serializing_if = "Vec::is_empty")]
    pub undeclared_touches: Vec<String>,
}
