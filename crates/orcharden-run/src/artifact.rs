//! The artifact writer (C9): persists per-task reports and logs under the
//! run directory. Every report is written atomically — to a temp path in
//! the same directory, then renamed into place — so a reader never sees
//! a partially written file, a step further than the teacher's direct
//! single-call write.

use std::path::{Path, PathBuf};

use orcharden_core::{escape_json_string, Error, Result};

use crate::report::Report;

/// Where a run's artifacts live, rooted at `artifacts/prd/<prd-id>`.
pub struct RunDirectory {
    root: PathBuf,
}

impl RunDirectory {
    pub fn new(artifacts_root: impl Into<PathBuf>, prd_id: &str) -> Self {
        Self {
            root: artifacts_root.into().join("prd").join(prd_id),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn report_path(&self, task_id: &str) -> PathBuf {
        self.reports_dir().join(format!("{task_id}.json"))
    }

    pub fn log_path(&self, task_id: &str) -> PathBuf {
        self.reports_dir().join(format!("{task_id}.log"))
    }

    pub fn review_report_path(&self) -> PathBuf {
        self.root.join("review-report.json")
    }

    pub async fn ensure_dirs(&self) -> Result<()> {
        tokio::fs::create_dir_all(self.reports_dir())
            .await
            .map_err(Error::Io)
    }
}

/// Write `contents` atomically: to a sibling temp file, then rename over
/// the destination. A concurrent reader sees either the old file or the
/// fully-written new one, never a partial write.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        Error::Artifact(format!("artifact path has no parent directory: {}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Artifact(format!("artifact path has no file name: {}", path.display())))?;
    let temp_path = dir.join(format!(".{file_name}.tmp"));

    tokio::fs::write(&temp_path, contents)
        .await
        .map_err(Error::Io)?;
    tokio::fs::rename(&temp_path, path).await.map_err(Error::Io)?;
    Ok(())
}

/// Serialize and atomically persist a task report as JSON.
pub async fn write_report(run_dir: &RunDirectory, report: &Report) -> Result<()> {
    run_dir.ensure_dirs().await?;
    let json = serde_json::to_vec_pretty(report)?;
    write_atomic(&run_dir.report_path(&report.task_id), &json).await
}

/// Atomically persist an agent's raw stderr/progress log for a task.
pub async fn write_log(run_dir: &RunDirectory, task_id: &str, contents: &str) -> Result<()> {
    run_dir.ensure_dirs().await?;
    write_atomic(&run_dir.log_path(task_id), contents.as_bytes()).await
}

/// Escape free-form text (e.g. progress notes pulled from an agent's own
/// log) before embedding it as a JSON string value by hand, as the
/// review-report synthesis step does when it is not going through
/// `serde_json`'s own escaping.
pub fn escape_for_embedding(text: &str) -> String {
    escape_json_string(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{FailureType, ReportStatus};
    use chrono::Utc;

    fn sample_report() -> Report {
        Report {
            task_id: "T-1".to_string(),
            title: "Do the thing".to_string(),
            branch: "orcharden/T-1/attempt-0".to_string(),
            status: ReportStatus::Failed,
            failure_type: Some(FailureType::Internal),
            error_message: Some("assertion failed".to_string()),
            commits: 0,
            changed_files: "src/lib.rs".to_string(),
            progress_notes: "ran tests".to_string(),
            timestamp: Utc::now(),
            engine: "a".to_string(),
            undeclared_touches: Vec::new(),
        }
    }

    #[tokio::test]
    async fn write_report_produces_valid_json_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = RunDirectory::new(dir.path(), "prd-42");
        let report = sample_report();
        write_report(&run_dir, &report).await.unwrap();

        let path = run_dir.report_path("T-1");
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["taskId"], "T-1");
        assert_eq!(parsed["status"], "failed");
    }

    #[tokio::test]
    async fn write_atomic_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_atomic(&path, b"{}").await.unwrap();

        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["out.json".to_string()]);
    }
}
