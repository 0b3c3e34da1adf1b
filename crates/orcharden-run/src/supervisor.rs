//! The agent supervisor (C6): runs one task attempt end to end inside an
//! already-provisioned worktree — prompt assembly, engine invocation with
//! bounded retries, gating, and report production.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use orcharden_core::{Clock, Error, Result};
use orcharden_engine::{Engine, ExecuteOptions};
use orcharden_graph::TaskRecord;
use orcharden_vcs::VcsOps;

use crate::artifact::write_atomic;
use crate::failure;
use crate::gate::{passes_all_gates, GateInput};
use crate::prompt::assemble_prompt;
use crate::report::{FailureType, Report, ReportStatus};

/// Tunables for retry behavior. Push-mode (branch push + change-request
/// creation on success) is out of scope for this workspace's VCS port,
/// which models only local worktree/branch operations and never pushes
/// anywhere; the field is threaded through from the CLI purely so a
/// future VCS backend has somewhere to read the flag from. The decision
/// push-mode actually drives today — skip the integration pipeline —
/// lives one layer up, in the run command, not in the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub push_mode: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_secs(5),
            push_mode: false,
        }
    }
}

/// Everything the coordinator needs back from one completed attempt.
pub struct SupervisorOutcome {
    pub report: Report,
    pub is_success: bool,
}

pub struct Supervisor<'a> {
    engine: &'a dyn Engine,
    vcs: &'a dyn VcsOps,
    clock: &'a dyn Clock,
    config: SupervisorConfig,
}

impl<'a> Supervisor<'a> {
    pub fn new(
        engine: &'a dyn Engine,
        vcs: &'a dyn VcsOps,
        clock: &'a dyn Clock,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            engine,
            vcs,
            clock,
            config,
        }
    }

    /// Ensure the task spec and a progress file exist in the worktree
    /// before the agent starts, so it has something to append to.
    async fn prepare_worktree(&self, worktree: &Path, task: &TaskRecord) -> Result<()> {
        let spec_path = worktree.join(".orcharden-task.json");
        let spec_json = serde_json::to_vec_pretty(task)?;
        tokio::fs::write(&spec_path, spec_json)
            .await
            .map_err(Error::Io)?;

        let progress_path = worktree.join("PROGRESS.md");
        if tokio::fs::metadata(&progress_path).await.is_err() {
            tokio::fs::write(&progress_path, format!("# Progress: {}\n", task.id))
                .await
                .map_err(Error::Io)?;
        }
        Ok(())
    }

    /// Run one task attempt to completion, applying bounded retries on
    /// empty or error-payload output, then the commit and error-payload
    /// gates, and produce the terminal report either way.
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &self,
        task: &TaskRecord,
        effective_locks: &[String],
        worktree: &Path,
        branch: &str,
        base_branch: &str,
        log_path: &Path,
        tee_path: &Path,
        output_path: &Path,
    ) -> Result<SupervisorOutcome> {
        self.prepare_worktree(worktree, task).await?;
        let prompt = assemble_prompt(task, effective_locks);

        let options = ExecuteOptions {
            asynchronous: false,
            working_directory: Some(worktree.to_path_buf()),
            log_file: Some(log_path.to_path_buf()),
            tee_file: Some(tee_path.to_path_buf()),
        };

        let mut attempt = 0;
        let outcome_result = loop {
            let result = self.engine.execute(&prompt, output_path, &options).await;
            match result {
                Ok(outcome) => {
                    let retryable = outcome.response_text.trim().is_empty()
                        || !gate_passes_payload(&outcome.response_text);
                    if retryable && attempt < self.config.max_retries {
                        attempt += 1;
                        self.clock.sleep(self.config.retry_delay).await;
                        continue;
                    }
                    break Ok(outcome);
                }
                Err(e) => {
                    if attempt < self.config.max_retries {
                        attempt += 1;
                        self.clock.sleep(self.config.retry_delay).await;
                        continue;
                    }
                    break Err(e);
                }
            }
        };

        match outcome_result {
            Ok(outcome) => {
                let commit_count = self.vcs.commit_count(worktree, branch, base_branch).await?;
                let changed = self.vcs.changed_files(worktree, branch, base_branch).await?;
                let changed_files = join_paths(&changed);
                let progress_notes = read_progress_tail(worktree).await;

                let gate_input = GateInput {
                    commit_count,
                    response_text: outcome.response_text.clone(),
                };

                let undeclared = undeclared_touches(task, &changed);

                if passes_all_gates(&gate_input) {
                    let mut report =
                        success_report(task, branch, commit_count, &changed_files, self.engine.name());
                    report.undeclared_touches = undeclared;
                    report.progress_notes = progress_notes;
                    Ok(SupervisorOutcome {
                        report,
                        is_success: true,
                    })
                } else {
                    let reason = if commit_count == 0 {
                        "agent terminated without making any commits"
                    } else {
                        "agent output contained an error payload"
                    };
                    let mut report = failed_report(
                        task,
                        branch,
                        commit_count,
                        &changed_files,
                        self.engine.name(),
                        FailureType::Internal,
                        reason,
                    );
                    report.undeclared_touches = undeclared;
                    report.progress_notes = progress_notes;
                    Ok(SupervisorOutcome {
                        report,
                        is_success: false,
                    })
                }
            }
            Err(e) => {
                let message = e.to_string();
                let kind = failure::classify(&message);
                // The engine only writes `log_path` itself once it gets far
                // enough to capture stderr; a spawn failure (binary not
                // found, missing pipes) never reaches that point, so every
                // failed task still needs a log file on disk.
                if tokio::fs::metadata(log_path).await.is_err() {
                    let _ = write_atomic(log_path, message.as_bytes()).await;
                }
                let mut report = failed_report(task, branch, 0, "", self.engine.name(), kind, &message);
                report.progress_notes = read_progress_tail(worktree).await;
                Ok(SupervisorOutcome {
                    report,
                    is_success: false,
                })
            }
        }
    }
}

/// Tail of the agent's own `PROGRESS.md`, read back from the worktree
/// after the engine invocation finishes. Empty if the file was never
/// written past its initial placeholder, or can't be read at all.
async fn read_progress_tail(worktree: &Path) -> String {
    match tokio::fs::read_to_string(worktree.join("PROGRESS.md")).await {
        Ok(text) => tail_lines(&text, 20),
        Err(_) => String::new(),
    }
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

fn gate_passes_payload(response_text: &str) -> bool {
    let input = GateInput {
        commit_count: 1,
        response_text: response_text.to_string(),
    };
    crate::gate::error_payload_gate(&input)
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Changed files not covered by the task's declared `touches`. Empty
/// when the task declared no `touches` at all — there is nothing to
/// compare against, not a free pass.
fn undeclared_touches(task: &TaskRecord, changed: &[PathBuf]) -> Vec<String> {
    if task.touches.is_empty() {
        return Vec::new();
    }
    changed
        .iter()
        .map(|p| p.to_string_lossy().to_string())
        .filter(|p| !task.touches.contains(p))
        .collect()
}

fn success_report(task: &TaskRecord, branch: &str, commits: u64, changed_files: &str, engine: &str) -> Report {
    Report {
        task_id: task.id.clone(),
        title: task.title.clone(),
        branch: branch.to_string(),
        status: ReportStatus::Done,
        failure_type: None,
        error_message: None,
        commits,
        changed_files: changed_files.to_string(),
        progress_notes: String::new(),
        timestamp: Utc::now(),
        engine: engine.to_string(),
        undeclared_touches: Vec::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn failed_report(
    task: &TaskRecord,
    branch: &str,
    commits: u64,
    changed_files: &str,
    engine: &str,
    failure_type: FailureType,
    message: &str,
) -> Report {
    Report {
        task_id: task.id.clone(),
        title: task.title.clone(),
        branch: branch.to_string(),
        status: ReportStatus::Failed,
        failure_type: Some(failure_type),
        error_message: Some(message.to_string()),
        commits,
        changed_files: changed_files.to_string(),
        progress_notes: String::new(),
        timestamp: Utc::now(),
        engine: engine.to_string(),
        undeclared_touches: Vec::new(),
    }
}
