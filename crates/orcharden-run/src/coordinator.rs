//! The run coordinator: the single loop tying together the scheduler
//! (C4), worktree manager (C5), agent supervisors (C6), failure
//! controller (C7), and artifact writer (C9). Exactly one task — this
//! loop — ever mutates scheduler state; supervisors run as independent
//! `tokio::spawn`ed units and report back over an `mpsc` channel, never
//! sharing the scheduler directly.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use orcharden_core::{Clock, Result};
use orcharden_engine::Engine;
use orcharden_graph::TaskGraphStore;
use orcharden_scheduler::{Scheduler, TaskInfo};
use orcharden_vcs::{VcsOps, WorktreeManager};
use tokio::sync::mpsc;
use tracing::warn;

use crate::artifact::{write_atomic, write_report, RunDirectory};
use crate::failure::FailureController;
use crate::report::{Report, ReportStatus};
use crate::supervisor::{Supervisor, SupervisorConfig};

/// Configuration for one run of the coordinator loop.
pub struct RunConfig {
    pub max_concurrent: usize,
    pub base_branch: String,
    pub external_failure_timeout: Duration,
    pub supervisor: SupervisorConfig,
}

/// A terminal outcome reported back from a supervisor task.
struct SupervisorReport {
    task_id: String,
    is_success: bool,
    report: Report,
    worktree: PathBuf,
    branch: String,
}

/// Everything the coordinator produced by the time the graph drained (or
/// the run was cut short by an external-failure latch).
pub struct RunSummary {
    pub reports: Vec<Report>,
    pub externally_failed: bool,
    pub deadlocked: bool,
}

/// Drive one run to completion: admit ready tasks up to the concurrency
/// cap, launch a supervisor per admission, and fold outcomes back into
/// scheduler state as they complete.
pub async fn run_coordinator_loop(
    store: &mut TaskGraphStore,
    engine: Arc<dyn Engine>,
    vcs: Arc<dyn VcsOps>,
    clock: Arc<dyn Clock>,
    run_dir: &RunDirectory,
    worktrees_root: PathBuf,
    config: RunConfig,
) -> Result<RunSummary> {
    let already_completed: Vec<String> = store
        .tasks()
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.id.clone())
        .collect();

    let task_infos: Vec<TaskInfo> = store
        .tasks()
        .iter()
        .map(|t| TaskInfo {
            id: t.id.clone(),
            depends_on: t.depends_on.clone(),
            locks: store.locks(&t.id),
        })
        .collect();

    let mut scheduler = Scheduler::new(task_infos, &already_completed);
    let mut failure_controller = FailureController::new();
    let mut reports = Vec::new();
    let mut running: HashSet<String> = HashSet::new();
    let mut agent_ordinals: HashMap<String, u32> = HashMap::new();

    let (tx, mut rx) = mpsc::channel::<SupervisorReport>(config.max_concurrent.max(1));

    loop {
        if !failure_controller.is_latched() {
            let ready: Vec<String> = scheduler.ready().into_iter().map(String::from).collect();
            for task_id in ready {
                if running.len() >= config.max_concurrent {
                    break;
                }
                scheduler.admit(&task_id)?;
                running.insert(task_id.clone());

                let ordinal = *agent_ordinals
                    .entry(task_id.clone())
                    .and_modify(|n| *n += 1)
                    .or_insert(0);

                let task = store
                    .get(&task_id)
                    .cloned()
                    .ok_or_else(|| orcharden_core::Error::Integration(format!("missing task {task_id}")))?;
                let effective_locks = store.locks(&task_id);

                let worktree_manager = WorktreeManager::new(vcs.as_ref(), worktrees_root.clone());
                let (worktree, branch) = worktree_manager
                    .provision(&task_id, ordinal, &config.base_branch)
                    .await?;

                let supervisor_config = config.supervisor.clone();
                let base_branch = config.base_branch.clone();
                let log_path = run_dir.log_path(&task_id);
                let tee_path = run_dir.root().join("reports").join(format!("{task_id}.tee"));
                let output_path = run_dir.root().join("reports").join(format!("{task_id}.out"));

                let engine = Arc::clone(&engine);
                let vcs_for_task = Arc::clone(&vcs);
                let clock_for_task = Arc::clone(&clock);
                let tx = tx.clone();
                let worktree_clone = worktree.clone();
                let branch_clone = branch.clone();

                tokio::spawn(async move {
                    let supervisor = Supervisor::new(
                        engine.as_ref(),
                        vcs_for_task.as_ref(),
                        clock_for_task.as_ref(),
                        supervisor_config,
                    );
                    let outcome = supervisor
                        .run(
                            &task,
                            &effective_locks,
                            &worktree_clone,
                            &branch_clone,
                            &base_branch,
                            &log_path,
                            &tee_path,
                            &output_path,
                        )
                        .await;
                    let report = match outcome {
                        Ok(outcome) => SupervisorReport {
                            task_id: task.id.clone(),
                            is_success: outcome.is_success,
                            report: outcome.report,
                            worktree: worktree_clone,
                            branch: branch_clone,
                        },
                        Err(e) => {
                            let message = e.to_string();
                            // `Supervisor::run` failed before producing its
                            // own report (e.g. provisioning the worktree
                            // failed), so no log file exists yet either.
                            if tokio::fs::metadata(&log_path).await.is_err() {
                                let _ = write_atomic(&log_path, message.as_bytes()).await;
                            }
                            SupervisorReport {
                                task_id: task.id.clone(),
                                is_success: false,
                                report: crate::report::Report {
                                    task_id: task.id.clone(),
                                    title: task.title.clone(),
                                    branch: branch_clone.clone(),
                                    status: ReportStatus::Failed,
                                    failure_type: Some(crate::report::FailureType::Unknown),
                                    error_message: Some(message),
                                    commits: 0,
                                    changed_files: String::new(),
                                    progress_notes: String::new(),
                                    timestamp: chrono::Utc::now(),
                                    engine: "unknown".to_string(),
                                    undeclared_touches: Vec::new(),
                                },
                                worktree: worktree_clone,
                                branch: branch_clone,
                            }
                        }
                    };
                    let _ = tx.send(report).await;
                });
            }
        }

        if running.is_empty() {
            if scheduler.is_done() {
                break;
            }
            if scheduler.is_deadlocked() {
                return Ok(RunSummary {
                    reports,
                    externally_failed: failure_controller.is_latched(),
                    deadlocked: true,
                });
            }
        }

        // Once the external-failure latch has tripped, stop waiting
        // indefinitely for the remaining supervisors: give them up to
        // `external_failure_timeout` to report back naturally (the
        // engine trait keeps process handles opaque, so there is no
        // stop-then-kill escalation available here), then give up on
        // the wait. Supervisors that are still running at that point
        // keep running to completion in the background; their eventual
        // reports are simply never folded into this summary.
        let outcome = if failure_controller.is_latched() {
            match tokio::time::timeout(config.external_failure_timeout, rx.recv()).await {
                Ok(Some(outcome)) => outcome,
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        outstanding = running.len(),
                        "external-failure drain timed out; finishing the run with partial reports"
                    );
                    break;
                }
            }
        } else {
            let Some(outcome) = rx.recv().await else {
                break;
            };
            outcome
        };
        running.remove(&outcome.task_id);

        if outcome.is_success {
            scheduler.complete(&outcome.task_id)?;
            store.mark_completed(&outcome.task_id)?;
            if vcs.is_clean(&outcome.worktree).await.unwrap_or(false) {
                let worktree_manager = WorktreeManager::new(vcs.as_ref(), worktrees_root.clone());
                let _ = worktree_manager
                    .teardown(&outcome.worktree, &outcome.branch)
                    .await;
            }
        } else {
            scheduler.fail(&outcome.task_id)?;
            if let (Some(kind), Some(message)) =
                (outcome.report.failure_type, outcome.report.error_message.clone())
            {
                failure_controller.observe(&outcome.task_id, &message, kind);
            }
        }

        write_report(run_dir, &outcome.report).await?;
        reports.push(outcome.report);

        if failure_controller.is_latched() && running.is_empty() {
            break;
        }
    }

    Ok(RunSummary {
        reports,
        externally_failed: failure_controller.is_latched(),
        deadlocked: false,
    })
}
