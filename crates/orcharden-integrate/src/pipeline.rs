//! The integration pipeline (C8): create the integration branch, merge
//! completed tasks' branches in dependency order, run a semantic review,
//! and finalize. Runs only when at least one task completed and
//! push-mode is disabled, per the orchestrator's control flow.

use std::path::Path;

use orcharden_core::{Error, Result};
use orcharden_engine::{Engine, ExecuteOptions};
use orcharden_graph::TaskGraphStore;
use orcharden_vcs::VcsOps;

use crate::finalize::{finalize, FinalizeOutcome, FixTaskAuthority};
use crate::merge::{merge_task_branch, topological_order, MergeOutcome};
use crate::review::ReviewReport;

/// What happened to one task's branch during the merge step.
#[derive(Debug, Clone)]
pub struct MergeRecord {
    pub task_id: String,
    pub outcome: MergeOutcome,
}

/// The integration pipeline's overall result.
#[derive(Debug, Clone)]
pub enum IntegrationOutcome {
    /// At least one branch was left unresolved; the pipeline stops
    /// before running review.
    MergeIncomplete { records: Vec<MergeRecord> },
    Finalized {
        records: Vec<MergeRecord>,
        finalize: FinalizeOutcome,
    },
}

/// Run the full integration pipeline over every completed task.
pub async fn run_integration_pipeline(
    vcs: &dyn VcsOps,
    conflict_resolver: &dyn Engine,
    reviewer: &dyn Engine,
    store: &mut TaskGraphStore,
    base_branch: &str,
    integration_branch: &str,
    integration_worktree: &Path,
    reports_summary: &str,
) -> Result<IntegrationOutcome> {
    vcs.create_branch(integration_branch, base_branch).await?;
    vcs.add_worktree(integration_worktree, integration_branch)
        .await?;

    let completed_tasks: Vec<_> = store
        .tasks()
        .iter()
        .filter(|t| t.completed)
        .cloned()
        .collect();
    let order = topological_order(&completed_tasks);

    let mut records = Vec::new();
    let mut any_unresolved = false;
    for task_id in &order {
        let task = store
            .get(task_id)
            .cloned()
            .ok_or_else(|| Error::Integration(format!("completed task {task_id} vanished from the graph")))?;
        // Branch naming mirrors the worktree manager's convention for a
        // task's most recent (successful) attempt; integration always
        // merges attempt 0 since a task only completes on its first
        // successful attempt in this workspace's retry model.
        let branch = format!("orcharden/{task_id}/attempt-0");

        let outcome = merge_task_branch(vcs, conflict_resolver, integration_worktree, &task, &branch).await?;
        if matches!(outcome, MergeOutcome::Unresolved { .. }) {
            any_unresolved = true;
        }
        records.push(MergeRecord {
            task_id: task_id.clone(),
            outcome,
        });
    }

    if any_unresolved {
        return Ok(IntegrationOutcome::MergeIncomplete { records });
    }

    let review_prompt = format!(
        "Review the integration branch diff against base and the accumulated task reports.\n\n{reports_summary}"
    );
    let review_output_path = integration_worktree.join("review-report.json");
    reviewer
        .execute(&review_prompt, &review_output_path, &ExecuteOptions::default())
        .await?;

    let review_text = tokio::fs::read_to_string(&review_output_path)
        .await
        .map_err(Error::Io)?;
    let review: ReviewReport = serde_json::from_str(&review_text)?;

    let authority = FixTaskAuthority::new();
    let finalize_outcome = finalize(
        vcs,
        store,
        &authority,
        integration_branch,
        integration_worktree,
        &review,
    )
    .await?;

    Ok(IntegrationOutcome::Finalized {
        records,
        finalize: finalize_outcome,
    })
}
