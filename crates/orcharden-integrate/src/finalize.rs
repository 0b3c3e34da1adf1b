//! Finalization (C8 step 4): merge the integration branch to base when
//! the review found no blockers, or else synthesize one fix task per
//! blocker and leave the integration branch for inspection.

use orcharden_core::Result;
use orcharden_graph::{FixTaskToken, TaskGraphStore, TaskRecord};
use orcharden_vcs::VcsOps;

use crate::review::ReviewReport;

/// The only place in the workspace that mints a [`FixTaskToken`] — see
/// that type's doc comment. Its only job is to make `append_fix_task`
/// reachable from exactly one call site in this crate.
pub struct FixTaskAuthority(FixTaskToken);

impl FixTaskAuthority {
    pub fn new() -> Self {
        Self(FixTaskToken::mint())
    }

    fn token(&self) -> &FixTaskToken {
        &self.0
    }
}

impl Default for FixTaskAuthority {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of the finalize step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    MergedToBase,
    /// The integration branch was preserved; these fix task ids were
    /// appended to the graph, one per blocker.
    FixTasksAppended(Vec<String>),
}

/// The highest `FIX-NNN` id already present in the graph, or 0 if none.
fn highest_existing_fix_number(store: &TaskGraphStore) -> u32 {
    store
        .tasks()
        .iter()
        .filter_map(|t| t.id.strip_prefix("FIX-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
}

/// Finalize the integration: merge to base if the review is clean,
/// otherwise append one fix task per blocker with IDs continuing from
/// the highest existing `FIX-NNN` id rather than always restarting at
/// `FIX-001` (a graph that already has fix tasks from a prior run keeps
/// growing its numbering rather than colliding with them).
pub async fn finalize(
    vcs: &dyn VcsOps,
    store: &mut TaskGraphStore,
    authority: &FixTaskAuthority,
    integration_branch: &str,
    base_worktree: &std::path::Path,
    review: &ReviewReport,
) -> Result<FinalizeOutcome> {
    if !review.has_blockers() {
        vcs.merge(base_worktree, integration_branch).await?;
        vcs.delete_branch(integration_branch).await?;
        return Ok(FinalizeOutcome::MergedToBase);
    }

    let mut next_number = highest_existing_fix_number(store) + 1;
    let mut appended = Vec::new();
    for blocker in review.blockers() {
        let id = format!("FIX-{next_number:03}");
        let task = TaskRecord::fix_task(id.clone(), format!("Resolve blocker: {}", blocker.description));
        store.append_fix_task(authority.token(), task)?;
        appended.push(id);
        next_number += 1;
    }

    Ok(FinalizeOutcome::FixTasksAppended(appended))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::{Issue, Severity};
    use orcharden_vcs::FakeVcs;

    const GRAPH: &str = "version: 1\ntasks:\n  - id: T-1\n    title: t1\n";

    fn review_with_blockers(n: usize) -> ReviewReport {
        ReviewReport {
            issues: (0..n)
                .map(|i| Issue {
                    severity: Severity::Blocker,
                    description: format!("blocker {i}"),
                    file: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn clean_review_merges_to_base() {
        let vcs = FakeVcs::new();
        vcs.seed_branch("integration/prd-1", 5, vec![], true);
        let mut store = TaskGraphStore::from_str(GRAPH).unwrap();
        let authority = FixTaskAuthority::new();
        let review = ReviewReport { issues: vec![] };

        let outcome = finalize(
            &vcs,
            &mut store,
            &authority,
            "integration/prd-1",
            std::path::Path::new("/tmp/base"),
            &review,
        )
        .await
        .unwrap();

        assert_eq!(outcome, FinalizeOutcome::MergedToBase);
    }

    #[tokio::test]
    async fn blockers_append_fix_tasks_without_merging() {
        let vcs = FakeVcs::new();
        let mut store = TaskGraphStore::from_str(GRAPH).unwrap();
        let authority = FixTaskAuthority::new();
        let review = review_with_blockers(2);

        let outcome = finalize(
            &vcs,
            &mut store,
            &authority,
            "integration/prd-1",
            std::path::Path::new("/tmp/base"),
            &review,
        )
        .await
        .unwrap();

        match outcome {
            FinalizeOutcome::FixTasksAppended(ids) => {
                assert_eq!(ids, vec!["FIX-001".to_string(), "FIX-002".to_string()]);
            }
            other => panic!("expected fix tasks, got {other:?}"),
        }
        assert!(store.get("FIX-001").is_some());
        assert!(store.get("FIX-002").is_some());
    }

    #[tokio::test]
    async fn fix_task_ids_continue_past_existing_ones() {
        let vcs = FakeVcs::new();
        let graph = "version: 1\ntasks:\n  - id: T-1\n    title: t1\n  - id: FIX-001\n    title: prior fix\n";
        let mut store = TaskGraphStore::from_str(graph).unwrap();
        let authority = FixTaskAuthority::new();
        let review = review_with_blockers(1);

        let outcome = finalize(
            &vcs,
            &mut store,
            &authority,
            "integration/prd-1",
            std::path::Path::new("/tmp/base"),
            &review,
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            FinalizeOutcome::FixTasksAppended(vec!["FIX-002".to_string()])
        );
    }
}
