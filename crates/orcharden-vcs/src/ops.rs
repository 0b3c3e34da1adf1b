use std::path::{Path, PathBuf};

use async_trait::async_trait;
use orcharden_core::Result;

/// Version-control operations the supervisor and integration pipeline
/// need, as an injectable port.
///
/// One real implementation ([`crate::GitVcs`]) shells out to `git`; tests
/// use an in-memory fake instead so they never touch a real repository
/// or spawn a process — the same seam the workspace uses for its agent
/// engine port.
#[async_trait]
pub trait VcsOps: Send + Sync {
    /// Create a branch from `base` without checking it out.
    async fn create_branch(&self, name: &str, base: &str) -> Result<()>;

    /// Add a worktree at `path`, checked out to `branch`.
    async fn add_worktree(&self, path: &Path, branch: &str) -> Result<()>;

    /// Remove a worktree directory, detaching it from the repository's
    /// worktree list. Does not delete the branch.
    async fn remove_worktree(&self, path: &Path) -> Result<()>;

    /// Delete a branch outright. Only called after its worktree has
    /// already been removed and the branch has been merged or abandoned.
    async fn delete_branch(&self, name: &str) -> Result<()>;

    /// Prune worktree metadata left behind by worktrees whose directories
    /// were removed outside of `git worktree remove` (e.g. a crashed run).
    async fn prune_stale(&self) -> Result<()>;

    /// Number of commits a branch has ahead of `base`. Used to gate
    /// whether an agent actually made progress.
    async fn commit_count(&self, worktree: &Path, branch: &str, base: &str) -> Result<u64>;

    /// Paths changed by a branch relative to `base`.
    async fn changed_files(&self, worktree: &Path, branch: &str, base: &str) -> Result<Vec<PathBuf>>;

    /// Whether a worktree has no uncommitted changes.
    async fn is_clean(&self, worktree: &Path) -> Result<bool>;

    /// Merge `branch` into the currently checked-out branch of
    /// `worktree`. Returns `Ok(true)` on a clean merge, `Ok(false)` if
    /// the merge left conflict markers (the caller decides how to
    /// resolve); only returns `Err` for a genuine VCS failure.
    async fn merge(&self, worktree: &Path, branch: &str) -> Result<bool>;

    /// Abort an in-progress merge left in a conflicted state.
    async fn merge_abort(&self, worktree: &Path) -> Result<()>;
}
