//! Worktree lifecycle management (C5): provisioning a fresh branch and
//! worktree for a task before a supervisor launches its agent, and
//! tearing both down once the task reaches a terminal state.

use std::path::{Path, PathBuf};

use orcharden_core::Result;

use crate::ops::VcsOps;

/// Derive the branch name for one agent attempt at one task.
///
/// Not part of the persisted task-graph document: the branch name is
/// runtime state, reconstructible from `(task_id, agent_ordinal)`, so a
/// resumed run can recompute it rather than needing to store it.
pub fn branch_name(task_id: &str, agent_ordinal: u32) -> String {
    format!("orcharden/{task_id}/attempt-{agent_ordinal}")
}

/// Derive the worktree directory for one agent attempt.
pub fn worktree_path(worktrees_root: &Path, task_id: &str, agent_ordinal: u32) -> PathBuf {
    worktrees_root.join(format!("{task_id}-{agent_ordinal}"))
}

/// Provisions and tears down per-task worktrees around a [`VcsOps`] port.
pub struct WorktreeManager<'a> {
    vcs: &'a dyn VcsOps,
    worktrees_root: PathBuf,
}

impl<'a> WorktreeManager<'a> {
    pub fn new(vcs: &'a dyn VcsOps, worktrees_root: impl Into<PathBuf>) -> Self {
        Self {
            vcs,
            worktrees_root: worktrees_root.into(),
        }
    }

    /// Create the branch and worktree for one task attempt, in that
    /// order: a worktree cannot be added for a branch that doesn't exist
    /// yet.
    ///
    /// First prunes stale worktree metadata and deletes any branch left
    /// over from a crashed prior run of this same attempt — `git branch
    /// name base` fails outright if the branch already exists, which a
    /// resumed run would otherwise hit every time.
    pub async fn provision(
        &self,
        task_id: &str,
        agent_ordinal: u32,
        base_branch: &str,
    ) -> Result<(PathBuf, String)> {
        let branch = branch_name(task_id, agent_ordinal);
        let path = worktree_path(&self.worktrees_root, task_id, agent_ordinal);
        self.vcs.prune_stale().await?;
        let _ = self.vcs.delete_branch(&branch).await;
        self.vcs.create_branch(&branch, base_branch).await?;
        self.vcs.add_worktree(&path, &branch).await?;
        Ok((path, branch))
    }

    /// Tear down a task attempt's worktree and branch, in that order: a
    /// branch checked out by a worktree cannot be deleted until the
    /// worktree referencing it is removed.
    pub async fn teardown(&self, path: &Path, branch: &str) -> Result<()> {
        self.vcs.remove_worktree(path).await?;
        self.vcs.delete_branch(branch).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeVcs;

    #[test]
    fn branch_and_worktree_names_are_deterministic() {
        assert_eq!(branch_name("T-1", 2), "orcharden/T-1/attempt-2");
        assert_eq!(
            worktree_path(Path::new("/tmp/wt"), "T-1", 2),
            PathBuf::from("/tmp/wt/T-1-2")
        );
    }

    #[tokio::test]
    async fn provision_creates_branch_before_worktree() {
        let vcs = FakeVcs::new();
        let manager = WorktreeManager::new(&vcs, "/tmp/worktrees");
        let (path, branch) = manager.provision("T-1", 0, "main").await.unwrap();
        assert_eq!(branch, "orcharden/T-1/attempt-0");
        assert_eq!(vcs.worktree_paths(), vec![path]);
    }

    #[tokio::test]
    async fn teardown_removes_worktree() {
        let vcs = FakeVcs::new();
        let manager = WorktreeManager::new(&vcs, "/tmp/worktrees");
        let (path, branch) = manager.provision("T-1", 0, "main").await.unwrap();
        manager.teardown(&path, &branch).await.unwrap();
        assert!(vcs.worktree_paths().is_empty());
    }
}
