use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use orcharden_core::{Error, Result};

use crate::ops::VcsOps;

#[derive(Debug, Default, Clone)]
struct BranchState {
    commits_ahead: u64,
    changed_files: Vec<PathBuf>,
    merge_clean: bool,
}

/// An in-memory stand-in for [`VcsOps`], used by tests across the
/// workspace so the supervisor and integration pipeline can be exercised
/// without a real git repository or subprocess.
#[derive(Default)]
pub struct FakeVcs {
    branches: Mutex<HashMap<String, BranchState>>,
    worktrees: Mutex<Vec<PathBuf>>,
    /// Worktree paths (as strings) explicitly seeded as dirty;
    /// everything else reads as clean.
    dirty_worktrees: Mutex<Vec<String>>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a branch's state, as a test would, to control what
    /// `commit_count`/`changed_files`/`merge` observe.
    pub fn seed_branch(
        &self,
        branch: &str,
        commits_ahead: u64,
        changed_files: Vec<PathBuf>,
        merge_clean: bool,
    ) {
        let mut branches = self.branches.lock().unwrap_or_else(|e| e.into_inner());
        branches.insert(
            branch.to_string(),
            BranchState {
                commits_ahead,
                changed_files,
                merge_clean,
            },
        );
    }

    /// Mark a worktree as having uncommitted changes.
    pub fn seed_dirty(&self, worktree: &Path) {
        let mut dirty = self.dirty_worktrees.lock().unwrap_or_else(|e| e.into_inner());
        dirty.push(worktree.to_string_lossy().to_string());
    }

    pub fn worktree_paths(&self) -> Vec<PathBuf> {
        self.worktrees.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl VcsOps for FakeVcs {
    async fn create_branch(&self, name: &str, _base: &str) -> Result<()> {
        let mut branches = self.branches.lock().unwrap_or_else(|e| e.into_inner());
        branches.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn add_worktree(&self, path: &Path, _branch: &str) -> Result<()> {
        let mut worktrees = self.worktrees.lock().unwrap_or_else(|e| e.into_inner());
        worktrees.push(path.to_path_buf());
        Ok(())
    }

    async fn remove_worktree(&self, path: &Path) -> Result<()> {
        let mut worktrees = self.worktrees.lock().unwrap_or_else(|e| e.into_inner());
        worktrees.retain(|p| p != path);
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branches = self.branches.lock().unwrap_or_else(|e| e.into_inner());
        branches.remove(name);
        Ok(())
    }

    async fn prune_stale(&self) -> Result<()> {
        Ok(())
    }

    async fn commit_count(&self, _worktree: &Path, branch: &str, _base: &str) -> Result<u64> {
        let branches = self.branches.lock().unwrap_or_else(|e| e.into_inner());
        Ok(branches.get(branch).map(|b| b.commits_ahead).unwrap_or(0))
    }

    async fn changed_files(&self, _worktree: &Path, branch: &str, _base: &str) -> Result<Vec<PathBuf>> {
        let branches = self.branches.lock().unwrap_or_else(|e| e.into_inner());
        Ok(branches
            .get(branch)
            .map(|b| b.changed_files.clone())
            .unwrap_or_default())
    }

    async fn is_clean(&self, worktree: &Path) -> Result<bool> {
        let dirty = self.dirty_worktrees.lock().unwrap_or_else(|e| e.into_inner());
        Ok(!dirty.contains(&worktree.to_string_lossy().to_string()))
    }

    async fn merge(&self, _worktree: &Path, branch: &str) -> Result<bool> {
        let branches = self.branches.lock().unwrap_or_else(|e| e.into_inner());
        match branches.get(branch) {
            Some(state) => Ok(state.merge_clean),
            None => Err(Error::Vcs(format!("no such branch: {branch}"))),
        }
    }

    async fn merge_abort(&self, _worktree: &Path) -> Result<()> {
        Ok(())
    }
}
