use std::path::{Path, PathBuf};

use async_trait::async_trait;
use orcharden_core::{Error, Result};

use crate::ops::VcsOps;

/// A `VcsOps` implementation that shells out to the system `git` binary,
/// the same way the workspace's agent engine adapters shell out to their
/// respective CLIs: build a `tokio::process::Command`, capture output,
/// and turn a non-zero exit into a typed error carrying stderr.
pub struct GitVcs {
    /// The repository root `git` commands are run against for
    /// branch/worktree-list operations that don't take a worktree path.
    repo_root: PathBuf,
}

impl GitVcs {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let output = tokio::process::Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::Vcs(format!("failed to spawn git {args:?}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Vcs(format!(
                "git {args:?} failed (exit {}): {stderr}",
                output.status.code().unwrap_or(-1)
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VcsOps for GitVcs {
    async fn create_branch(&self, name: &str, base: &str) -> Result<()> {
        self.run(&self.repo_root, &["branch", name, base]).await?;
        Ok(())
    }

    async fn add_worktree(&self, path: &Path, branch: &str) -> Result<()> {
        let path_str = path.to_string_lossy();
        self.run(&self.repo_root, &["worktree", "add", &path_str, branch])
            .await?;
        Ok(())
    }

    async fn remove_worktree(&self, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        self.run(&self.repo_root, &["worktree", "remove", "--force", &path_str])
            .await?;
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        self.run(&self.repo_root, &["branch", "-D", name]).await?;
        Ok(())
    }

    async fn prune_stale(&self) -> Result<()> {
        self.run(&self.repo_root, &["worktree", "prune"]).await?;
        Ok(())
    }

    async fn commit_count(&self, worktree: &Path, branch: &str, base: &str) -> Result<u64> {
        let range = format!("{base}..{branch}");
        let out = self
            .run(worktree, &["rev-list", "--count", &range])
            .await?;
        out.parse::<u64>()
            .map_err(|e| Error::Vcs(format!("could not parse commit count {out:?}: {e}")))
    }

    async fn changed_files(&self, worktree: &Path, branch: &str, base: &str) -> Result<Vec<PathBuf>> {
        let range = format!("{base}..{branch}");
        let out = self
            .run(worktree, &["diff", "--name-only", &range])
            .await?;
        Ok(out.lines().map(PathBuf::from).collect())
    }

    async fn is_clean(&self, worktree: &Path) -> Result<bool> {
        let out = self.run(worktree, &["status", "--porcelain"]).await?;
        Ok(out.is_empty())
    }

    async fn merge(&self, worktree: &Path, branch: &str) -> Result<bool> {
        let output = tokio::process::Command::new("git")
            .arg("-C")
            .arg(worktree)
            .args(["merge", "--no-edit", branch])
            .output()
            .await
            .map_err(|e| Error::Vcs(format!("failed to spawn git merge: {e}")))?;
        if output.status.success() {
            return Ok(true);
        }
        let status = self.run(worktree, &["status", "--porcelain"]).await?;
        if status.lines().any(|l| l.starts_with("UU") || l.starts_with("AA")) {
            return Ok(false);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::Vcs(format!("git merge failed: {stderr}")))
    }

    async fn merge_abort(&self, worktree: &Path) -> Result<()> {
        self.run(worktree, &["merge", "--abort"]).await?;
        Ok(())
    }
}
