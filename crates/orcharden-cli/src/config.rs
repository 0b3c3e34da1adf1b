//! Run-config file (`orcharden.toml`) shape: `serde::Deserialize` with
//! `#[serde(default = "...")]` per optional field, read via
//! `tokio::fs::read_to_string` and parsed with `toml::from_str`.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OrchardenConfig {
    #[serde(default)]
    pub run: RunSection,
}

impl Default for OrchardenConfig {
    fn default() -> Self {
        Self {
            run: RunSection::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RunSection {
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_external_failure_timeout_secs")]
    pub external_failure_timeout_secs: u64,
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
    #[serde(default = "default_artifacts_root")]
    pub artifacts_root: PathBuf,
    #[serde(default = "default_worktrees_root")]
    pub worktrees_root: PathBuf,
    #[serde(default)]
    pub repo_root: Option<PathBuf>,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            concurrency: default_concurrency(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            external_failure_timeout_secs: default_external_failure_timeout_secs(),
            base_branch: default_base_branch(),
            artifacts_root: default_artifacts_root(),
            worktrees_root: default_worktrees_root(),
            repo_root: None,
        }
    }
}

fn default_engine() -> String {
    "a".to_string()
}
fn default_concurrency() -> usize {
    3
}
fn default_retries() -> u32 {
    2
}
fn default_retry_delay_ms() -> u64 {
    5_000
}
fn default_external_failure_timeout_secs() -> u64 {
    300
}
fn default_base_branch() -> String {
    "main".to_string()
}
fn default_artifacts_root() -> PathBuf {
    PathBuf::from("artifacts")
}
fn default_worktrees_root() -> PathBuf {
    PathBuf::from(".orcharden-worktrees")
}

/// Load `path` if it exists; fall back to all-defaults otherwise, so a
/// bare `orcharden run` works in a repo that has never set up
/// `orcharden.toml`.
pub async fn load_config(path: &std::path::Path) -> anyhow::Result<OrchardenConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(toml::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(OrchardenConfig::default()),
        Err(e) => Err(anyhow::anyhow!("failed to read config file '{}': {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_config_file_falls_back_to_defaults() {
        let config = load_config(std::path::Path::new("/nonexistent/orcharden.toml"))
            .await
            .unwrap();
        assert_eq!(config.run.engine, "a");
        assert_eq!(config.run.concurrency, 3);
    }

    #[tokio::test]
    async fn partial_config_keeps_unset_fields_at_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orcharden.toml");
        tokio::fs::write(&path, "[run]\nengine = \"c\"\nconcurrency = 5\n")
            .await
            .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.run.engine, "c");
        assert_eq!(config.run.concurrency, 5);
        assert_eq!(config.run.retries, 2);
        assert_eq!(config.run.base_branch, "main");
    }
}
