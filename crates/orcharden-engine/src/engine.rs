use async_trait::async_trait;
use orcharden_core::Result;

use crate::types::{EngineOutcome, ExecuteOptions};

/// The opaque agent-engine abstraction: a uniform `execute` call that
/// each concrete engine maps to its own command line and output format.
///
/// Grounded on the workspace's LLM backend port: one trait, one real
/// implementation per provider, each hiding its own process-spawning and
/// output-parsing behind the same signature so the supervisor (C6) never
/// special-cases which engine it's talking to.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Run `prompt` through the engine, writing its primary result to
    /// `output_file` and returning the parsed outcome.
    async fn execute(
        &self,
        prompt: &str,
        output_file: &std::path::Path,
        options: &ExecuteOptions,
    ) -> Result<EngineOutcome>;

    /// A short identifier for logging and the artifact writer's `engine`
    /// report field (e.g. `"a"`, `"b"`).
    fn name(&self) -> &'static str;
}
