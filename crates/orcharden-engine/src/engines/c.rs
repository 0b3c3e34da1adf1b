//! Engine C: full-auto JSON — the whole invocation emits exactly one
//! JSON object (possibly pretty-printed across several lines) rather
//! than a stream of events. Reports neither tokens nor cost. Its
//! "full-auto" mode already implies permission bypass, so no flag or
//! environment variable is needed to suppress prompts.

use async_trait::async_trait;
use orcharden_core::{Error, Result};
use tokio::process::Command;

use crate::engine::Engine;
use crate::process::{run_streaming, write_output};
use crate::types::{CostOrDuration, EngineOutcome, ExecuteOptions};

pub struct EngineC {
    binary: String,
}

impl EngineC {
    pub fn new() -> Self {
        Self {
            binary: "agent-engine-c".to_string(),
        }
    }
}

impl Default for EngineC {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for EngineC {
    async fn execute(
        &self,
        prompt: &str,
        output_file: &std::path::Path,
        options: &ExecuteOptions,
    ) -> Result<EngineOutcome> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--full-auto");
        cmd.arg("--task").arg(prompt);
        cmd.arg("--json");

        let raw = run_streaming(cmd, options).await?;
        let outcome = parse_blob(&raw.lines)?;
        write_output(output_file, &outcome.response_text).await?;
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "c"
    }
}

fn parse_blob(lines: &[String]) -> Result<EngineOutcome> {
    let joined = lines.join("\n");
    if joined.trim().is_empty() {
        return Err(Error::Engine(
            "engine C produced no output blob".to_string(),
        ));
    }
    let record: serde_json::Value = serde_json::from_str(&joined)?;
    let response_text = record
        .get("output")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Engine("engine C output blob missing 'output' field".to_string()))?
        .to_string();
    Ok(EngineOutcome {
        response_text,
        input_tokens: None,
        output_tokens: None,
        cost_or_duration: CostOrDuration::None,
    })
}
