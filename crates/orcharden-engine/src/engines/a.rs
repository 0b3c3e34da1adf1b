//! Engine A: JSON-per-line streaming. Each line is a distinct event
//! record; the terminal `step_finish` record carries both token usage
//! and the actual dollar cost for that step. Permission prompts are
//! bypassed via an environment variable rather than a flag.

use async_trait::async_trait;
use orcharden_core::{Error, Result};
use tokio::process::Command;

use crate::engine::Engine;
use crate::process::{run_streaming, write_output};
use crate::types::{CostOrDuration, EngineOutcome, ExecuteOptions};

pub struct EngineA {
    binary: String,
}

impl EngineA {
    pub fn new() -> Self {
        Self {
            binary: "agent-engine-a".to_string(),
        }
    }
}

impl Default for EngineA {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for EngineA {
    async fn execute(
        &self,
        prompt: &str,
        output_file: &std::path::Path,
        options: &ExecuteOptions,
    ) -> Result<EngineOutcome> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--prompt").arg(prompt);
        cmd.arg("--output-format").arg("jsonl");
        cmd.env("AGENT_ENGINE_A_SKIP_PERMISSIONS", "1");

        let raw = run_streaming(cmd, options).await?;
        let outcome = parse_jsonl(&raw.lines)?;
        write_output(output_file, &outcome.response_text).await?;
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "a"
    }
}

fn parse_jsonl(lines: &[String]) -> Result<EngineOutcome> {
    let mut response_text = String::new();
    let mut input_tokens = None;
    let mut output_tokens = None;
    let mut cost = CostOrDuration::None;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let record: serde_json::Value = serde_json::from_str(line)?;
        match record.get("type").and_then(|v| v.as_str()) {
            Some("text") => {
                if let Some(text) = record.get("text").and_then(|v| v.as_str()) {
                    response_text.push_str(text);
                }
            }
            Some("step_finish") => {
                input_tokens = record
                    .get("usage")
                    .and_then(|u| u.get("input_tokens"))
                    .and_then(|v| v.as_u64());
                output_tokens = record
                    .get("usage")
                    .and_then(|u| u.get("output_tokens"))
                    .and_then(|v| v.as_u64());
                if let Some(value) = record.get("cost_usd").and_then(|v| v.as_f64()) {
                    cost = CostOrDuration::Cost(value);
                }
            }
            _ => {}
        }
    }

    if response_text.is_empty() {
        return Err(Error::Engine(
            "engine A produced no text events in its output stream".to_string(),
        ));
    }

    Ok(EngineOutcome {
        response_text,
        input_tokens,
        output_tokens,
        cost_or_duration: cost,
    })
}
