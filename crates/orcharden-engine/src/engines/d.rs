//! Engine D: line-stream JSON like engine B, but with a terminal `result`
//! record carrying usage — no cost figure, only tokens. Permission
//! prompts are bypassed with a CLI flag.

use async_trait::async_trait;
use orcharden_core::{Error, Result};
use tokio::process::Command;

use crate::engine::Engine;
use crate::process::{run_streaming, write_output};
use crate::types::{CostOrDuration, EngineOutcome, ExecuteOptions};

pub struct EngineD {
    binary: String,
}

impl EngineD {
    pub fn new() -> Self {
        Self {
            binary: "agent-engine-d".to_string(),
        }
    }
}

impl Default for EngineD {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for EngineD {
    async fn execute(
        &self,
        prompt: &str,
        output_file: &std::path::Path,
        options: &ExecuteOptions,
    ) -> Result<EngineOutcome> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--input").arg(prompt);
        cmd.arg("--format").arg("jsonl");
        cmd.arg("--yolo");

        let raw = run_streaming(cmd, options).await?;
        let outcome = parse_stream(&raw.lines)?;
        write_output(output_file, &outcome.response_text).await?;
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "d"
    }
}

fn parse_stream(lines: &[String]) -> Result<EngineOutcome> {
    let mut response_text = String::new();
    let mut input_tokens = None;
    let mut output_tokens = None;

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let record: serde_json::Value = serde_json::from_str(line)?;
        match record.get("type").and_then(|v| v.as_str()) {
            Some("chunk") => {
                if let Some(text) = record.get("text").and_then(|v| v.as_str()) {
                    response_text.push_str(text);
                }
            }
            Some("result") => {
                input_tokens = record
                    .get("usage")
                    .and_then(|u| u.get("input_tokens"))
                    .and_then(|v| v.as_u64());
                output_tokens = record
                    .get("usage")
                    .and_then(|u| u.get("output_tokens"))
                    .and_then(|v| v.as_u64());
            }
            _ => {}
        }
    }

    if response_text.is_empty() {
        return Err(Error::Engine(
            "engine D produced no chunk events in its output stream".to_string(),
        ));
    }

    Ok(EngineOutcome {
        response_text,
        input_tokens,
        output_tokens,
        cost_or_duration: CostOrDuration::None,
    })
}
