//! Engine B: line-stream JSON, but without per-step token accounting —
//! the invocation's wall-clock duration stands in for a cost figure.
//! Permission prompts are bypassed with a CLI flag.

use async_trait::async_trait;
use orcharden_core::{Error, Result};
use tokio::process::Command;

use crate::engine::Engine;
use crate::process::{run_streaming, write_output};
use crate::types::{CostOrDuration, EngineOutcome, ExecuteOptions};

pub struct EngineB {
    binary: String,
}

impl EngineB {
    pub fn new() -> Self {
        Self {
            binary: "agent-engine-b".to_string(),
        }
    }
}

impl Default for EngineB {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for EngineB {
    async fn execute(
        &self,
        prompt: &str,
        output_file: &std::path::Path,
        options: &ExecuteOptions,
    ) -> Result<EngineOutcome> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--message").arg(prompt);
        cmd.arg("--stream-json");
        cmd.arg("--skip-permissions");

        let raw = run_streaming(cmd, options).await?;
        let mut outcome = parse_stream(&raw.lines)?;
        outcome.cost_or_duration = CostOrDuration::DurationMs(raw.elapsed.as_millis() as u64);
        write_output(output_file, &outcome.response_text).await?;
        Ok(outcome)
    }

    fn name(&self) -> &'static str {
        "b"
    }
}

fn parse_stream(lines: &[String]) -> Result<EngineOutcome> {
    let mut response_text = String::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let record: serde_json::Value = serde_json::from_str(line)?;
        if let Some(chunk) = record.get("delta").and_then(|v| v.as_str()) {
            response_text.push_str(chunk);
        }
    }
    if response_text.is_empty() {
        return Err(Error::Engine(
            "engine B produced no delta chunks in its output stream".to_string(),
        ));
    }
    Ok(EngineOutcome {
        response_text,
        input_tokens: None,
        output_tokens: None,
        cost_or_duration: CostOrDuration::None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_delta_chunks() {
        let lines = vec![
            r#"{"delta":"ab"}"#.to_string(),
            r#"{"delta":"cd"}"#.to_string(),
        ];
        let outcome = parse_stream(&lines).unwrap();
        assert_eq!(outcome.response_text, "abcd");
        assert_eq!(outcome.input_tokens, None);
    }

    #[test]
    fn rejects_a_stream_with_no_deltas() {
        let lines = vec![r#"{"type":"heartbeat"}"#.to_string()];
        assert!(parse_stream(&lines).is_err());
    }
}
