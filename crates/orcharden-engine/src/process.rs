//! Shared process-invocation plumbing the four concrete engines build on:
//! spawn a command, stream its stdout lines (optionally mirroring them to
//! a tee file for the progress aggregator), capture stderr to a log file,
//! and time the whole invocation.

use std::path::Path;
use std::time::{Duration, Instant};

use orcharden_core::{Error, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

use crate::types::ExecuteOptions;

/// The raw result of running a command to completion: every stdout line,
/// in order, and how long the invocation took.
pub struct RawInvocation {
    pub lines: Vec<String>,
    pub elapsed: Duration,
}

/// Spawn `cmd`, stream stdout line-by-line (mirroring to `options.tee_file`
/// as lines arrive), write stderr to `options.log_file`, and wait for exit.
pub async fn run_streaming(mut cmd: Command, options: &ExecuteOptions) -> Result<RawInvocation> {
    if let Some(dir) = &options.working_directory {
        cmd.current_dir(dir);
    }
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());

    let started = Instant::now();
    let mut child = cmd
        .spawn()
        .map_err(|e| Error::Engine(format!("failed to spawn engine process: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Engine("engine process had no stdout pipe".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Engine("engine process had no stderr pipe".to_string()))?;

    let mut tee = match &options.tee_file {
        Some(path) => Some(
            tokio::fs::File::create(path)
                .await
                .map_err(|e| Error::Engine(format!("failed to open tee file: {e}")))?,
        ),
        None => None,
    };

    let mut lines = Vec::new();
    let mut stdout_reader = BufReader::new(stdout).lines();
    while let Some(line) = stdout_reader
        .next_line()
        .await
        .map_err(|e| Error::Engine(format!("failed to read engine stdout: {e}")))?
    {
        if let Some(tee) = tee.as_mut() {
            let _ = tee.write_all(line.as_bytes()).await;
            let _ = tee.write_all(b"\n").await;
        }
        lines.push(line);
    }

    let stderr_text = {
        let mut reader = BufReader::new(stderr);
        let mut buf = String::new();
        use tokio::io::AsyncReadExt;
        let _ = reader.read_to_string(&mut buf).await;
        buf
    };
    if let Some(path) = &options.log_file {
        let _ = tokio::fs::write(path, &stderr_text).await;
    }

    let status = child
        .wait()
        .await
        .map_err(|e| Error::Engine(format!("failed to wait on engine process: {e}")))?;
    let elapsed = started.elapsed();

    if !status.success() {
        return Err(Error::Engine(format!(
            "engine process exited with {}: {}",
            status.code().unwrap_or(-1),
            stderr_text
        )));
    }

    Ok(RawInvocation { lines, elapsed })
}

/// Write the engine's primary response text to `output_file`.
pub async fn write_output(output_file: &Path, text: &str) -> Result<()> {
    tokio::fs::write(output_file, text)
        .await
        .map_err(|e| Error::Engine(format!("failed to write engine output file: {e}")))
}
