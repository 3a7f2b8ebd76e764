//! Subprocess execution shared by the CLI tool handlers

use crate::error::SubprocessError;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Maximum number of stderr lines carried into errors and logs
const STDERR_TAIL_LINES: usize = 20;

/// Run `command` to completion, capturing its output
///
/// The child is killed when the future is dropped or when `timeout` elapses.
pub(crate) async fn run(
    tool: &str,
    mut command: Command,
    timeout: Option<Duration>,
) -> Result<Output, SubprocessError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(tool, command = ?command.as_std(), "spawning subprocess");

    let output = command.output();
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, output).await {
            Ok(result) => result,
            Err(_) => {
                return Err(SubprocessError::TimedOut {
                    tool: tool.to_string(),
                    timeout: limit,
                });
            }
        },
        None => output.await,
    };

    result.map_err(|e| SubprocessError::SpawnFailed {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Last lines of a process' stderr, lossily decoded
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
