//! CLI-based extractor using the external yt-dlp binary

use super::classify::classify_extractor_failure;
use super::process::{self, stderr_tail};
use super::traits::Extractor;
use crate::types::StreamKind;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

const TOOL: &str = "yt-dlp";

/// Extractor backed by the `yt-dlp` binary
///
/// Each fetch runs `yt-dlp --format <selector> --output <path> <url>`.
pub struct YtDlpExtractor {
    binary_path: PathBuf,
    timeout: Option<Duration>,
}

impl YtDlpExtractor {
    /// Create a new extractor with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            timeout: None,
        }
    }

    /// Attempt to find yt-dlp in PATH
    ///
    /// # Returns
    ///
    /// `Some(YtDlpExtractor)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which(TOOL).ok().map(Self::new)
    }

    /// Kill invocations running longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the binary this extractor runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self, url: &str, stream: StreamKind, output: &Path) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .arg("--format")
            .arg(stream.format_selector())
            .arg("--output")
            .arg(output)
            .arg(url);
        command
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    async fn fetch(&self, url: &str, stream: StreamKind, output: &Path) -> crate::Result<()> {
        let result = process::run(TOOL, self.command(url, stream, output), self.timeout).await?;

        if result.status.success() {
            tracing::debug!(%stream, ?output, "yt-dlp finished");
            return Ok(());
        }

        let stderr = stderr_tail(&result.stderr);
        Err(classify_extractor_failure(
            TOOL,
            stream,
            result.status.code(),
            &stderr,
        ))
    }

    fn name(&self) -> &'static str {
        TOOL
    }
}
