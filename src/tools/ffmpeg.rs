//! CLI-based muxer using the external ffmpeg binary

use super::process::{self, stderr_tail};
use super::traits::Muxer;
use crate::config::MuxConfig;
use crate::error::Error;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

const TOOL: &str = "ffmpeg";

/// Muxer backed by the `ffmpeg` binary
///
/// The video stream is copied unchanged; audio is re-encoded with the
/// configured codec and bitrate (AAC at 192k by default).
pub struct FfmpegMuxer {
    binary_path: PathBuf,
    settings: MuxConfig,
    timeout: Option<Duration>,
}

impl FfmpegMuxer {
    /// Create a new muxer with an explicit binary path and default settings
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            settings: MuxConfig::default(),
            timeout: None,
        }
    }

    /// Attempt to find ffmpeg in PATH
    pub fn from_path() -> Option<Self> {
        which::which(TOOL).ok().map(Self::new)
    }

    /// Use the given codec settings
    pub fn with_settings(mut self, settings: MuxConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Kill invocations running longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Path of the binary this muxer runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self, video: &Path, audio: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-c:v", "copy"])
            .arg("-c:a")
            .arg(&self.settings.audio_codec)
            .arg("-b:a")
            .arg(&self.settings.audio_bitrate)
            .arg(output);
        command
    }
}

#[async_trait]
impl Muxer for FfmpegMuxer {
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> crate::Result<()> {
        let merge_error = |reason: String| Error::Merge {
            output: output.to_path_buf(),
            reason,
        };

        let result = process::run(TOOL, self.command(video, audio, output), self.timeout)
            .await
            .map_err(|e| merge_error(e.to_string()))?;

        if result.status.success() {
            return Ok(());
        }

        Err(merge_error(format!(
            "ffmpeg exited with {:?}: {}",
            result.status.code(),
            stderr_tail(&result.stderr)
        )))
    }

    fn name(&self) -> &'static str {
        TOOL
    }
}
