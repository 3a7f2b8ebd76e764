//! Stand-in used when a required binary cannot be found

use super::traits::{Extractor, Muxer};
use crate::types::StreamKind;
use async_trait::async_trait;
use std::path::Path;

/// Tool handler used when yt-dlp or ffmpeg is unavailable
///
/// The service still starts; every request that needs the missing tool fails
/// with `Error::ExternalTool` (503) instead of a spawn error.
///
/// # Examples
///
/// ```
/// use vidmux::tools::{Extractor, UnavailableTool};
/// use vidmux::types::StreamKind;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() {
/// let tool = UnavailableTool::new("yt-dlp");
/// let result = tool
///     .fetch("https://youtube.com/watch?v=1", StreamKind::Video, Path::new("v.mp4"))
///     .await;
/// assert!(result.is_err());
/// # }
/// ```
pub struct UnavailableTool {
    tool: &'static str,
}

impl UnavailableTool {
    /// Create a stand-in for the named tool
    pub fn new(tool: &'static str) -> Self {
        Self { tool }
    }

    fn error(&self) -> crate::Error {
        missing_binary(self.tool)
    }
}

/// Error reported when `tool` cannot be run
pub(crate) fn missing_binary(tool: &str) -> crate::Error {
    crate::Error::ExternalTool(format!(
        "{} binary not found. Configure its path or ensure it is in PATH.",
        tool
    ))
}

#[async_trait]
impl Extractor for UnavailableTool {
    async fn fetch(&self, _url: &str, _stream: StreamKind, _output: &Path) -> crate::Result<()> {
        Err(self.error())
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        self.tool
    }
}

#[async_trait]
impl Muxer for UnavailableTool {
    async fn mux(&self, _video: &Path, _audio: &Path, _output: &Path) -> crate::Result<()> {
        Err(self.error())
    }

    fn is_available(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        self.tool
    }
}
