//! Traits and types for the external extractor and muxer

use crate::types::StreamKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use utoipa::ToSchema;

/// Capabilities of the configured tool pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ToolCapabilities {
    /// An extractor binary is available
    pub can_extract: bool,
    /// A muxer binary is available
    pub can_mux: bool,
}

/// Fetches a single elementary stream from a source URL
///
/// # Examples
///
/// ```no_run
/// use vidmux::tools::{Extractor, YtDlpExtractor};
/// use vidmux::types::StreamKind;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = YtDlpExtractor::from_path().expect("yt-dlp not found in PATH");
/// extractor
///     .fetch(
///         "https://www.youtube.com/watch?v=abc123",
///         StreamKind::Audio,
///         Path::new("downloads/abc-audio.m4a"),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Download the best `stream` of `url` into `output`
    ///
    /// # Errors
    ///
    /// Returns the classified failure: [`crate::Error::NotFound`],
    /// [`crate::Error::RateLimited`], [`crate::Error::UnsupportedFormat`],
    /// [`crate::Error::InvalidInput`] or a generic [`crate::Error::Subprocess`].
    async fn fetch(&self, url: &str, stream: StreamKind, output: &Path) -> crate::Result<()>;

    /// Whether the extractor can actually run
    fn is_available(&self) -> bool {
        true
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Combines a video stream and an audio stream into one container
#[async_trait]
pub trait Muxer: Send + Sync {
    /// Mux `video` and `audio` into `output`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Merge`] when the muxer fails, or
    /// [`crate::Error::ExternalTool`] when it cannot be run at all.
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> crate::Result<()>;

    /// Whether the muxer can actually run
    fn is_available(&self) -> bool {
        true
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
