//! External extractor and muxer handling
//!
//! The orchestration never talks to a binary directly. It goes through the
//! [`Extractor`] and [`Muxer`] traits, with these implementations:
//!
//! - [`YtDlpExtractor`]: runs `yt-dlp --format <selector> --output <path> <url>`
//! - [`FfmpegMuxer`]: runs `ffmpeg -i <video> -i <audio> -c:v copy -c:a aac -b:a 192k <output>`
//! - [`UnavailableTool`]: stand-in when a binary cannot be found
//!
//! [`resolve_tools`] picks the implementations from [`ToolsConfig`].

mod classify;
mod ffmpeg;
mod process;
mod traits;
mod unavailable;
mod ytdlp;

pub use classify::{YTDLP_EXIT_CODES, classify_extractor_failure, exit_code_meaning};
pub use ffmpeg::FfmpegMuxer;
pub use traits::{Extractor, Muxer, ToolCapabilities};
pub use unavailable::UnavailableTool;
pub use ytdlp::YtDlpExtractor;

use crate::config::{MuxConfig, ToolsConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Extractor and muxer selected for a service instance
#[derive(Clone)]
pub struct Tools {
    /// Fetches the video-only and audio-only streams
    pub extractor: Arc<dyn Extractor>,
    /// Combines the fetched streams
    pub muxer: Arc<dyn Muxer>,
}

impl Tools {
    /// Report which tools can run
    pub fn capabilities(&self) -> ToolCapabilities {
        ToolCapabilities {
            can_extract: self.extractor.is_available(),
            can_mux: self.muxer.is_available(),
        }
    }

    /// Fail with `Error::ExternalTool` unless both tools can run
    ///
    /// Checked before any stream is fetched, so a missing muxer does not cost
    /// two downloads.
    pub fn ensure_available(&self) -> crate::Result<()> {
        if !self.extractor.is_available() {
            return Err(unavailable::missing_binary(self.extractor.name()));
        }
        if !self.muxer.is_available() {
            return Err(unavailable::missing_binary(self.muxer.name()));
        }
        Ok(())
    }
}

/// Build the tool pair from configuration
///
/// Explicit paths win; otherwise PATH is searched when `search_path` is set.
/// A binary that cannot be located is replaced by [`UnavailableTool`] and a
/// warning is logged.
pub fn resolve_tools(tools: &ToolsConfig, mux: &MuxConfig) -> Tools {
    let extractor: Arc<dyn Extractor> =
        match locate(tools.ytdlp_path.as_ref(), "yt-dlp", tools.search_path) {
            Some(path) => {
                tracing::info!(path = ?path, "using yt-dlp extractor");
                Arc::new(YtDlpExtractor::new(path).with_timeout(tools.timeout))
            }
            None => {
                tracing::warn!("yt-dlp not found, downloads will be rejected");
                Arc::new(UnavailableTool::new("yt-dlp"))
            }
        };

    let muxer: Arc<dyn Muxer> = match locate(tools.ffmpeg_path.as_ref(), "ffmpeg", tools.search_path)
    {
        Some(path) => {
            tracing::info!(path = ?path, "using ffmpeg muxer");
            Arc::new(
                FfmpegMuxer::new(path)
                    .with_settings(mux.clone())
                    .with_timeout(tools.timeout),
            )
        }
        None => {
            tracing::warn!("ffmpeg not found, downloads will be rejected");
            Arc::new(UnavailableTool::new("ffmpeg"))
        }
    };

    Tools { extractor, muxer }
}

fn locate(explicit: Option<&PathBuf>, binary: &str, search_path: bool) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.clone());
    }
    if search_path {
        return which::which(binary).ok();
    }
    None
}
