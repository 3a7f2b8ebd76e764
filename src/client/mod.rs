//! Client for the vidmux server
//!
//! [`ApiClient`] talks HTTP, a [`MediaSink`] stores what comes back, and
//! [`BatchSession`] drives several URLs at once while tracking per-input
//! failures.

mod api;
mod batch;
mod sink;

pub use api::{ApiClient, FetchedMedia};
pub use batch::{BatchReport, BatchSession, ErrorDetail, PARTIAL_FAILURE_BANNER, Phase, SessionSnapshot};
pub use sink::{
    BrowserDownloadSink, CommandSharePrompt, FolderMediaLibrary, MediaLibrary, MediaLibrarySink,
    MediaSink, SavedMedia, SharePrompt, ShareSink, build_sink,
};
