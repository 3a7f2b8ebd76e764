//! # vidmux
//!
//! Fetch a social-media video as separate best-quality video and audio
//! streams with `yt-dlp`, merge them with `ffmpeg`, and serve the result.
//!
//! The crate has two halves:
//!
//! - **Server**: [`DownloadService`] orchestrates the external tools and
//!   [`api`] exposes it as `POST /download/video` plus static
//!   `GET /downloads/:filename`.
//! - **Client**: [`client`] submits batches of URLs, checks that what comes
//!   back is a video, and stores it through a [`client::MediaSink`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidmux::{Config, run_with_shutdown};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.download.output_dir = "/srv/vidmux".into();
//!
//!     // Serves until SIGTERM/SIGINT
//!     run_with_shutdown(config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// HTTP client, media sinks and batch sessions
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Expiry of finished files and orphaned temporaries
pub mod retention;
/// Download orchestration
pub mod service;
/// Logging setup
pub mod telemetry;
/// External extractor and muxer
pub mod tools;
/// Core request, response and job types
pub mod types;
/// URL validation and job naming
pub mod validation;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, Result, SubprocessError, ToHttpStatus};
pub use retention::RetentionSweeper;
pub use service::DownloadService;
pub use types::{DownloadRequest, DownloadResponse, JobArtifacts, JobId, StreamKind};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Run the server with graceful signal handling.
///
/// Validates `config`, starts the retention sweeper (when enabled) and the API
/// server, then waits for a termination signal; in-flight requests finish
/// before returning.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(config: Config) -> Result<()> {
    config.validate()?;

    let shutdown = CancellationToken::new();
    let service = Arc::new(DownloadService::new(config));

    let sweeper = if service.config.retention.enabled {
        Some(
            RetentionSweeper::new(service.output_dir().clone(), service.config.retention.clone())
                .spawn(shutdown.clone()),
        )
    } else {
        tracing::info!("retention sweeper disabled, files are kept indefinitely");
        None
    };

    let signal_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            wait_for_signal().await;
            shutdown.cancel();
        }
    });

    let result = api::start_api_server(service, shutdown.clone()).await;

    // The server may have stopped on its own (bind failure); stop the rest too
    shutdown.cancel();
    signal_task.abort();
    if let Some(sweeper) = sweeper
        && let Err(e) = sweeper.await
    {
        tracing::warn!(error = %e, "retention sweeper task failed");
    }

    result
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
