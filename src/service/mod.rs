//! Download orchestration
//!
//! [`DownloadService`] turns one URL into one muxed file:
//!
//! 1. validate the URL against the allow-list
//! 2. derive the job id and the three artifact paths, and check that both
//!    tools can run
//! 3. run the extractor twice concurrently (video-only, audio-only) and join
//! 4. check that both temporaries exist
//! 5. run the muxer
//! 6. delete the temporaries
//!
//! Requests share nothing but the output directory; uniquely named artifacts
//! keep them apart, so no locking is involved.

mod cleanup;

pub use cleanup::remove_temporaries;

use crate::config::Config;
use crate::error::{Error, Result, SubprocessError, ToHttpStatus};
use crate::tools::{Tools, resolve_tools};
use crate::types::{DownloadResponse, JobArtifacts, StreamKind};
use crate::validation::{derive_job_id, validate_url};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Orchestrates extractor and muxer runs for download requests
#[derive(Clone)]
pub struct DownloadService {
    /// Configuration this service was built with
    pub config: Arc<Config>,
    tools: Tools,
}

impl DownloadService {
    /// Create a service, locating yt-dlp and ffmpeg from the configuration
    pub fn new(config: Config) -> Self {
        let tools = resolve_tools(&config.tools, &config.mux);
        Self::with_tools(config, tools)
    }

    /// Create a service with explicit tool implementations
    pub fn with_tools(config: Config, tools: Tools) -> Self {
        Self {
            config: Arc::new(config),
            tools,
        }
    }

    /// Tools used by this service
    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    /// Directory that holds produced files
    pub fn output_dir(&self) -> &PathBuf {
        &self.config.download.output_dir
    }

    /// Process one download request, timestamped now
    pub async fn download(&self, url: Option<&str>) -> Result<DownloadResponse> {
        self.download_at(url, chrono::Utc::now().timestamp_millis())
            .await
    }

    /// Process one download request with an explicit job timestamp
    ///
    /// Every failure is logged as an error record before it is returned.
    pub async fn download_at(
        &self,
        url: Option<&str>,
        timestamp_ms: i64,
    ) -> Result<DownloadResponse> {
        let result = self.run(url, timestamp_ms).await;
        if let Err(e) = &result {
            error!(
                url = url.unwrap_or_default(),
                code = e.error_code(),
                status = e.status_code(),
                error = %e,
                "download request failed"
            );
        }
        result
    }

    async fn run(&self, url: Option<&str>, timestamp_ms: i64) -> Result<DownloadResponse> {
        let url = validate_url(url, &self.config.download.allowed_domains)?;
        let job_id = derive_job_id(&url, timestamp_ms);
        let artifacts = JobArtifacts::new(self.output_dir(), &job_id);

        let span = info_span!("job", job_id = %job_id);
        self.run_job(&url, artifacts).instrument(span).await
    }

    async fn run_job(&self, url: &str, artifacts: JobArtifacts) -> Result<DownloadResponse> {
        self.tools.ensure_available()?;
        tokio::fs::create_dir_all(self.output_dir()).await?;

        info!(url, extractor = self.tools.extractor.name(), "fetching streams");

        let extractor = &self.tools.extractor;
        let (video, audio) = tokio::join!(
            extractor.fetch(url, StreamKind::Video, &artifacts.video),
            extractor.fetch(url, StreamKind::Audio, &artifacts.audio),
        );

        match (video, audio) {
            (Ok(()), Ok(())) => {}
            (Err(e), Ok(())) | (Ok(()), Err(e)) => return Err(e),
            (Err(video_err), Err(audio_err)) => {
                warn!(error = %audio_err, "audio fetch failed as well");
                return Err(video_err);
            }
        }

        let missing = missing_files(&[&artifacts.video, &artifacts.audio]).await;
        if !missing.is_empty() {
            return Err(SubprocessError::MissingFiles { missing }.into());
        }

        debug!(muxer = self.tools.muxer.name(), "merging streams");
        self.tools
            .muxer
            .mux(&artifacts.video, &artifacts.audio, &artifacts.output)
            .await?;

        if !tokio::fs::try_exists(&artifacts.output).await.unwrap_or(false) {
            return Err(Error::Merge {
                output: artifacts.output.clone(),
                reason: "muxer reported success but produced no file".to_string(),
            });
        }

        // The artifact exists at this point; a failed cleanup is reported, not fatal.
        let warnings = match remove_temporaries(&artifacts).await {
            Ok(()) => Vec::new(),
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "temporary files left behind");
                vec![e.public_message()]
            }
        };

        let file = artifacts.output_file_name();
        info!(file, "download complete");
        Ok(DownloadResponse { file, warnings })
    }
}

async fn missing_files(paths: &[&PathBuf]) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    for path in paths {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            missing.push((*path).clone());
        }
    }
    missing
}
