//! Batch submission state machine
//!
//! A [`BatchSession`] holds the ordered URL inputs of one screen and walks
//! `Idle -> Loading -> {Success | PartialFailure | Failure} -> Idle`. Every
//! non-empty input becomes its own concurrent download; a failure is recorded
//! against its input index and never cancels the others.

use super::api::ApiClient;
use super::sink::{MediaSink, SavedMedia};
use crate::error::{Error, Result, ToHttpStatus};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Summary shown when at least one input failed
pub const PARTIAL_FAILURE_BANNER: &str = "Some downloads failed. Please check the individual errors.";

/// Lifecycle of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for input
    Idle,
    /// Downloads in flight; inputs are read-only
    Loading,
    /// Every submitted input was saved
    Success,
    /// Some inputs failed
    PartialFailure,
    /// Every submitted input failed
    Failure,
}

impl Phase {
    /// Whether the batch has finished and awaits acknowledgement
    pub fn is_finished(self) -> bool {
        matches!(self, Phase::Success | Phase::PartialFailure | Phase::Failure)
    }
}

/// Failure of one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Zero-based position of the input
    pub index: usize,
    /// Message displayed under that input
    pub message: String,
}

/// Point-in-time copy of the session, for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current inputs in order
    pub inputs: Vec<String>,
    /// Failures of the last batch, at most one per index
    pub errors: Vec<ErrorDetail>,
    /// Summary banner
    pub banner: Option<String>,
    /// Current phase
    pub phase: Phase,
}

impl SessionSnapshot {
    /// Error recorded for the input at `index`
    pub fn error_for(&self, index: usize) -> Option<&ErrorDetail> {
        self.errors.iter().find(|e| e.index == index)
    }
}

/// What a finished submission produced
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Saved files by input index
    pub saved: Vec<(usize, SavedMedia)>,
    /// Failures by input index
    pub errors: Vec<ErrorDetail>,
    /// Phase the session ended in
    pub phase: Phase,
}

#[derive(Debug)]
struct SessionState {
    inputs: Vec<String>,
    errors: Vec<ErrorDetail>,
    banner: Option<String>,
    phase: Phase,
}

impl SessionState {
    fn fresh() -> Self {
        Self {
            inputs: vec![String::new()],
            errors: Vec::new(),
            banner: None,
            phase: Phase::Idle,
        }
    }
}

/// Ordered URL inputs plus the state of their last submission
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct BatchSession {
    client: Arc<ApiClient>,
    sink: Arc<dyn MediaSink>,
    state: Arc<Mutex<SessionState>>,
}

impl BatchSession {
    /// New session with a single empty input
    pub fn new(client: ApiClient, sink: Arc<dyn MediaSink>) -> Self {
        Self {
            client: Arc::new(client),
            sink,
            state: Arc::new(Mutex::new(SessionState::fresh())),
        }
    }

    /// Current state
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            inputs: state.inputs.clone(),
            errors: state.errors.clone(),
            banner: state.banner.clone(),
            phase: state.phase,
        }
    }

    /// Current phase
    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    /// Append an empty input and return its index
    pub async fn add_input(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        ensure_editable(&state)?;
        state.inputs.push(String::new());
        Ok(state.inputs.len() - 1)
    }

    /// Replace the input at `index`
    pub async fn set_input(&self, index: usize, value: impl Into<String>) -> Result<()> {
        let mut state = self.state.lock().await;
        ensure_editable(&state)?;
        let slot = state
            .inputs
            .get_mut(index)
            .ok_or_else(|| Error::InvalidInput(format!("no input at index {index}")))?;
        *slot = value.into();
        Ok(())
    }

    /// Clear inputs, errors and banner; downloads in flight keep running
    pub async fn refresh(&self) {
        let mut state = self.state.lock().await;
        state.inputs = vec![String::new()];
        state.errors.clear();
        state.banner = None;
    }

    /// Return a finished batch to `Idle`
    pub async fn acknowledge(&self) {
        let mut state = self.state.lock().await;
        if state.phase.is_finished() {
            state.phase = Phase::Idle;
        }
    }

    /// Download every non-empty input concurrently
    ///
    /// With nothing to submit the session is left untouched and an empty
    /// report in the current phase is returned.
    pub async fn submit(&self) -> Result<BatchReport> {
        let jobs: Vec<(usize, String)> = {
            let mut state = self.state.lock().await;
            ensure_editable(&state)?;

            let jobs: Vec<(usize, String)> = state
                .inputs
                .iter()
                .enumerate()
                .filter(|(_, url)| !url.trim().is_empty())
                .map(|(index, url)| (index, url.trim().to_string()))
                .collect();
            if jobs.is_empty() {
                return Ok(BatchReport {
                    saved: Vec::new(),
                    errors: Vec::new(),
                    phase: state.phase,
                });
            }

            state.errors.clear();
            state.banner = None;
            state.phase = Phase::Loading;
            jobs
        };

        tracing::info!(count = jobs.len(), sink = self.sink.name(), "submitting batch");

        let outcomes = join_all(jobs.iter().map(|(index, url)| async move {
            (*index, self.download_one(url).await)
        }))
        .await;

        let mut saved = Vec::new();
        let mut errors = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(media) => saved.push((index, media)),
                Err(e) => {
                    tracing::warn!(index, code = e.error_code(), error = %e, "batch item failed");
                    errors.push(ErrorDetail {
                        index,
                        message: format!("Failed to download video at index {}: {}", index + 1, e),
                    });
                }
            }
        }

        let phase = if errors.is_empty() {
            Phase::Success
        } else if saved.is_empty() {
            Phase::Failure
        } else {
            Phase::PartialFailure
        };

        let mut state = self.state.lock().await;
        state.errors = errors.clone();
        state.banner = (!errors.is_empty()).then(|| PARTIAL_FAILURE_BANNER.to_string());
        state.inputs = vec![String::new()];
        state.phase = phase;

        Ok(BatchReport {
            saved,
            errors,
            phase,
        })
    }

    async fn download_one(&self, url: &str) -> Result<SavedMedia> {
        let response = self.client.request_download(url).await?;
        for warning in &response.warnings {
            tracing::warn!(file = %response.file, warning, "server reported a warning");
        }
        let media = self.client.fetch_media(&response.file).await?;
        self.sink.persist(media).await
    }
}

fn ensure_editable(state: &SessionState) -> Result<()> {
    if state.phase == Phase::Loading {
        return Err(Error::InvalidInput(
            "downloads are in progress; inputs cannot change".to_string(),
        ));
    }
    Ok(())
}
