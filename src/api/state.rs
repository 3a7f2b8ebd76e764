//! Application state for the API server

use crate::Config;
use crate::service::DownloadService;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned per request; both fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Download orchestration
    pub service: Arc<DownloadService>,

    /// Configuration the service was built with
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<DownloadService>, config: Arc<Config>) -> Self {
        Self { service, config }
    }
}
