//! Removal of job temporaries after a successful merge

use crate::error::{Error, Result};
use crate::types::JobArtifacts;
use std::io::ErrorKind;
use tokio::fs;
use tracing::debug;

/// Delete both temporary stream files of a job
///
/// Both deletions are attempted even if the first one fails; the first
/// failure is returned. A file that is already gone counts as removed.
pub async fn remove_temporaries(artifacts: &JobArtifacts) -> Result<()> {
    let mut first_error = None;

    for path in [&artifacts.video, &artifacts.audio] {
        match fs::remove_file(path).await {
            Ok(()) => debug!(?path, "deleted temporary file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(Error::Cleanup {
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
