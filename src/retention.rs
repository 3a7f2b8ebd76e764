//! Retention policy for the output directory
//!
//! Finished files are kept for `max_age`; job temporaries left behind by a
//! failed merge or a crashed request are removed after `orphan_max_age`.
//! Files whose names the service would not produce are left alone. The
//! sweeper runs on an interval until its cancellation token fires.

use crate::config::RetentionConfig;
use crate::error::{Error, Result};
use crate::types::{JobFileKind, job_file_kind};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Outcome of one sweep
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Finished files deleted because they exceeded `max_age`
    pub expired_outputs: usize,
    /// Temporaries deleted because they exceeded `orphan_max_age`
    pub orphaned_temporaries: usize,
    /// Files that could not be deleted
    pub failures: usize,
}

/// Periodically deletes expired files from the output directory
pub struct RetentionSweeper {
    dir: PathBuf,
    policy: RetentionConfig,
}

impl RetentionSweeper {
    /// Create a sweeper for `dir`
    pub fn new(dir: PathBuf, policy: RetentionConfig) -> Self {
        Self { dir, policy }
    }

    /// Run one sweep as of `now`
    ///
    /// A missing directory is treated as empty. Individual deletion failures
    /// are logged and counted, never returned.
    pub async fn sweep_once(&self, now: SystemTime) -> Result<SweepReport> {
        let mut report = SweepReport::default();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(e) => return Err(Error::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                _ => continue,
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            // Only files named like job artifacts are ever deleted
            let Some(kind) = job_file_kind(&name) else {
                continue;
            };
            let is_temp = kind == JobFileKind::Temporary;
            let limit = if is_temp {
                self.policy.orphan_max_age
            } else {
                self.policy.max_age
            };

            let modified = metadata.modified().unwrap_or(now);
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age <= limit {
                continue;
            }

            let path = entry.path();
            match remove_expired(&path).await {
                Ok(()) if is_temp => report.orphaned_temporaries += 1,
                Ok(()) => report.expired_outputs += 1,
                Err(e) => {
                    warn!(error = %e, "retention sweep could not delete file");
                    report.failures += 1;
                }
            }
        }

        if report != SweepReport::default() {
            info!(
                expired = report.expired_outputs,
                orphaned = report.orphaned_temporaries,
                failures = report.failures,
                "retention sweep finished"
            );
        }
        Ok(report)
    }

    /// Spawn the sweep loop
    ///
    /// The first sweep runs immediately; later sweeps follow `sweep_interval`.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.policy.sweep_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("retention sweeper stopped");
                        break;
                    }
                    _ = interval.tick() => {
                        if let Err(e) = self.sweep_once(SystemTime::now()).await {
                            warn!(error = %e, dir = ?self.dir, "retention sweep failed");
                        }
                    }
                }
            }
        })
    }
}

async fn remove_expired(path: &Path) -> Result<()> {
    fs::remove_file(path).await.map_err(|e| Error::Cleanup {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    debug!(?path, "deleted expired file");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn policy() -> RetentionConfig {
        RetentionConfig {
            enabled: true,
            max_age: 24 * HOUR,
            orphan_max_age: HOUR,
            sweep_interval: Duration::from_millis(20),
        }
    }

    fn populate(dir: &Path) {
        for name in [
            "a-1700000000000.mp4",
            "a-1700000000000-video.mp4",
            "a-1700000000000-audio.m4a",
        ] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }
    }

    #[tokio::test]
    async fn test_fresh_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let sweeper = RetentionSweeper::new(dir.path().to_path_buf(), policy());

        let report = sweeper.sweep_once(SystemTime::now()).await.unwrap();

        assert_eq!(report, SweepReport::default());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_orphans_expire_before_outputs() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let sweeper = RetentionSweeper::new(dir.path().to_path_buf(), policy());

        let report = sweeper
            .sweep_once(SystemTime::now() + 2 * HOUR)
            .await
            .unwrap();

        assert_eq!(report.orphaned_temporaries, 2);
        assert_eq!(report.expired_outputs, 0);
        assert!(dir.path().join("a-1700000000000.mp4").exists());
        assert!(!dir.path().join("a-1700000000000-video.mp4").exists());
    }

    #[tokio::test]
    async fn test_outputs_expire_after_max_age() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let sweeper = RetentionSweeper::new(dir.path().to_path_buf(), policy());

        let report = sweeper
            .sweep_once(SystemTime::now() + 25 * HOUR)
            .await
            .unwrap();

        assert_eq!(report.expired_outputs, 1);
        assert_eq!(report.orphaned_temporaries, 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_directories_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let sweeper = RetentionSweeper::new(dir.path().to_path_buf(), policy());

        let report = sweeper
            .sweep_once(SystemTime::now() + 100 * HOUR)
            .await
            .unwrap();

        assert_eq!(report, SweepReport::default());
        assert!(dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn test_unrelated_files_survive() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        for name in ["notes.txt", "holiday.mkv", "holiday-2019.mp4"] {
            std::fs::write(dir.path().join(name), b"keep").unwrap();
        }
        let sweeper = RetentionSweeper::new(dir.path().to_path_buf(), RetentionConfig::default());

        let report = sweeper
            .sweep_once(SystemTime::now() + 8 * 24 * HOUR)
            .await
            .unwrap();

        assert_eq!(report.expired_outputs, 1);
        assert_eq!(report.orphaned_temporaries, 2);
        for name in ["notes.txt", "holiday.mkv", "holiday-2019.mp4"] {
            assert!(dir.path().join(name).exists(), "{name} was deleted");
        }
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sweeper = RetentionSweeper::new(dir.path().join("absent"), policy());
        let report = sweeper.sweep_once(SystemTime::now()).await.unwrap();
        assert_eq!(report, SweepReport::default());
    }

    #[tokio::test]
    async fn test_spawned_sweeper_stops_on_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let mut zero_age = policy();
        zero_age.orphan_max_age = Duration::ZERO;
        std::fs::write(dir.path().join("b-1700000000000-audio.m4a"), b"x").unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let handle = RetentionSweeper::new(dir.path().to_path_buf(), zero_age).spawn(token.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
        assert!(!dir.path().join("b-1700000000000-audio.m4a").exists());
    }
}
