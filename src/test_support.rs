//! Shared test helpers: fake tools and shell-script stand-ins

use crate::config::Config;
use crate::error::Error;
use crate::service::DownloadService;
use crate::tools::{Extractor, Muxer, Tools};
use crate::types::StreamKind;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// What a fake tool does when invoked
#[derive(Clone, Copy)]
pub(crate) enum Behavior {
    /// Write a small file to the output path and succeed
    Write,
    /// Succeed without writing anything
    SucceedWithoutFile,
    /// Fail with the produced error
    Fail(fn() -> Error),
}

/// Ordered record of tool invocations
pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) struct FakeExtractor {
    pub(crate) video: Behavior,
    pub(crate) audio: Behavior,
    pub(crate) calls: CallLog,
    /// When set, both fetches must be in flight at the same time to proceed
    pub(crate) rendezvous: Option<Arc<Barrier>>,
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn fetch(&self, url: &str, stream: StreamKind, output: &Path) -> crate::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch:{}:{}", stream, url));
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        let behavior = match stream {
            StreamKind::Video => self.video,
            StreamKind::Audio => self.audio,
        };
        apply(behavior, output).await
    }

    fn name(&self) -> &'static str {
        "fake-extractor"
    }
}

pub(crate) struct FakeMuxer {
    pub(crate) behavior: Behavior,
    pub(crate) calls: CallLog,
}

#[async_trait]
impl Muxer for FakeMuxer {
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> crate::Result<()> {
        self.calls.lock().unwrap().push(format!(
            "mux:{}+{}",
            file_name(video),
            file_name(audio)
        ));
        apply(self.behavior, output).await
    }

    fn name(&self) -> &'static str {
        "fake-muxer"
    }
}

async fn apply(behavior: Behavior, output: &Path) -> crate::Result<()> {
    match behavior {
        Behavior::Write => {
            tokio::fs::write(output, b"media").await?;
            Ok(())
        }
        Behavior::SucceedWithoutFile => Ok(()),
        Behavior::Fail(make) => Err(make()),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A service wired to fake tools inside a fresh temp dir
pub(crate) struct Harness {
    pub(crate) service: DownloadService,
    pub(crate) calls: CallLog,
    pub(crate) _temp_dir: tempfile::TempDir,
}

impl Harness {
    pub(crate) fn output_dir(&self) -> PathBuf {
        self.service.output_dir().clone()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub(crate) fn harness(video: Behavior, audio: Behavior, mux: Behavior) -> Harness {
    harness_with(video, audio, mux, None)
}

pub(crate) fn harness_with(
    video: Behavior,
    audio: Behavior,
    mux: Behavior,
    rendezvous: Option<Arc<Barrier>>,
) -> Harness {
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.download.output_dir = temp_dir.path().join("downloads");
    config.logging.error_log = None;

    let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
    let tools = Tools {
        extractor: Arc::new(FakeExtractor {
            video,
            audio,
            calls: calls.clone(),
            rendezvous,
        }),
        muxer: Arc::new(FakeMuxer {
            behavior: mux,
            calls: calls.clone(),
        }),
    };

    Harness {
        service: DownloadService::with_tools(config, tools),
        calls,
        _temp_dir: temp_dir,
    }
}

/// Write an executable `#!/bin/sh` script named `name` into `dir`
#[cfg(unix)]
pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}
