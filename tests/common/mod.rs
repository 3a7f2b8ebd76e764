//! Common test utilities for vidmux end-to-end tests
//!
//! Stand-in `yt-dlp` and `ffmpeg` scripts plus a server bound to an ephemeral port.

use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use vidmux::{Config, DownloadService};

/// Fake yt-dlp: writes a stream file unless the URL asks for a failure
const FAKE_YTDLP: &str = r#"
out=""
url=""
while [ $# -gt 0 ]; do
  case "$1" in
    --output) out="$2"; shift 2 ;;
    --format) shift 2 ;;
    *) url="$1"; shift ;;
  esac
done
case "$url" in
  *missing*) echo "ERROR: [youtube] missing: Video unavailable" >&2; exit 1 ;;
  *throttled*) echo "ERROR: HTTP Error 429: Too Many Requests" >&2; exit 1 ;;
  *noformat*) echo "ERROR: Requested format is not available" >&2; exit 1 ;;
esac
printf 'stream' > "$out"
"#;

/// Fake ffmpeg: writes the muxed output to its last argument
const FAKE_FFMPEG: &str = r#"
for last; do :; done
printf 'muxed' > "$last"
"#;

/// A running server with fake tools
pub struct TestServer {
    pub address: SocketAddr,
    pub output_dir: PathBuf,
    pub root: TempDir,
    shutdown: CancellationToken,
    handle: JoinHandle<vidmux::Result<()>>,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.address)
    }

    pub async fn stop(self) {
        self.shutdown.cancel();
        self.handle.await.unwrap().unwrap();
    }
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}

pub async fn start_server() -> TestServer {
    let root = tempfile::tempdir().unwrap();
    let bin = root.path().join("bin");
    std::fs::create_dir_all(&bin).unwrap();

    let mut config = Config::default();
    config.download.output_dir = root.path().join("downloads");
    config.tools.ytdlp_path = Some(write_script(&bin, "yt-dlp", FAKE_YTDLP));
    config.tools.ffmpeg_path = Some(write_script(&bin, "ffmpeg", FAKE_FFMPEG));
    config.tools.search_path = false;
    config.logging.error_log = None;
    let output_dir = config.download.output_dir.clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();
    let service = Arc::new(DownloadService::new(config));
    let handle = tokio::spawn(vidmux::api::serve(listener, service, shutdown.clone()));

    TestServer {
        address,
        output_dir,
        root,
        shutdown,
        handle,
    }
}
