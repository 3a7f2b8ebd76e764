//! Configuration types for vidmux

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the API binds to (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS headers (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed origins; "*" allows any origin (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve Swagger UI at /swagger-ui (default: false)
    #[serde(default)]
    pub swagger_ui: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: false,
        }
    }
}

/// Download behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory holding job temporaries and finished files (default: "./downloads")
    ///
    /// Everything in here is publicly retrievable under `/downloads/`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Domain substrings a submitted URL must contain (default: YouTube, Instagram, Facebook)
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            allowed_domains: default_allowed_domains(),
        }
    }
}

/// External tool paths (yt-dlp, ffmpeg)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Path to ffmpeg executable (auto-detected if None)
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Kill a subprocess running longer than this (None = wait indefinitely)
    #[serde(default, with = "optional_duration_serde")]
    pub timeout: Option<Duration>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_path: None,
            search_path: true,
            timeout: None,
        }
    }
}

/// Muxer output settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MuxConfig {
    /// Audio codec for the re-encoded audio stream (default: "aac")
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate (default: "192k")
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
        }
    }
}

/// Retention policy for finished files and orphaned temporaries
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Run the background sweeper (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Age after which finished files are deleted (default: 7 days)
    #[serde(default = "default_max_age", with = "duration_serde")]
    pub max_age: Duration,

    /// Age after which leftover job temporaries are deleted (default: 1 hour)
    #[serde(default = "default_orphan_max_age", with = "duration_serde")]
    pub orphan_max_age: Duration,

    /// Time between sweeps (default: 10 minutes)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    pub sweep_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age: default_max_age(),
            orphan_max_age: default_orphan_max_age(),
            sweep_interval: default_sweep_interval(),
        }
    }
}

/// Console log format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Logging configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (default: "info")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output format
    #[serde(default)]
    pub format: LogFormat,

    /// File receiving one JSON record per error (default: "error.log", None disables)
    #[serde(default = "default_error_log")]
    pub error_log: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            error_log: default_error_log(),
        }
    }
}

/// Where the client puts fetched videos
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Save into the user's downloads folder
    #[default]
    Browser,
    /// Save to app storage and add to a media library album
    Library,
    /// Save to app storage and hand the file to a share command
    Share,
}

/// Client-side configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the vidmux server (default: "http://localhost:8080")
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Persistence capability selected at startup
    #[serde(default)]
    pub sink: SinkKind,

    /// App-local storage directory (default: platform data dir + "/vidmux")
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    /// Root of the media library used by the `library` sink (default: platform video dir)
    #[serde(default)]
    pub library_dir: Option<PathBuf>,

    /// Album name used by the `library` sink (default: "vidmux")
    #[serde(default = "default_album")]
    pub album: String,

    /// Command receiving the saved file path for the `share` sink (default: "xdg-open")
    #[serde(default = "default_share_command")]
    pub share_command: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            sink: SinkKind::default(),
            storage_dir: None,
            library_dir: None,
            album: default_album(),
            share_command: default_share_command(),
        }
    }
}

/// Main configuration
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Output directory and URL allow-list
    #[serde(default)]
    pub download: DownloadConfig,

    /// External binaries
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Muxer output settings
    #[serde(default)]
    pub mux: MuxConfig,

    /// Retention policy
    #[serde(default)]
    pub retention: RetentionConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Client settings
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&contents).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.download.allowed_domains.iter().all(|d| d.trim().is_empty()) {
            return Err(Error::Config {
                message: "at least one allowed domain is required".to_string(),
                key: Some("allowed_domains".to_string()),
            });
        }
        if self.retention.enabled && self.retention.sweep_interval.is_zero() {
            return Err(Error::Config {
                message: "sweep_interval must be greater than zero".to_string(),
                key: Some("sweep_interval".to_string()),
            });
        }
        if self.tools.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::Config {
                message: "timeout must be greater than zero".to_string(),
                key: Some("timeout".to_string()),
            });
        }
        Ok(())
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_allowed_domains() -> Vec<String> {
    vec![
        "youtube.com".to_string(),
        "instagram.com".to_string(),
        "facebook.com".to_string(),
    ]
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

fn default_max_age() -> Duration {
    Duration::from_secs(7 * 24 * 60 * 60)
}

fn default_orphan_max_age() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_error_log() -> Option<PathBuf> {
    Some(PathBuf::from("error.log"))
}

fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_album() -> String {
    "vidmux".to_string()
}

fn default_share_command() -> String {
    "xdg-open".to_string()
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
