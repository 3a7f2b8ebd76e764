//! Core types shared by the service, the API and the client

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

/// Body of `POST /download/video`
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Source URL on an allowed site
    ///
    /// Kept as a raw JSON value so that a missing or non-string `url` can be
    /// reported as invalid input instead of a body rejection.
    #[serde(default)]
    #[schema(value_type = String)]
    pub url: serde_json::Value,
}

impl DownloadRequest {
    /// Build a request for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: serde_json::Value::String(url.into()),
        }
    }
}

/// Successful response of `POST /download/video`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadResponse {
    /// Base name of the produced file, retrievable under `/downloads/{file}`
    pub file: String,

    /// Non-fatal problems encountered after the file was produced
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Which elementary stream an extractor invocation fetches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Best video-only stream
    Video,
    /// Best audio-only stream
    Audio,
}

impl StreamKind {
    /// yt-dlp format selector for this stream
    pub fn format_selector(self) -> &'static str {
        match self {
            StreamKind::Video => "bestvideo[ext=mp4]/best",
            StreamKind::Audio => "bestaudio[ext=m4a]/best",
        }
    }

    /// File name suffix of the temporary file holding this stream
    pub fn temp_suffix(self) -> &'static str {
        match self {
            StreamKind::Video => "-video.mp4",
            StreamKind::Audio => "-audio.m4a",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Video => write!(f, "video"),
            StreamKind::Audio => write!(f, "audio"),
        }
    }
}

/// Timestamp-qualified identifier naming every file of one request
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Wrap an already derived identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three files belonging to one job
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobArtifacts {
    /// Temporary video-only stream
    pub video: PathBuf,
    /// Temporary audio-only stream
    pub audio: PathBuf,
    /// Final muxed file, kept after the job
    pub output: PathBuf,
}

impl JobArtifacts {
    /// Lay out the files of `job_id` inside `dir`
    pub fn new(dir: &Path, job_id: &JobId) -> Self {
        Self {
            video: dir.join(format!("{}{}", job_id, StreamKind::Video.temp_suffix())),
            audio: dir.join(format!("{}{}", job_id, StreamKind::Audio.temp_suffix())),
            output: dir.join(format!("{}.mp4", job_id)),
        }
    }

    /// Path of the temporary file for `stream`
    pub fn temp_path(&self, stream: StreamKind) -> &Path {
        match stream {
            StreamKind::Video => &self.video,
            StreamKind::Audio => &self.audio,
        }
    }

    /// Base name of the final output, as returned to clients
    pub fn output_file_name(&self) -> String {
        self.output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Number of digits in a job timestamp (milliseconds since the epoch)
const JOB_TIMESTAMP_DIGITS: usize = 13;

/// Role of a file the service wrote into the output directory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobFileKind {
    /// Final muxed file, `<id>-<ms>.mp4`
    Output,
    /// Stream temporary, `<id>-<ms>-video.mp4` or `<id>-<ms>-audio.m4a`
    Temporary,
}

/// Classify `file_name` as one of the service's job files
///
/// Returns `None` for anything whose name the service would not produce, so
/// unrelated files sharing the output directory are never mistaken for jobs.
pub fn job_file_kind(file_name: &str) -> Option<JobFileKind> {
    let (stem, kind) = if let Some(stem) = file_name
        .strip_suffix(StreamKind::Video.temp_suffix())
        .or_else(|| file_name.strip_suffix(StreamKind::Audio.temp_suffix()))
    {
        (stem, JobFileKind::Temporary)
    } else {
        (file_name.strip_suffix(".mp4")?, JobFileKind::Output)
    };

    let (_, timestamp) = stem.rsplit_once('-')?;
    let is_timestamp = timestamp.len() == JOB_TIMESTAMP_DIGITS
        && timestamp.bytes().all(|b| b.is_ascii_digit());
    is_timestamp.then_some(kind)
}
