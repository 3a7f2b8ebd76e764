//! Where fetched videos end up
//!
//! A [`MediaSink`] is chosen once at startup from [`SinkKind`]:
//!
//! - [`BrowserDownloadSink`] drops the file into the user's downloads folder
//! - [`MediaLibrarySink`] keeps a copy in app storage and adds it to an album
//! - [`ShareSink`] keeps a copy in app storage and hands it to a share prompt

use super::api::FetchedMedia;
use crate::config::{ClientConfig, SinkKind};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Maximum number of " (n)" suffixes tried before giving up on a file name
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Result of persisting one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMedia {
    /// File written by the sink
    pub path: PathBuf,
    /// Copy inside the media library, for [`MediaLibrarySink`]
    pub library_path: Option<PathBuf>,
    /// Whether the file was handed to a share prompt
    pub shared: bool,
}

impl SavedMedia {
    fn at(path: PathBuf) -> Self {
        Self {
            path,
            library_path: None,
            shared: false,
        }
    }
}

/// Persistence capability for fetched videos
#[async_trait]
pub trait MediaSink: Send + Sync {
    /// Store `media` and report where it went
    async fn persist(&self, media: FetchedMedia) -> Result<SavedMedia>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Saves into a downloads folder, renaming on collision like a browser does
#[derive(Debug, Clone)]
pub struct BrowserDownloadSink {
    dir: PathBuf,
}

impl BrowserDownloadSink {
    /// Save into `dir`
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Save into the platform downloads folder
    pub fn user_downloads() -> Result<Self> {
        let dir = dirs::download_dir().ok_or_else(|| Error::Config {
            message: "no downloads directory on this platform".to_string(),
            key: Some("sink".to_string()),
        })?;
        Ok(Self::new(dir))
    }
}

#[async_trait]
impl MediaSink for BrowserDownloadSink {
    async fn persist(&self, media: FetchedMedia) -> Result<SavedMedia> {
        let path = write_unique(&self.dir, &media).await?;
        tracing::info!(path = ?path, "saved video to downloads");
        Ok(SavedMedia::at(path))
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}

/// A platform media library organised in albums
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Add `asset` to `album`, creating the album on first use
    ///
    /// Returns the location of the asset inside the library.
    async fn insert(&self, asset: &Path, album: &str) -> Result<PathBuf>;
}

/// Media library kept as one directory per album
#[derive(Debug, Clone)]
pub struct FolderMediaLibrary {
    root: PathBuf,
}

impl FolderMediaLibrary {
    /// Library rooted at `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl MediaLibrary for FolderMediaLibrary {
    async fn insert(&self, asset: &Path, album: &str) -> Result<PathBuf> {
        let album_name = safe_file_name(album)?;
        let album_dir = self.root.join(album_name);
        fs::create_dir_all(&album_dir).await?;

        let asset_name = asset
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidInput(format!("not a file: {}", asset.display())))?;
        let (target, mut file) = create_unique(&album_dir.join(asset_name)).await?;
        let mut source = fs::File::open(asset).await?;
        tokio::io::copy(&mut source, &mut file).await?;
        file.flush().await?;
        Ok(target)
    }
}

/// Writes to app storage, then inserts the file into a media library album
pub struct MediaLibrarySink {
    storage: PathBuf,
    library: Arc<dyn MediaLibrary>,
    album: String,
}

impl MediaLibrarySink {
    /// Store under `storage` and add to `album` in `library`
    pub fn new(storage: PathBuf, library: Arc<dyn MediaLibrary>, album: impl Into<String>) -> Self {
        Self {
            storage,
            library,
            album: album.into(),
        }
    }
}

#[async_trait]
impl MediaSink for MediaLibrarySink {
    async fn persist(&self, media: FetchedMedia) -> Result<SavedMedia> {
        let path = write_unique(&self.storage, &media).await?;
        let library_path = self.library.insert(&path, &self.album).await?;
        tracing::info!(path = ?library_path, album = %self.album, "added video to media library");
        Ok(SavedMedia {
            path,
            library_path: Some(library_path),
            shared: false,
        })
    }

    fn name(&self) -> &'static str {
        "library"
    }
}

/// An interactive share or export step
#[async_trait]
pub trait SharePrompt: Send + Sync {
    /// Offer `path` to the user
    async fn share(&self, path: &Path) -> Result<()>;
}

/// Opens the saved file with an external command (e.g. `xdg-open`)
#[derive(Debug, Clone)]
pub struct CommandSharePrompt {
    command: String,
}

impl CommandSharePrompt {
    /// Use `command <path>` as the share step
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl SharePrompt for CommandSharePrompt {
    async fn share(&self, path: &Path) -> Result<()> {
        let status = tokio::process::Command::new(&self.command)
            .arg(path)
            .status()
            .await
            .map_err(|e| Error::ExternalTool(format!("failed to run {}: {}", self.command, e)))?;

        if !status.success() {
            return Err(Error::ExternalTool(format!(
                "{} exited with {}",
                self.command, status
            )));
        }
        Ok(())
    }
}

/// Writes to app storage, then prompts the user to share the file
pub struct ShareSink {
    storage: PathBuf,
    prompt: Arc<dyn SharePrompt>,
}

impl ShareSink {
    /// Store under `storage` and share through `prompt`
    pub fn new(storage: PathBuf, prompt: Arc<dyn SharePrompt>) -> Self {
        Self { storage, prompt }
    }
}

#[async_trait]
impl MediaSink for ShareSink {
    async fn persist(&self, media: FetchedMedia) -> Result<SavedMedia> {
        let path = write_unique(&self.storage, &media).await?;
        self.prompt.share(&path).await?;
        Ok(SavedMedia {
            path,
            library_path: None,
            shared: true,
        })
    }

    fn name(&self) -> &'static str {
        "share"
    }
}

/// Build the sink selected in `config`
pub fn build_sink(config: &ClientConfig) -> Result<Arc<dyn MediaSink>> {
    let sink: Arc<dyn MediaSink> = match config.sink {
        SinkKind::Browser => Arc::new(BrowserDownloadSink::user_downloads()?),
        SinkKind::Library => {
            let root = match &config.library_dir {
                Some(dir) => dir.clone(),
                None => dirs::video_dir().ok_or_else(|| Error::Config {
                    message: "no video directory on this platform; set library_dir".to_string(),
                    key: Some("library_dir".to_string()),
                })?,
            };
            Arc::new(MediaLibrarySink::new(
                storage_dir(config)?,
                Arc::new(FolderMediaLibrary::new(root)),
                config.album.clone(),
            ))
        }
        SinkKind::Share => Arc::new(ShareSink::new(
            storage_dir(config)?,
            Arc::new(CommandSharePrompt::new(config.share_command.clone())),
        )),
    };
    Ok(sink)
}

fn storage_dir(config: &ClientConfig) -> Result<PathBuf> {
    match &config.storage_dir {
        Some(dir) => Ok(dir.clone()),
        None => dirs::data_local_dir()
            .map(|d| d.join("vidmux"))
            .ok_or_else(|| Error::Config {
                message: "no local data directory on this platform; set storage_dir".to_string(),
                key: Some("storage_dir".to_string()),
            }),
    }
}

async fn write_unique(dir: &Path, media: &FetchedMedia) -> Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let name = safe_file_name(&media.file_name)?;
    let (path, mut file) = create_unique(&dir.join(name)).await?;
    file.write_all(&media.bytes).await?;
    file.flush().await?;
    Ok(path)
}

/// Reduce a server-supplied name to a single path component
fn safe_file_name(name: &str) -> Result<&str> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("unusable file name: {name:?}")))
}

/// Create `path`, or the first free `stem (n).ext`, and return it opened
///
/// Candidates are opened with `create_new`; a name taken in the meantime
/// moves on to the next number.
async fn create_unique(path: &Path) -> Result<(PathBuf, fs::File)> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("cannot extract file stem: {}", path.display())))?;
    let extension = path.extension().and_then(|e| e.to_str());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    for i in 0..=MAX_RENAME_ATTEMPTS {
        let candidate = match (i, extension) {
            (0, _) => path.to_path_buf(),
            (_, Some(ext)) => parent.join(format!("{stem} ({i}).{ext}")),
            (_, None) => parent.join(format!("{stem} ({i})")),
        };
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }

    Err(Error::Other(format!(
        "no free file name for {} after {} attempts",
        path.display(),
        MAX_RENAME_ATTEMPTS
    )))
}
