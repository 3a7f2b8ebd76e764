//! HTTP client for the vidmux server

use crate::error::{ApiError, Error, Result};
use crate::types::{DownloadRequest, DownloadResponse};
use reqwest::StatusCode;
use url::Url;

/// A produced file retrieved from the server
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    /// Base name the server gave the file
    pub file_name: String,
    /// Declared media type, always starting with `video/`
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Client for `POST /download/video` and `GET /downloads/:filename`
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the server at `base_url`
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| Error::Config {
            message: format!("invalid server URL {base_url}: {e}"),
            key: Some("server_url".to_string()),
        })?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Address a produced file is retrieved from
    pub fn media_url(&self, file: &str) -> Result<Url> {
        let encoded = urlencoding::encode(file);
        self.join(&format!("downloads/{encoded}"))
    }

    /// Ask the server to fetch and merge `url`
    ///
    /// A non-2xx answer becomes [`Error::Remote`] carrying the server's message.
    pub async fn request_download(&self, url: &str) -> Result<DownloadResponse> {
        let endpoint = self.join("download/video")?;
        let response = self
            .http
            .post(endpoint)
            .json(&DownloadRequest::new(url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(remote_error(status, response).await);
        }
        Ok(response.json::<DownloadResponse>().await?)
    }

    /// Retrieve a produced file and check that it is a video
    pub async fn fetch_media(&self, file: &str) -> Result<FetchedMedia> {
        let response = self.http.get(self.media_url(file)?).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Remote {
                status: status.as_u16(),
                code: "retrieval_failed".to_string(),
                message: format!("Failed to retrieve {file} (HTTP {})", status.as_u16()),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("video/") {
            return Err(Error::UnexpectedMediaType { content_type });
        }

        let bytes = response.bytes().await?.to_vec();
        tracing::debug!(file, content_type, size = bytes.len(), "retrieved media");

        Ok(FetchedMedia {
            file_name: file.to_string(),
            content_type,
            bytes,
        })
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| Error::Config {
            message: format!("cannot build request URL for {path}: {e}"),
            key: Some("server_url".to_string()),
        })
    }
}

async fn remote_error(status: StatusCode, response: reqwest::Response) -> Error {
    match response.json::<ApiError>().await {
        Ok(body) => Error::Remote {
            status: status.as_u16(),
            code: body.error.code,
            message: body.error.message,
        },
        Err(_) => Error::Remote {
            status: status.as_u16(),
            code: "http_error".to_string(),
            message: format!("Server answered HTTP {}", status.as_u16()),
        },
    }
}
