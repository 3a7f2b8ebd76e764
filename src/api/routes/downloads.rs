//! Download request handler

use crate::api::AppState;
use crate::error::Error;
use crate::types::{DownloadRequest, DownloadResponse};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

/// POST /download/video - Fetch, merge and store one video
///
/// A body that is not a JSON object, or whose `url` is missing or not a
/// string, is treated as invalid input.
#[utoipa::path(
    post,
    path = "/download/video",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Video merged; retrieve it under /downloads/{file}", body = DownloadResponse),
        (status = 400, description = "Invalid or unsupported URL, or no matching format", body = crate::error::ApiError),
        (status = 404, description = "Content not found", body = crate::error::ApiError),
        (status = 429, description = "Upstream rate limit reached", body = crate::error::ApiError),
        (status = 500, description = "Download, merge or cleanup failed", body = crate::error::ApiError),
        (status = 503, description = "yt-dlp or ffmpeg unavailable", body = crate::error::ApiError)
    )
)]
pub async fn download_video(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, Error> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "request body rejected");
            DownloadRequest {
                url: serde_json::Value::Null,
            }
        }
    };

    let response = state.service.download(request.url.as_str()).await?;
    Ok(Json(response))
}
