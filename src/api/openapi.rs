//! OpenAPI documentation and schema generation
//!
//! The spec is generated at compile time by utoipa and served at
//! `/openapi.json` (and through Swagger UI when enabled).

use utoipa::OpenApi;

/// OpenAPI documentation for the vidmux REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "vidmux REST API",
        version = "0.1.0",
        description = "Fetch a social-media video as separate best-quality streams, merge them into one MP4 and serve the result",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        crate::api::routes::download_video,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::types::DownloadRequest,
            crate::types::DownloadResponse,
            crate::tools::ToolCapabilities,
            crate::api::routes::HealthResponse,
            crate::error::ApiError,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "downloads", description = "Video download and retrieval"),
        (name = "system", description = "Health and API documentation")
    )
)]
pub struct ApiDoc;
