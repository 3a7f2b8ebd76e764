//! REST API server module
//!
//! Exposes the download orchestration over HTTP and serves the produced files.

use crate::Result;
use crate::error::Error;
use crate::service::DownloadService;
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// - `POST /download/video` - Fetch, merge and store one video
/// - `GET /downloads/:filename` - Retrieve a produced file
/// - `GET /health` - Health check with tool availability
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive documentation (if enabled)
pub fn create_router(service: Arc<DownloadService>) -> Router {
    let config = service.config.clone();
    let files = ServeDir::new(service.output_dir());
    let state = AppState::new(service, config.clone());

    let router = Router::new()
        .route("/download/video", post(routes::download_video))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .nest_service("/downloads", files);

    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    // Last layer applied runs first: CORS, then tracing, then the panic boundary.
    let router = router
        .with_state(state)
        .layer(CatchPanicLayer::custom(error_response::handle_panic))
        .layer(TraceLayer::new_for_http());

    if config.server.cors_enabled {
        router.layer(build_cors_layer(&config.server.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// "*" or an empty list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address
///
/// Runs until `shutdown` is cancelled; in-flight requests are allowed to finish.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use vidmux::{Config, DownloadService};
///
/// # async fn example() -> vidmux::Result<()> {
/// let service = Arc::new(DownloadService::new(Config::default()));
/// vidmux::api::start_api_server(service, CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    service: Arc<DownloadService>,
    shutdown: CancellationToken,
) -> Result<()> {
    let bind_address = service.config.server.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let listener = TcpListener::bind(bind_address).await.map_err(Error::Io)?;
    serve(listener, service, shutdown).await
}

/// Serve the API on an already bound listener until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    service: Arc<DownloadService>,
    shutdown: CancellationToken,
) -> Result<()> {
    let address: Option<SocketAddr> = listener.local_addr().ok();
    tracing::info!(address = ?address, "API server listening");

    let app = create_router(service);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
