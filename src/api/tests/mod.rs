use super::*;
use crate::Config;
use crate::test_support::{Behavior, Harness, harness};
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use std::time::Duration;
use tower::ServiceExt;


const URL: &str = "https://www.youtube.com/watch?v=abc123";

fn router_for(h: &Harness) -> Router {
    create_router(Arc::new(h.service.clone()))
}

/// Router over the harness tools with a modified configuration
fn router_with(h: &Harness, edit: impl FnOnce(&mut Config)) -> Router {
    let mut config = (*h.service.config).clone();
    edit(&mut config);
    let service = DownloadService::with_tools(config, h.service.tools().clone());
    create_router(Arc::new(service))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_serves_until_cancelled() {
    let h = harness(Behavior::Write, Behavior::Write, Behavior::Write);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let shutdown = CancellationToken::new();

    let server = tokio::spawn(serve(
        listener,
        Arc::new(h.service.clone()),
        shutdown.clone(),
    ));

    let health: serde_json::Value = reqwest::get(format!("http://{}/health", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_cors_enabled() {
    let h = harness(Behavior::Write, Behavior::Write, Behavior::Write);
    let app = router_for(&h);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let h = harness(Behavior::Write, Behavior::Write, Behavior::Write);
    let app = router_with(&h, |c| c.server.cors_enabled = false);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let h = harness(Behavior::Write, Behavior::Write, Behavior::Write);
    let app = router_with(&h, |c| {
        c.server.cors_origins = vec!["http://app.example".to_string()]
    });

    let allowed = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://app.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        allowed.headers().get("access-control-allow-origin").unwrap(),
        "http://app.example"
    );

    let other = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://elsewhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(!other.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let h = harness(Behavior::Write, Behavior::Write, Behavior::Write);
    let response = router_for(&h).oneshot(get_request("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
