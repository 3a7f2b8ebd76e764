//! End-to-end tests: real router over TCP, script stand-ins for yt-dlp and ffmpeg,
//! and the batch client on top.

#![cfg(unix)]

mod common;

use serde_json::{Value, json};
use std::sync::Arc;
use vidmux::client::{ApiClient, BatchSession, BrowserDownloadSink, PARTIAL_FAILURE_BANNER, Phase};

async fn post_download(base: &str, url: &str) -> (reqwest::StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(format!("{base}/download/video"))
        .json(&json!({ "url": url }))
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_download_merge_and_retrieve() {
    let server = common::start_server().await;
    let base = server.base_url();

    let (status, body) = post_download(&base, "https://www.youtube.com/watch?v=abc123").await;

    assert_eq!(status, 200, "{body}");
    let file = body["file"].as_str().unwrap().to_string();
    assert!(file.starts_with("watchv=abc123-") && file.ends_with(".mp4"));

    // Only the merged file is left behind
    let names: Vec<String> = std::fs::read_dir(&server.output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![file.clone()]);

    let response = reqwest::get(format!("{base}/downloads/{file}")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()["content-type"], "video/mp4");
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"muxed");

    server.stop().await;
}

#[tokio::test]
async fn test_extractor_failures_map_to_http_status() {
    let server = common::start_server().await;
    let base = server.base_url();

    let cases = [
        ("https://www.youtube.com/watch?v=missing", 404, "not_found"),
        ("https://www.youtube.com/watch?v=throttled", 429, "rate_limited"),
        ("https://www.youtube.com/watch?v=noformat", 400, "format_not_found"),
        ("https://example.com/not-supported", 400, "invalid_input"),
    ];
    for (url, expected_status, expected_code) in cases {
        let (status, body) = post_download(&base, url).await;
        assert_eq!(status.as_u16(), expected_status, "{url}: {body}");
        assert_eq!(body["error"]["code"], expected_code, "{url}");
    }

    let (status, body) = post_download(&base, "https://example.com/not-supported").await;
    assert_eq!(status, 400);
    assert_eq!(
        body["error"]["message"],
        "Please provide a valid URL from a supported site (youtube.com, instagram.com, facebook.com)"
    );

    server.stop().await;
}

#[tokio::test]
async fn test_batch_with_one_unsupported_input() {
    let server = common::start_server().await;
    let saved_dir = server.root.path().join("saved");
    let session = BatchSession::new(
        ApiClient::new(&server.base_url()).unwrap(),
        Arc::new(BrowserDownloadSink::new(saved_dir.clone())),
    );

    let inputs = [
        "https://www.youtube.com/watch?v=first",
        "https://example.com/not-supported",
        "https://www.facebook.com/watch/?v=third",
    ];
    for (index, url) in inputs.iter().enumerate() {
        if index > 0 {
            session.add_input().await.unwrap();
        }
        session.set_input(index, *url).await.unwrap();
    }

    let report = session.submit().await.unwrap();

    assert_eq!(report.phase, Phase::PartialFailure);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].index, 1);
    assert_eq!(report.saved.len(), 2);
    for (_, media) in &report.saved {
        assert_eq!(std::fs::read(&media.path).unwrap(), b"muxed");
    }

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.banner.as_deref(), Some(PARTIAL_FAILURE_BANNER));
    assert_eq!(snapshot.inputs, vec![String::new()]);

    server.stop().await;
}
