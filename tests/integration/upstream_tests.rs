//! imgbb client tests against a local stand-in server.
//!
//! Tests verify:
//! - The API key travels as the `key` query parameter and the image as `image`
//! - Success envelopes become hosted links, error envelopes become rejections
//! - Unreadable bodies and refused connections are transport-class failures
//!   that never echo the API key
//! - The full stack (router + client) relays end to end

use std::time::Duration;

use axum::http::StatusCode;
use tower::ServiceExt;

use imgbb_relay::error::UpstreamError;
use imgbb_relay::relay::ImageFile;
use imgbb_relay::upstream::{ImageHost, ImgbbClient};
use imgbb_relay::{create_router, RouterConfig};

use super::test_utils::{
    body_json, imgbb_error_json, imgbb_success_json, png_bytes, FakeUpstream, MultipartBuilder,
    SAMPLE_DELETE_URL, SAMPLE_THUMB_URL, SAMPLE_URL,
};

const API_KEY: &str = "super-secret-api-key";

fn client_for(upstream: &FakeUpstream) -> ImgbbClient {
    ImgbbClient::new(upstream.upload_url(), Duration::from_secs(5)).unwrap()
}

fn sample_file() -> ImageFile {
    ImageFile::new("x.png", "image/png", png_bytes(2048))
}

#[tokio::test]
async fn test_client_success() {
    let upstream = FakeUpstream::start(StatusCode::OK, imgbb_success_json("x")).await;
    let client = client_for(&upstream);

    let hosted = client.upload(API_KEY, sample_file()).await.unwrap();
    assert_eq!(hosted.url, SAMPLE_URL);
    assert_eq!(hosted.thumb_url, SAMPLE_THUMB_URL);
    assert_eq!(hosted.delete_url, SAMPLE_DELETE_URL);
    assert_eq!(hosted.title.as_deref(), Some("x"));

    let captured = upstream.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].key.as_deref(), Some(API_KEY));
    assert_eq!(captured[0].image_file_name.as_deref(), Some("x.png"));
    assert_eq!(captured[0].image_content_type.as_deref(), Some("image/png"));
    assert_eq!(captured[0].image_len, 2048);
}

#[tokio::test]
async fn test_client_rejection_message() {
    let upstream = FakeUpstream::start(
        StatusCode::BAD_REQUEST,
        imgbb_error_json(400, "rate limited"),
    )
    .await;
    let client = client_for(&upstream);

    let err = client.upload(API_KEY, sample_file()).await.unwrap_err();
    match err {
        UpstreamError::Rejected { message } => assert_eq!(message, "rate limited"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_unreadable_body() {
    let upstream = FakeUpstream::start(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").await;
    let client = client_for(&upstream);

    let err = client.upload(API_KEY, sample_file()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::InvalidResponse(_)));
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn test_client_connection_refused_hides_key() {
    // Reserve a port, then free it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("http://{}/1/upload", addr).parse().unwrap();
    let client = ImgbbClient::new(url, Duration::from_secs(5)).unwrap();

    let err = client.upload(API_KEY, sample_file()).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Transport(_)));
    assert!(!err.to_string().contains(API_KEY));
}

// =============================================================================
// Full Stack
// =============================================================================

#[tokio::test]
async fn test_relay_through_client() {
    let upstream = FakeUpstream::start(StatusCode::OK, imgbb_success_json("holiday")).await;
    let router = create_router(
        client_for(&upstream),
        RouterConfig::new(Some(API_KEY.to_string()))
            .with_secret("abc123")
            .with_tracing(false),
    );

    let request = MultipartBuilder::new()
        .text("password", "abc123")
        .file("file", "x.png", "image/png", &png_bytes(2048))
        .into_request("/upload");
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["url"], SAMPLE_URL);
    assert_eq!(json["filename"], "holiday");

    let captured = upstream.captured();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].key.as_deref(), Some(API_KEY));
}

#[tokio::test]
async fn test_relay_upstream_rejection_through_client() {
    let upstream = FakeUpstream::start(
        StatusCode::BAD_REQUEST,
        imgbb_error_json(400, "Invalid API v1 key."),
    )
    .await;
    let router = create_router(
        client_for(&upstream),
        RouterConfig::new(Some(API_KEY.to_string())).with_tracing(false),
    );

    let request = MultipartBuilder::new()
        .file("file", "x.png", "image/png", &png_bytes(64))
        .into_request("/upload");
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["detail"], "Invalid API v1 key.");
}

#[tokio::test]
async fn test_relay_unreadable_upstream_is_500() {
    let upstream = FakeUpstream::start(StatusCode::OK, "not json").await;
    let router = create_router(
        client_for(&upstream),
        RouterConfig::new(Some(API_KEY.to_string())).with_tracing(false),
    );

    let request = MultipartBuilder::new()
        .file("file", "x.png", "image/png", &png_bytes(64))
        .into_request("/upload");
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert!(!json["error"].as_str().unwrap().contains(API_KEY));
}
