//! Password check tests for `POST /auth`.
//!
//! Tests verify:
//! - Correct passwords pass via multipart and urlencoded bodies
//! - Wrong, missing and differently-cased passwords are refused with 403
//! - Without a configured password every check passes

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use imgbb_relay::{create_router, RouterConfig};

use super::test_utils::{body_json, MockImageHost, MultipartBuilder};

const SECRET: &str = "abc123";

fn gated_router() -> axum::Router {
    create_router(
        MockImageHost::succeeding(),
        RouterConfig::new(Some("test-key".to_string()))
            .with_secret(SECRET)
            .with_tracing(false),
    )
}

fn urlencoded(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_correct_password_multipart() {
    let request = MultipartBuilder::new()
        .text("password", SECRET)
        .into_request("/auth");

    let response = gated_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn test_correct_password_urlencoded() {
    let response = gated_router()
        .oneshot(urlencoded("password=abc123"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_password_is_403() {
    let request = MultipartBuilder::new()
        .text("password", "wrong")
        .into_request("/auth");

    let response = gated_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({ "success": false }));
}

#[tokio::test]
async fn test_password_is_case_and_whitespace_sensitive() {
    let router = gated_router();

    for candidate in ["ABC123", "abc123%20", "%20abc123", "abc12"] {
        let response = router
            .clone()
            .oneshot(urlencoded(&format!("password={}", candidate)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{}", candidate);
    }
}

#[tokio::test]
async fn test_missing_password_is_403() {
    let router = gated_router();

    // Multipart form without the field
    let request = MultipartBuilder::new()
        .text("other", "value")
        .into_request("/auth");
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // No body at all
    let request = Request::builder()
        .method("POST")
        .uri("/auth")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_no_configured_password_always_passes() {
    let router = create_router(
        MockImageHost::succeeding(),
        RouterConfig::new(Some("test-key".to_string())).with_tracing(false),
    );

    let response = router
        .clone()
        .oneshot(urlencoded("password=anything"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("POST")
        .uri("/auth")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
