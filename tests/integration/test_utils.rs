//! Test utilities for integration tests.
//!
//! This module provides a mock image host, a multipart body builder and a
//! local server that stands in for the imgbb upload API.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt;
use serde::Deserialize;

use imgbb_relay::error::UpstreamError;
use imgbb_relay::relay::ImageFile;
use imgbb_relay::upstream::{HostedImage, ImageHost};

// =============================================================================
// Mock Image Host with Call Tracking
// =============================================================================

/// Metadata recorded for each upload the mock host receives.
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub api_key: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: u64,
}

/// A mock image host that counts calls and returns a fixed outcome.
pub struct MockImageHost {
    outcome: Result<HostedImage, UpstreamError>,
    call_count: Arc<AtomicUsize>,
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
}

impl MockImageHost {
    /// A host answering every upload with the sample image links.
    pub fn succeeding() -> Self {
        Self::with_outcome(Ok(sample_hosted_image(None)))
    }

    /// A host answering every upload with the sample links and an upstream title.
    pub fn succeeding_with_title(title: &str) -> Self {
        Self::with_outcome(Ok(sample_hosted_image(Some(title))))
    }

    /// A host failing every upload with `err`.
    pub fn failing(err: UpstreamError) -> Self {
        Self::with_outcome(Err(err))
    }

    fn with_outcome(outcome: Result<HostedImage, UpstreamError>) -> Self {
        Self {
            outcome,
            call_count: Arc::new(AtomicUsize::new(0)),
            uploads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl Clone for MockImageHost {
    fn clone(&self) -> Self {
        Self {
            outcome: self.outcome.clone(),
            call_count: Arc::clone(&self.call_count),
            uploads: Arc::clone(&self.uploads),
        }
    }
}

#[async_trait]
impl ImageHost for MockImageHost {
    async fn upload(&self, api_key: &str, file: ImageFile) -> Result<HostedImage, UpstreamError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.uploads.lock().unwrap().push(RecordedUpload {
            api_key: api_key.to_string(),
            file_name: file.file_name,
            content_type: file.content_type,
            size: file.size,
        });
        self.outcome.clone()
    }
}

pub const SAMPLE_URL: &str = "https://i.ibb.co/abc/x.png";
pub const SAMPLE_THUMB_URL: &str = "https://i.ibb.co/abc/t.png";
pub const SAMPLE_DELETE_URL: &str = "https://ibb.co/abc/del";

pub fn sample_hosted_image(title: Option<&str>) -> HostedImage {
    HostedImage {
        url: SAMPLE_URL.to_string(),
        thumb_url: SAMPLE_THUMB_URL.to_string(),
        delete_url: SAMPLE_DELETE_URL.to_string(),
        title: title.map(str::to_string),
    }
}

// =============================================================================
// Multipart Request Builder
// =============================================================================

const BOUNDARY: &str = "----relay-test-boundary-7d1f";

/// Builds `multipart/form-data` bodies by hand.
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file part.
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Add a plain text part.
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    /// Finish the body and wrap it in a POST request to `uri`.
    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

/// A small valid PNG header followed by filler, enough to look like an image.
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
    data.resize(len.max(data.len()), 0xAB);
    data
}

/// Collect a response body into a string.
pub async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Fake imgbb Server
// =============================================================================

/// What the fake upstream saw on one request.
#[derive(Debug, Clone, Default)]
pub struct CapturedUpload {
    pub key: Option<String>,
    pub image_file_name: Option<String>,
    pub image_content_type: Option<String>,
    pub image_len: usize,
}

#[derive(Clone)]
struct FakeUpstreamState {
    status: StatusCode,
    body: String,
    captured: Arc<Mutex<Vec<CapturedUpload>>>,
}

#[derive(Deserialize)]
struct KeyQuery {
    key: Option<String>,
}

async fn fake_upload(
    State(state): State<FakeUpstreamState>,
    Query(query): Query<KeyQuery>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut captured = CapturedUpload {
        key: query.key,
        ..Default::default()
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            captured.image_file_name = field.file_name().map(str::to_string);
            captured.image_content_type = field.content_type().map(str::to_string);
            captured.image_len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        }
    }

    state.captured.lock().unwrap().push(captured);
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

/// A running fake upstream.
pub struct FakeUpstream {
    pub addr: SocketAddr,
    captured: Arc<Mutex<Vec<CapturedUpload>>>,
}

impl FakeUpstream {
    /// Start a fake upstream answering every upload with `status` and `body`.
    pub async fn start(status: StatusCode, body: impl Into<String>) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = FakeUpstreamState {
            status,
            body: body.into(),
            captured: Arc::clone(&captured),
        };

        let app = Router::new()
            .route("/1/upload", post(fake_upload))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, captured }
    }

    /// The upload endpoint URL.
    pub fn upload_url(&self) -> url::Url {
        format!("http://{}/1/upload", self.addr).parse().unwrap()
    }

    pub fn captured(&self) -> Vec<CapturedUpload> {
        self.captured.lock().unwrap().clone()
    }
}

/// A successful imgbb response envelope.
pub fn imgbb_success_json(title: &str) -> String {
    serde_json::json!({
        "data": {
            "id": "abc",
            "title": title,
            "url_viewer": "https://ibb.co/abc",
            "url": SAMPLE_URL,
            "display_url": SAMPLE_URL,
            "size": 2048,
            "image": { "filename": "x.png", "name": "x", "mime": "image/png", "extension": "png", "url": SAMPLE_URL },
            "thumb": { "filename": "x.png", "name": "x", "mime": "image/png", "extension": "png", "url": SAMPLE_THUMB_URL },
            "delete_url": SAMPLE_DELETE_URL
        },
        "success": true,
        "status": 200
    })
    .to_string()
}

/// An imgbb error envelope.
pub fn imgbb_error_json(status: u16, message: &str) -> String {
    serde_json::json!({
        "status_code": status,
        "error": { "message": message, "code": 100 },
        "status_txt": "Bad Request",
        "success": false
    })
    .to_string()
}
