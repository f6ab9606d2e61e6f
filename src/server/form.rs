//! Multipart form reading for the upload and auth endpoints.
//!
//! Forms are read field by field so that no field can occupy more memory
//! than its limit. An oversized `file` part is still consumed to the end (and
//! counted) so that fields after it, notably `password`, are seen and the gate
//! decision does not depend on field order.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header;
use axum::Form;
use bytes::{Bytes, BytesMut};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::relay::{ImageFile, UploadRequest};

/// Form field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Form field carrying the shared secret.
pub const PASSWORD_FIELD: &str = "password";

/// Largest accepted text field, in bytes.
pub const MAX_TEXT_FIELD_BYTES: usize = 4096;

/// Result of reading one field under a byte limit.
struct LimitedRead {
    /// Field contents, `None` when the limit was exceeded
    data: Option<Bytes>,
    /// Total bytes the field carried
    size: u64,
}

async fn read_limited(field: &mut Field<'_>, limit: u64) -> Result<LimitedRead, MultipartError> {
    let mut buffer = BytesMut::new();
    let mut size: u64 = 0;
    let mut overflowed = false;

    while let Some(chunk) = field.chunk().await? {
        size += chunk.len() as u64;
        if overflowed {
            continue;
        }
        if size > limit {
            overflowed = true;
            buffer = BytesMut::new();
            continue;
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(LimitedRead {
        data: (!overflowed).then(|| buffer.freeze()),
        size,
    })
}

fn text_value(read: LimitedRead) -> Option<String> {
    read.data.and_then(|d| String::from_utf8(d.to_vec()).ok())
}

/// Read an upload form into an [`UploadRequest`].
///
/// Never fails: a malformed body yields a request without a file, which the
/// relay rejects after the gate has had its say. Only the first `file` and
/// `password` fields count; other fields are skipped.
pub async fn read_upload_form(mut multipart: Multipart, max_upload_size: u64) -> UploadRequest {
    let mut request = UploadRequest::default();
    let mut seen_file = false;
    let mut seen_password = false;

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Malformed multipart body: {}", e.body_text());
                request.file = None;
                break;
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) if !seen_file => {
                seen_file = true;
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);

                let read = match read_limited(&mut field, max_upload_size).await {
                    Ok(read) => read,
                    Err(e) => {
                        warn!("Upload interrupted while reading file: {}", e.body_text());
                        request.file = None;
                        break;
                    }
                };

                let Some(file_name) = file_name else {
                    debug!("`file` field is not a file part");
                    continue;
                };

                request.file = Some(match read.data {
                    Some(data) => ImageFile {
                        file_name,
                        content_type,
                        size: read.size,
                        data,
                    },
                    None => ImageFile::oversized(file_name, content_type, read.size),
                });
            }
            Some(PASSWORD_FIELD) if !seen_password => {
                seen_password = true;
                match read_limited(&mut field, MAX_TEXT_FIELD_BYTES as u64).await {
                    Ok(read) => request.secret = text_value(read),
                    Err(e) => {
                        warn!("Malformed password field: {}", e.body_text());
                        request.file = None;
                        break;
                    }
                }
            }
            // Unread fields are skipped by the parser on the next iteration
            _ => {}
        }
    }

    request
}

#[derive(Debug, Deserialize)]
struct PasswordForm {
    #[serde(default)]
    password: Option<String>,
}

/// Extract the `password` field from a multipart or urlencoded form.
///
/// Returns `None` when the field is absent or the body cannot be read as a
/// form at all.
pub async fn read_password(request: Request) -> Option<String> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &()).await.ok()?;
        while let Ok(Some(mut field)) = multipart.next_field().await {
            let is_password = field.name() == Some(PASSWORD_FIELD);
            if is_password {
                let read = read_limited(&mut field, MAX_TEXT_FIELD_BYTES as u64)
                    .await
                    .ok()?;
                return text_value(read);
            }
        }
        None
    } else {
        let Form(form) = Form::<PasswordForm>::from_request(request, &()).await.ok()?;
        form.password
    }
}
