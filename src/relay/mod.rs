//! Upload relay and access gate.
//!
//! This module holds the server's only real decision logic:
//!
//! - [`gate`] - stateless shared-secret check
//! - [`service`] - validation and forwarding of a single upload
//!
//! Both are independent of the HTTP layer; the handlers in
//! [`crate::server`] only translate multipart forms into an
//! [`UploadRequest`] and errors into responses.

pub mod gate;
pub mod service;
mod types;

pub use gate::{verify, AccessConfig};
pub use service::{RelaySettings, UploadRelay};
pub use types::{ImageFile, UploadRequest, UploadResult, DEFAULT_MAX_UPLOAD_SIZE};
