//! HTTP server layer for the upload relay.
//!
//! This module exposes the relay over HTTP: the upload page, the password
//! check and the upload endpoint itself.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │              GET /   POST /auth   POST /upload                  │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────┐  ┌───────────┐  │
//! │  │  handlers   │  │    form     │  │   page   │  │  routes   │  │
//! │  │ (requests)  │  │ (multipart) │  │  (HTML)  │  │ (router)  │  │
//! │  └─────────────┘  └─────────────┘  └──────────┘  └───────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod form;
pub mod handlers;
pub mod page;
pub mod routes;

pub use form::{read_password, read_upload_form, FILE_FIELD, MAX_TEXT_FIELD_BYTES, PASSWORD_FIELD};
pub use handlers::{
    auth_handler, index_handler, not_found_handler, require_api_key, upload_handler, AppState,
    AuthResponse, ErrorResponse, NOT_FOUND_MESSAGE,
};
pub use page::{render_page, render_page_with_limit, HISTORY_LIMIT, HISTORY_STORAGE_KEY};
pub use routes::{create_router, RouterConfig};
