//! Shared-secret access gate.
//!
//! The gate is a pure comparison between the secret a caller supplies and the
//! one held in server configuration. An empty configured secret disables the
//! gate and every caller passes.
//!
//! # Security Properties
//!
//! - **Exact match**: byte-for-byte, case-sensitive, no trimming or
//!   normalization
//! - **Constant-time comparison**: equal-length inputs are compared with
//!   `subtle`, so the position of the first differing byte is not observable
//! - **Stateless**: no lockout or attempt counting

use subtle::ConstantTimeEq;

/// Check `supplied` against `configured`.
///
/// Returns `true` when `configured` is empty or the two are identical.
pub fn verify(supplied: &str, configured: &str) -> bool {
    if configured.is_empty() {
        return true;
    }
    supplied.as_bytes().ct_eq(configured.as_bytes()).into()
}

/// Access configuration, built once from process configuration and shared
/// read-only by every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AccessConfig {
    required_secret: Option<String>,
}

impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl AccessConfig {
    /// Build from an optional secret. `None` and `Some("")` both disable the gate.
    pub fn new(required_secret: Option<String>) -> Self {
        Self {
            required_secret: required_secret.filter(|s| !s.is_empty()),
        }
    }

    /// A configuration with the gate disabled.
    pub fn open() -> Self {
        Self::default()
    }

    /// A configuration requiring `secret`.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self::new(Some(secret.into()))
    }

    /// Whether callers must present a secret.
    pub fn is_enabled(&self) -> bool {
        self.required_secret.is_some()
    }

    /// Check a caller-supplied secret. A missing secret is treated as empty.
    pub fn verify(&self, supplied: Option<&str>) -> bool {
        match &self.required_secret {
            None => true,
            Some(required) => verify(supplied.unwrap_or(""), required),
        }
    }
}
