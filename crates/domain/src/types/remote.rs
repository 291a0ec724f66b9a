//! Response shapes for the token and constituent endpoints

use serde::{Deserialize, Serialize};

/// A single constituent record, kept as raw JSON.
pub type Record = serde_json::Value;

/// Raw reply from the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as received
    pub body: String,
}

impl AuthResponse {
    /// Reply with `status` and `body`.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// True for any 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Raw reply from the constituent endpoint, after status-specific payload
/// substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body, possibly replaced for 400 and 404
    pub body: String,
}

impl ApiResponse {
    /// Reply with `status` and `body`.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Reply whose body is `{"error": message}`.
    #[must_use]
    pub fn with_error(status: u16, message: &str) -> Self {
        Self { status, body: serde_json::json!({ "error": message }).to_string() }
    }

    /// True for any 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Success body of the token endpoint.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenPayload {
    /// Bearer token for API calls.
    pub access_token: String,
    /// Absent when the endpoint does not rotate the refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for TokenPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPayload")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Success body of the constituent list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentPage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next_link: Option<String>,
    #[serde(default)]
    pub value: Vec<Record>,
}
