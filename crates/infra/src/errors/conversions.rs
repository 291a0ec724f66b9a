//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use skysync_common::CommonError;
use skysync_domain::SkySyncError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SkySyncError);

impl From<InfraError> for SkySyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SkySyncError> for InfraError {
    fn from(value: SkySyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSkySyncError {
    fn into_skysync(self) -> SkySyncError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SkySyncError */
/* -------------------------------------------------------------------------- */

impl IntoSkySyncError for HttpError {
    fn into_skysync(self) -> SkySyncError {
        if self.is_timeout() {
            return SkySyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SkySyncError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return SkySyncError::Decode(format!("HTTP response body unreadable: {self}"));
        }

        if self.is_builder() {
            return SkySyncError::InvalidInput(format!("HTTP request could not be built: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => SkySyncError::Auth(message),
                404 => SkySyncError::NotFound(message),
                400..=499 => SkySyncError::InvalidInput(message),
                _ => SkySyncError::Network(message),
            };
        }

        SkySyncError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_skysync())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → SkySyncError */
/* -------------------------------------------------------------------------- */

impl IntoSkySyncError for std::io::Error {
    fn into_skysync(self) -> SkySyncError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => SkySyncError::NotFound(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                SkySyncError::Storage(format!("permission denied: {self}"))
            }
            _ => SkySyncError::Storage(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_skysync())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → SkySyncError */
/* -------------------------------------------------------------------------- */

impl IntoSkySyncError for serde_json::Error {
    fn into_skysync(self) -> SkySyncError {
        if self.is_io() {
            return SkySyncError::Storage(format!("JSON I/O failure: {self}"));
        }
        SkySyncError::Decode(format!(
            "invalid JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_skysync())
    }
}

/* -------------------------------------------------------------------------- */
/* CommonError → SkySyncError */
/* -------------------------------------------------------------------------- */

impl IntoSkySyncError for CommonError {
    fn into_skysync(self) -> SkySyncError {
        let severity = self.severity();
        SkySyncError::Security(format!("[{severity}] {self}"))
    }
}

impl From<CommonError> for InfraError {
    fn from(value: CommonError) -> Self {
        InfraError(value.into_skysync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
