//! Error type for the shared primitives
//!
//! Everything in this crate fails in one of three ways: input bytes are not
//! in the expected encoding, a caller-supplied value is out of range, or the
//! cipher itself refuses. Crates that need more compose with it:
//!
//! ```rust,ignore
//! #[derive(Debug, Error)]
//! pub enum KeyFileError {
//!     #[error("key file is empty")]
//!     Empty,
//!
//!     #[error(transparent)]
//!     Common(#[from] CommonError),
//! }
//! ```

use std::fmt;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Failure raised by the shared primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Bytes that do not decode as `format` (base64, JSON, UTF-8)
    Encoding { format: &'static str, message: String },

    /// A caller-supplied value failed a precondition
    Validation { field: String, message: String },

    /// The cipher could not be set up, or refused to seal or open
    Cipher { operation: CipherOperation, message: String },
}

/// Which cipher step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherOperation {
    /// Building the cipher from the key
    Setup,
    /// Encrypting
    Seal,
    /// Decrypting and authenticating
    Open,
}

impl fmt::Display for CipherOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Seal => "seal",
            Self::Open => "open",
        })
    }
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding { format, message } => write!(f, "invalid {format}: {message}"),
            Self::Validation { field, message } => write!(f, "invalid {field}: {message}"),
            Self::Cipher { operation, message } => {
                write!(f, "cipher {operation} failed: {message}")
            }
        }
    }
}

impl std::error::Error for CommonError {}

/// How loudly a failure should be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Bad input that a caller may correct
    Warning,
    /// The operation failed
    Error,
    /// Wrong key or tampered data
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl CommonError {
    /// [`CommonError::Encoding`] for `format`.
    #[must_use]
    pub fn encoding<S: Into<String>>(format: &'static str, message: S) -> Self {
        Self::Encoding { format, message: message.into() }
    }

    /// [`CommonError::Validation`] for `field`.
    #[must_use]
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// [`CommonError::Cipher`] for the failed step.
    #[must_use]
    pub fn cipher<S: Into<String>>(operation: CipherOperation, message: S) -> Self {
        Self::Cipher { operation, message: message.into() }
    }

    /// Severity used when the error is logged or wrapped.
    ///
    /// A failed open is critical: the key is wrong or the data was altered.
    #[must_use]
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Encoding { .. } => ErrorSeverity::Warning,
            Self::Validation { .. } => ErrorSeverity::Error,
            Self::Cipher { operation: CipherOperation::Seal, .. } => ErrorSeverity::Error,
            Self::Cipher { .. } => ErrorSeverity::Critical,
        }
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::encoding("JSON", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_failing_piece() {
        assert_eq!(CommonError::encoding("base64", "bad byte").to_string(), "invalid base64: bad byte");
        assert_eq!(
            CommonError::cipher(CipherOperation::Open, "aead::Error").to_string(),
            "cipher open failed: aead::Error"
        );
    }

    #[test]
    fn failed_open_is_critical() {
        assert_eq!(
            CommonError::cipher(CipherOperation::Open, "x").severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(CommonError::validation("key", "short").severity(), ErrorSeverity::Error);
        assert!(ErrorSeverity::Critical > ErrorSeverity::Warning);
    }

    #[test]
    fn json_errors_convert_to_encoding() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CommonError = json_err.into();
        assert!(matches!(err, CommonError::Encoding { format: "JSON", .. }));
    }
}
