//! Error types for auth-enhanced.
//!
//! A single [`AuthEnhancedError`] enum covers the error taxonomy of the app:
//! configuration problems (fatal at startup or command time), token/crypto
//! failures (surfaced as user-facing messages), domain validation errors, and
//! management-command errors.
//!
//! Token and crypto failures are deliberately flattened into one unspecific
//! message, except for expiry, which gets its own distinct variant so the
//! user can be told how long tokens stay valid.

use std::fmt;

use thiserror::Error;

/// A validation failure with a short machine-readable code.
///
/// Mirrors form-level validation: the message is shown to the end user, the
/// code identifies the failure kind (e.g. `email_not_unique`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The human-readable error message.
    pub message: String,
    /// A short code identifying the kind of validation failure.
    pub code: String,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for auth-enhanced.
#[derive(Error, Debug)]
pub enum AuthEnhancedError {
    /// A configuration value is missing or invalid. Fatal at startup or at
    /// management-command time.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A duration string could not be converted to seconds.
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Something went wrong during crypto operations. The message is kept
    /// unspecific to prevent fingerprinting of the actual failure mode.
    #[error("{0}")]
    Crypto(String),

    /// A verification token was valid once but has expired.
    #[error(
        "It seems like you have submitted a valid verification token, that is \
         expired. Be aware, that verification tokens are considered valid for \
         {max_age} seconds and must be used within that time period."
    )]
    TokenExpired {
        /// The configured maximum token age in seconds.
        max_age: u64,
    },

    /// One or more input fields failed validation.
    #[error("Validation error: {0}")]
    Validation(ValidationError),

    /// A lookup expected exactly one record but found none.
    #[error("Does not exist: {0}")]
    DoesNotExist(String),

    /// A management command failed; the message is actionable and lists the
    /// offending identifiers where applicable.
    #[error("{0}")]
    Command(String),

    /// An underlying storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthEnhancedError {
    /// The unspecific crypto failure used for forged, malformed or otherwise
    /// unusable tokens and for token issuance failures.
    pub fn crypto_unspecific() -> Self {
        Self::Crypto(
            "Something went wrong during crypto operations. This error message \
             is unspecific to prevent any fingerprinting."
                .to_string(),
        )
    }

    /// Returns `true` if this error is one of the flattened crypto failures.
    pub const fn is_crypto(&self) -> bool {
        matches!(self, Self::Crypto(_))
    }
}

impl From<ValidationError> for AuthEnhancedError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

/// A convenience type alias for `Result<T, AuthEnhancedError>`.
pub type AuthEnhancedResult<T> = Result<T, AuthEnhancedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("A valid email address is required!", "valid_email_required");
        assert_eq!(err.to_string(), "A valid email address is required!");
        assert_eq!(err.code, "valid_email_required");
    }

    #[test]
    fn test_token_expired_mentions_max_age() {
        let err = AuthEnhancedError::TokenExpired { max_age: 3600 };
        assert!(err.to_string().contains("3600 seconds"));
    }

    #[test]
    fn test_crypto_unspecific_is_generic() {
        let err = AuthEnhancedError::crypto_unspecific();
        assert!(err.is_crypto());
        assert!(err.to_string().contains("unspecific"));
        // must not hint at the concrete failure mode
        assert!(!err.to_string().contains("signature"));
        assert!(!err.to_string().contains("expired"));
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: AuthEnhancedError =
            ValidationError::new("duplicate", "email_not_unique").into();
        assert!(matches!(err, AuthEnhancedError::Validation(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: AuthEnhancedError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }
}
