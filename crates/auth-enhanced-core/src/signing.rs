//! Cryptographic signing for auth-enhanced.
//!
//! Provides the low-level signing primitive the verification tokens are built
//! on: HMAC-SHA256 over `value:timestamp`, with a salt-derived key and a
//! base62-encoded timestamp for expiry enforcement.
//!
//! Verification failures are flattened into one unspecific [`Crypto`] error;
//! only expiry is surfaced distinctly, as [`TokenExpired`], so callers can
//! tell the user how long tokens stay valid.
//!
//! [`Crypto`]: AuthEnhancedError::Crypto
//! [`TokenExpired`]: AuthEnhancedError::TokenExpired

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AuthEnhancedError;

type HmacSha256 = Hmac<Sha256>;

/// The separator used between value, timestamp and signature.
const SEP: &str = ":";

/// Default salt for [`Signer`] instances.
const DEFAULT_SALT: &str = "auth-enhanced.signer";

// ============================================================
// Signer
// ============================================================

/// Signs and verifies strings using HMAC-SHA256.
///
/// # Examples
///
/// ```
/// use auth_enhanced_core::signing::Signer;
///
/// let signer = Signer::new("my-secret-key");
/// let signed = signer.sign("hello");
/// assert_eq!(signer.unsign(&signed).unwrap(), "hello");
/// ```
pub struct Signer {
    key: String,
    salt: String,
}

impl Signer {
    /// Creates a new `Signer` with the given secret key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            salt: DEFAULT_SALT.to_string(),
        }
    }

    /// Sets the salt for the HMAC.
    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = salt.into();
        self
    }

    /// Computes the HMAC-SHA256 signature for a value.
    fn make_signature(&self, value: &str) -> String {
        let salted_key = format!("{}:{}", self.salt, self.key);
        let mut mac =
            HmacSha256::new_from_slice(salted_key.as_bytes()).expect("HMAC accepts any key size");
        mac.update(value.as_bytes());
        let result = mac.finalize().into_bytes();
        URL_SAFE_NO_PAD.encode(result)
    }

    /// Signs a value, returning `"value:signature"`.
    pub fn sign(&self, value: &str) -> String {
        let sig = self.make_signature(value);
        format!("{value}{SEP}{sig}")
    }

    /// Verifies and returns the original value from a signed string.
    ///
    /// # Errors
    ///
    /// Returns the unspecific crypto error if the signature is invalid or
    /// the format is wrong.
    pub fn unsign(&self, signed_value: &str) -> Result<String, AuthEnhancedError> {
        let (value, sig) = signed_value
            .rsplit_once(SEP)
            .ok_or_else(AuthEnhancedError::crypto_unspecific)?;

        let expected = self.make_signature(value);
        if constant_time_eq(sig, &expected) {
            return Ok(value.to_string());
        }

        Err(AuthEnhancedError::crypto_unspecific())
    }
}

// ============================================================
// TimestampSigner
// ============================================================

/// Signs and verifies strings with embedded timestamps.
///
/// This allows signed values to expire after a maximum age.
///
/// # Examples
///
/// ```
/// use auth_enhanced_core::signing::TimestampSigner;
///
/// let signer = TimestampSigner::new("my-secret-key");
/// let signed = signer.sign("hello");
/// assert_eq!(signer.unsign(&signed, None).unwrap(), "hello");
/// ```
pub struct TimestampSigner {
    signer: Signer,
}

impl TimestampSigner {
    /// Creates a new `TimestampSigner` with the given secret key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            signer: Signer::new(key).with_salt("auth-enhanced.timestamp-signer"),
        }
    }

    /// Sets the salt for the HMAC.
    #[must_use]
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.signer = self.signer.with_salt(salt);
        self
    }

    /// Returns the current timestamp as seconds since epoch, base62-encoded.
    fn get_timestamp() -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        base62_encode(secs)
    }

    /// Signs a value with an embedded timestamp.
    ///
    /// Format: `"value:timestamp:signature"`.
    pub fn sign(&self, value: &str) -> String {
        let timestamp = Self::get_timestamp();
        let value_with_ts = format!("{value}{SEP}{timestamp}");
        self.signer.sign(&value_with_ts)
    }

    /// Verifies and returns the original value from a timestamp-signed string.
    ///
    /// If `max_age` is `Some(seconds)`, the signature is rejected once it is
    /// *older* than the given number of seconds; a signature that is exactly
    /// `max_age` old still verifies.
    ///
    /// # Errors
    ///
    /// Returns [`AuthEnhancedError::TokenExpired`] if the timestamp has
    /// expired, and the unspecific crypto error for anything else that is
    /// wrong with the signed value.
    pub fn unsign(
        &self,
        signed_value: &str,
        max_age: Option<u64>,
    ) -> Result<String, AuthEnhancedError> {
        let value_with_ts = self.signer.unsign(signed_value)?;

        // Split off the timestamp (last segment)
        let (value, timestamp_str) = value_with_ts
            .rsplit_once(SEP)
            .ok_or_else(AuthEnhancedError::crypto_unspecific)?;

        if let Some(max_age) = max_age {
            let ts = base62_decode(timestamp_str)
                .map_err(|_| AuthEnhancedError::crypto_unspecific())?;

            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs());

            if now.saturating_sub(ts) > max_age {
                return Err(AuthEnhancedError::TokenExpired { max_age });
            }
        }

        Ok(value.to_string())
    }
}

// ============================================================
// Helpers
// ============================================================

/// Base62 character set (digits + uppercase + lowercase).
const BASE62_CHARS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Encodes a u64 into a base62 string.
fn base62_encode(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut chars = Vec::new();
    while n > 0 {
        chars.push(BASE62_CHARS[(n % 62) as usize]);
        n /= 62;
    }
    chars.reverse();
    String::from_utf8(chars).unwrap_or_default()
}

/// Decodes a base62 string into a u64.
fn base62_decode(s: &str) -> Result<u64, AuthEnhancedError> {
    if s.is_empty() {
        return Err(AuthEnhancedError::crypto_unspecific());
    }
    let mut result: u64 = 0;
    for c in s.bytes() {
        let digit = match c {
            b'0'..=b'9' => u64::from(c - b'0'),
            b'A'..=b'Z' => u64::from(c - b'A') + 10,
            b'a'..=b'z' => u64::from(c - b'a') + 36,
            _ => return Err(AuthEnhancedError::crypto_unspecific()),
        };
        result = result
            .checked_mul(62)
            .and_then(|r| r.checked_add(digit))
            .ok_or_else(AuthEnhancedError::crypto_unspecific)?;
    }
    Ok(result)
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
