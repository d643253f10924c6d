//! Verification tokens.
//!
//! The app does *not* implement its own cryptographic functions; it wraps the
//! timestamp signer from the core crate into a single interface, configured
//! from the settings.
//!
//! Tokens are stateless: the signed value *is* the token, there is no
//! server-side token table and no revocation list.

use auth_enhanced_core::error::{AuthEnhancedError, AuthEnhancedResult};
use auth_enhanced_core::settings::AuthSettings;
use auth_enhanced_core::signing::TimestampSigner;

use crate::user::Account;

/// Issues and verifies the email verification tokens.
pub struct TokenService {
    signer: TimestampSigner,
    max_age: u64,
}

impl TokenService {
    /// Creates the service from the settings: the app-specific salt and the
    /// token max-age are taken from there.
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            signer: TimestampSigner::new(&settings.secret_key).with_salt(&settings.token_salt),
            max_age: settings.verification_token_max_age,
        }
    }

    /// Returns a verification token by signing the username.
    ///
    /// # Errors
    ///
    /// Returns the unspecific crypto error if the account carries no usable
    /// identifier.
    pub fn issue_token(&self, account: &Account) -> AuthEnhancedResult<String> {
        if account.username.is_empty() {
            return Err(AuthEnhancedError::crypto_unspecific());
        }

        Ok(self.signer.sign(&account.username))
    }

    /// Verifies a token and returns the username that was signed.
    ///
    /// # Errors
    ///
    /// - `None` or an empty token is a programming mistake on the caller's
    ///   side and yields a [`Crypto`](AuthEnhancedError::Crypto) error saying
    ///   so.
    /// - An expired token yields [`TokenExpired`](AuthEnhancedError::TokenExpired),
    ///   echoing the configured max-age.
    /// - Anything else wrong with the token yields the unspecific crypto
    ///   error.
    pub fn verify_token(&self, token: Option<&str>) -> AuthEnhancedResult<String> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => {
                return Err(AuthEnhancedError::Crypto(
                    "'verify_token()' was called without an actual token. You \
                     see this message, because this is probably a programming \
                     error/mistake."
                        .to_string(),
                ))
            }
        };

        self.signer.unsign(token, Some(self.max_age))
    }

    /// The configured maximum token age in seconds.
    pub const fn max_age(&self) -> u64 {
        self.max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn settings() -> AuthSettings {
        AuthSettings {
            secret_key: "only-for-testing".to_string(),
            ..AuthSettings::default()
        }
    }

    fn account(username: &str) -> Account {
        Account {
            id: 1,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            is_active: false,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let service = TokenService::new(&settings());
        let token = service.issue_token(&account("alice")).unwrap();
        assert_eq!(service.verify_token(Some(&token)).unwrap(), "alice");
    }

    #[test]
    fn test_issue_token_empty_username() {
        let service = TokenService::new(&settings());
        let err = service.issue_token(&account("")).unwrap_err();
        assert!(err.is_crypto());
        assert!(err.to_string().contains("unspecific"));
    }

    #[test]
    fn test_verify_token_none_is_programming_error() {
        let service = TokenService::new(&settings());
        let err = service.verify_token(None).unwrap_err();
        assert!(err.is_crypto());
        assert!(err.to_string().contains("programming error"));
    }

    #[test]
    fn test_verify_token_empty_is_programming_error() {
        let service = TokenService::new(&settings());
        assert!(service.verify_token(Some("")).is_err());
    }

    #[test]
    fn test_verify_forged_token_is_unspecific() {
        let service = TokenService::new(&settings());
        let err = service.verify_token(Some("alice:0:forged")).unwrap_err();
        assert!(err.is_crypto());
        assert!(err.to_string().contains("unspecific"));
    }

    #[test]
    fn test_tokens_bound_to_salt() {
        let service = TokenService::new(&settings());
        let token = service.issue_token(&account("alice")).unwrap();

        let other = TokenService::new(&AuthSettings {
            token_salt: "a-different-salt".to_string(),
            ..settings()
        });
        assert!(other.verify_token(Some(&token)).is_err());
    }

    #[test]
    fn test_max_age_from_settings() {
        let service = TokenService::new(&AuthSettings {
            verification_token_max_age: 3600,
            ..settings()
        });
        assert_eq!(service.max_age(), 3600);
    }
}
