//! The signup flow.
//!
//! [`SignupService::register`] is the single entry point for creating
//! accounts: it validates the input, derives the initial active flag from
//! the operation mode, creates the account (the store attaches the
//! enhancement record) and dispatches the signup notifications exactly once.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use auth_enhanced_core::error::{AuthEnhancedResult, ValidationError};
use auth_enhanced_core::settings::{AuthSettings, OperationMode};

use crate::activation::initial_is_active;
use crate::crypto::TokenService;
use crate::email::SignupNotifier;
use crate::store::UserStore;
use crate::user::{Account, NewAccount};

/// Good enough to reject obviously bogus addresses; real validation happens
/// when the verification mail arrives (or doesn't).
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static pattern is valid"));

/// Returns `true` if the address looks like an email address.
pub fn is_plausible_email(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

/// Handles account registration.
pub struct SignupService {
    settings: AuthSettings,
    store: Arc<dyn UserStore>,
    notifier: SignupNotifier,
    tokens: TokenService,
}

impl SignupService {
    /// Creates the service. The token service is derived from the settings.
    pub fn new(settings: AuthSettings, store: Arc<dyn UserStore>, notifier: SignupNotifier) -> Self {
        let tokens = TokenService::new(&settings);
        Self {
            settings,
            store,
            notifier,
            tokens,
        }
    }

    /// Registers a new account.
    ///
    /// The caller-provided `is_active` flag is ignored; the operation mode
    /// decides whether the account starts out active.
    ///
    /// # Errors
    ///
    /// Validation failures surface as
    /// [`Validation`](auth_enhanced_core::AuthEnhancedError::Validation)
    /// with a short code: `username_required`, `username_not_unique`,
    /// `valid_email_required` or `email_not_unique`.
    pub async fn register(&self, mut new_account: NewAccount) -> AuthEnhancedResult<Account> {
        self.validate(&new_account).await?;

        new_account.is_active = initial_is_active(self.settings.operation_mode);
        let account = self.store.create(new_account).await?;

        self.notifier.dispatch(&account, &self.tokens).await?;

        Ok(account)
    }

    async fn validate(&self, new_account: &NewAccount) -> AuthEnhancedResult<()> {
        if new_account.username.is_empty() {
            return Err(ValidationError::new("A username is required!", "username_required").into());
        }

        if self
            .store
            .get_by_username(&new_account.username)
            .await?
            .is_some()
        {
            return Err(ValidationError::new(
                "This username is already in use!",
                "username_not_unique",
            )
            .into());
        }

        // the email address is only mandatory in email-activation mode
        if self.settings.operation_mode == OperationMode::EmailActivation
            && !is_plausible_email(&new_account.email)
        {
            return Err(ValidationError::new(
                "A valid email address is required!",
                "valid_email_required",
            )
            .into());
        }

        // don't disclose anything beyond the fact that the address is taken
        if !new_account.email.is_empty()
            && self.store.find_by_email(&new_account.email).await?.is_some()
        {
            return Err(ValidationError::new(
                "This email address is already in use! Email addresses may \
                 only be registered once!",
                "email_not_unique",
            )
            .into());
        }

        Ok(())
    }
}
