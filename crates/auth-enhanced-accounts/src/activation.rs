//! The account activation state machine.
//!
//! What happens to a newly registered account depends on the operation mode:
//!
//! | mode               | initial state   | activation trigger           |
//! |--------------------|-----------------|------------------------------|
//! | `AutoActivation`   | `Active`        | none, active immediately     |
//! | `EmailActivation`  | `PendingEmail`  | redeeming the emailed token  |
//! | `ManualActivation` | `PendingManual` | a superuser (admin actions)  |

use auth_enhanced_core::error::{AuthEnhancedError, AuthEnhancedResult};
use auth_enhanced_core::settings::OperationMode;

use crate::crypto::TokenService;
use crate::store::UserStore;
use crate::user::Account;

/// Where an account stands in the activation workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    /// Waiting for a superuser to activate the account.
    PendingManual,
    /// Waiting for the email verification token to be redeemed.
    PendingEmail,
    /// The account is active.
    Active,
}

/// Returns the initial `is_active` flag for a new account in the given mode.
pub const fn initial_is_active(mode: OperationMode) -> bool {
    matches!(mode, OperationMode::AutoActivation)
}

/// Classifies an account for display purposes.
pub const fn account_state(mode: OperationMode, account: &Account) -> AccountState {
    if account.is_active {
        return AccountState::Active;
    }
    match mode {
        OperationMode::EmailActivation => AccountState::PendingEmail,
        OperationMode::AutoActivation | OperationMode::ManualActivation => {
            AccountState::PendingManual
        }
    }
}

/// Redeems a verification token: verifies it, looks up the account behind
/// the signed username and marks it verified and active in one storage
/// operation.
///
/// Redeeming the same token again within its age window converges to the
/// same end state.
///
/// # Errors
///
/// Token problems surface as [`Crypto`](AuthEnhancedError::Crypto) or
/// [`TokenExpired`](AuthEnhancedError::TokenExpired); a token that verifies
/// but references no stored account is
/// [`DoesNotExist`](AuthEnhancedError::DoesNotExist).
pub async fn redeem_verification_token(
    token: &str,
    tokens: &TokenService,
    store: &dyn UserStore,
) -> AuthEnhancedResult<Account> {
    let username = tokens.verify_token(Some(token))?;

    let account = store
        .get_by_username(&username)
        .await?
        .ok_or_else(|| AuthEnhancedError::DoesNotExist(format!("no account named '{username}'")))?;

    store.mark_verified_and_activate(account.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_enhanced_core::settings::AuthSettings;

    use crate::store::MemoryUserStore;
    use crate::user::NewAccount;

    fn settings() -> AuthSettings {
        AuthSettings {
            secret_key: "only-for-testing".to_string(),
            ..AuthSettings::default()
        }
    }

    #[test]
    fn test_initial_is_active_per_mode() {
        assert!(initial_is_active(OperationMode::AutoActivation));
        assert!(!initial_is_active(OperationMode::EmailActivation));
        assert!(!initial_is_active(OperationMode::ManualActivation));
    }

    #[test]
    fn test_account_state_classification() {
        let mut account = Account {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            is_active: false,
            is_staff: false,
            is_superuser: false,
            date_joined: chrono::Utc::now(),
        };

        assert_eq!(
            account_state(OperationMode::EmailActivation, &account),
            AccountState::PendingEmail
        );
        assert_eq!(
            account_state(OperationMode::ManualActivation, &account),
            AccountState::PendingManual
        );

        account.is_active = true;
        for mode in [
            OperationMode::AutoActivation,
            OperationMode::EmailActivation,
            OperationMode::ManualActivation,
        ] {
            assert_eq!(account_state(mode, &account), AccountState::Active);
        }
    }

    #[tokio::test]
    async fn test_redeem_activates_and_verifies() {
        let settings = settings();
        let tokens = TokenService::new(&settings);
        let store = MemoryUserStore::new();

        let account = store
            .create(NewAccount::new("alice", "alice@example.com"))
            .await
            .unwrap();
        let token = tokens.issue_token(&account).unwrap();

        let redeemed = redeem_verification_token(&token, &tokens, &store)
            .await
            .unwrap();
        assert!(redeemed.is_active);

        let enhancement = store.enhancement_of(account.id).await.unwrap().unwrap();
        assert!(enhancement.email_is_verified());
    }

    #[tokio::test]
    async fn test_redeem_twice_converges() {
        let settings = settings();
        let tokens = TokenService::new(&settings);
        let store = MemoryUserStore::new();

        let account = store
            .create(NewAccount::new("alice", "alice@example.com"))
            .await
            .unwrap();
        let token = tokens.issue_token(&account).unwrap();

        let first = redeem_verification_token(&token, &tokens, &store)
            .await
            .unwrap();
        let second = redeem_verification_token(&token, &tokens, &store)
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_redeem_forged_token() {
        let settings = settings();
        let tokens = TokenService::new(&settings);
        let store = MemoryUserStore::new();

        let err = redeem_verification_token("alice:0:forged", &tokens, &store)
            .await
            .unwrap_err();
        assert!(err.is_crypto());
    }

    #[tokio::test]
    async fn test_redeem_unknown_account() {
        let settings = settings();
        let tokens = TokenService::new(&settings);
        let store = MemoryUserStore::new();

        // valid token for an account the store never saw
        let ghost = Account {
            id: 99,
            username: "ghost".to_string(),
            email: "ghost@example.com".to_string(),
            is_active: false,
            is_staff: false,
            is_superuser: false,
            date_joined: chrono::Utc::now(),
        };
        let token = tokens.issue_token(&ghost).unwrap();

        let err = redeem_verification_token(&token, &tokens, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthEnhancedError::DoesNotExist(_)));
    }
}
