//! The storage seam.
//!
//! All persistence goes through the [`UserStore`] trait so the activation
//! logic, the admin actions and the management commands stay agnostic of the
//! actual backing store. [`MemoryUserStore`] is the built-in implementation,
//! used in tests and small deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use auth_enhanced_core::error::{AuthEnhancedError, AuthEnhancedResult};

use crate::enhancement::{Enhancement, VerificationStatus};
use crate::user::{Account, NewAccount};

/// Async storage interface for accounts and their enhancement records.
///
/// Lookups return `Option` rather than treating a missing record as an
/// error; errors are reserved for storage failures and for mutations that
/// reference an id that does not exist.
///
/// Invariant: exactly one [`Enhancement`] exists per account. The store
/// creates it in [`create`](UserStore::create) and deletes it together with
/// the account.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates a new account, assigns its id and creates the matching
    /// enhancement record (initial status: failed).
    async fn create(&self, new_account: NewAccount) -> AuthEnhancedResult<Account>;

    /// Returns the account with the given id.
    async fn get(&self, id: u64) -> AuthEnhancedResult<Option<Account>>;

    /// Returns the account with the given username.
    async fn get_by_username(&self, username: &str) -> AuthEnhancedResult<Option<Account>>;

    /// Returns the first account with the given email address. Matching is
    /// case-insensitive.
    async fn find_by_email(&self, email: &str) -> AuthEnhancedResult<Option<Account>>;

    /// Returns all accounts, ordered by id.
    async fn all(&self) -> AuthEnhancedResult<Vec<Account>>;

    /// Returns the enhancement record of the given account.
    async fn enhancement_of(&self, user_id: u64) -> AuthEnhancedResult<Option<Enhancement>>;

    /// Sets the active flag of the given account.
    async fn set_active(&self, id: u64, is_active: bool) -> AuthEnhancedResult<()>;

    /// Sets the email verification status of the given account.
    async fn set_verification_status(
        &self,
        id: u64,
        status: VerificationStatus,
    ) -> AuthEnhancedResult<()>;

    /// Marks the email address verified *and* activates the account as one
    /// storage operation. Redeeming a token twice converges to the same end
    /// state.
    async fn mark_verified_and_activate(&self, id: u64) -> AuthEnhancedResult<Account>;

    /// Deletes the account and its enhancement record.
    async fn delete(&self, id: u64) -> AuthEnhancedResult<()>;
}

/// Internal record of the in-memory store.
#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    enhancement: Enhancement,
}

/// State behind the lock.
#[derive(Debug, Default)]
struct MemoryState {
    accounts: HashMap<u64, StoredAccount>,
    next_id: u64,
}

/// An in-memory [`UserStore`] backed by a `tokio` `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    state: RwLock<MemoryState>,
}

impl MemoryUserStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn missing(id: u64) -> AuthEnhancedError {
    AuthEnhancedError::DoesNotExist(format!("no account with id {id}"))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_account: NewAccount) -> AuthEnhancedResult<Account> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;

        let account = Account {
            id,
            username: new_account.username,
            email: new_account.email,
            is_active: new_account.is_active,
            is_staff: new_account.is_staff,
            is_superuser: new_account.is_superuser,
            date_joined: chrono::Utc::now(),
        };

        state.accounts.insert(
            id,
            StoredAccount {
                account: account.clone(),
                enhancement: Enhancement::for_user(id),
            },
        );

        tracing::debug!(id, username = %account.username, "account created");
        Ok(account)
    }

    async fn get(&self, id: u64) -> AuthEnhancedResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&id).map(|s| s.account.clone()))
    }

    async fn get_by_username(&self, username: &str) -> AuthEnhancedResult<Option<Account>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|s| s.account.username == username)
            .map(|s| s.account.clone()))
    }

    async fn find_by_email(&self, email: &str) -> AuthEnhancedResult<Option<Account>> {
        let state = self.state.read().await;
        let needle = email.to_lowercase();
        let mut matches: Vec<&StoredAccount> = state
            .accounts
            .values()
            .filter(|s| s.account.email.to_lowercase() == needle)
            .collect();
        matches.sort_by_key(|s| s.account.id);
        Ok(matches.first().map(|s| s.account.clone()))
    }

    async fn all(&self) -> AuthEnhancedResult<Vec<Account>> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> =
            state.accounts.values().map(|s| s.account.clone()).collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    async fn enhancement_of(&self, user_id: u64) -> AuthEnhancedResult<Option<Enhancement>> {
        let state = self.state.read().await;
        Ok(state.accounts.get(&user_id).map(|s| s.enhancement.clone()))
    }

    async fn set_active(&self, id: u64, is_active: bool) -> AuthEnhancedResult<()> {
        let mut state = self.state.write().await;
        let stored = state.accounts.get_mut(&id).ok_or_else(|| missing(id))?;
        stored.account.is_active = is_active;
        Ok(())
    }

    async fn set_verification_status(
        &self,
        id: u64,
        status: VerificationStatus,
    ) -> AuthEnhancedResult<()> {
        let mut state = self.state.write().await;
        let stored = state.accounts.get_mut(&id).ok_or_else(|| missing(id))?;
        stored.enhancement.email_verification_status = status;
        Ok(())
    }

    async fn mark_verified_and_activate(&self, id: u64) -> AuthEnhancedResult<Account> {
        let mut state = self.state.write().await;
        let stored = state.accounts.get_mut(&id).ok_or_else(|| missing(id))?;
        stored.enhancement.email_verification_status = VerificationStatus::Completed;
        stored.account.is_active = true;
        tracing::info!(id, username = %stored.account.username, "email verified, account activated");
        Ok(stored.account.clone())
    }

    async fn delete(&self, id: u64) -> AuthEnhancedResult<()> {
        let mut state = self.state.write().await;
        state.accounts.remove(&id).ok_or_else(|| missing(id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_assigns_ids_and_enhancement() {
        let store = MemoryUserStore::new();
        let a = store
            .create(NewAccount::new("alice", "alice@example.com"))
            .await
            .unwrap();
        let b = store
            .create(NewAccount::new("bob", "bob@example.com"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);

        let enhancement = store.enhancement_of(a.id).await.unwrap().unwrap();
        assert_eq!(
            enhancement.email_verification_status,
            VerificationStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_lookups_return_none_for_unknown() {
        let store = MemoryUserStore::new();
        assert!(store.get(42).await.unwrap().is_none());
        assert!(store.get_by_username("nobody").await.unwrap().is_none());
        assert!(store
            .find_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
        assert!(store.enhancement_of(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let store = MemoryUserStore::new();
        store
            .create(NewAccount::new("alice", "Alice@Example.COM"))
            .await
            .unwrap();

        let found = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_set_active() {
        let store = MemoryUserStore::new();
        let account = store
            .create(NewAccount::new("alice", "alice@example.com"))
            .await
            .unwrap();
        assert!(!account.is_active);

        store.set_active(account.id, true).await.unwrap();
        assert!(store.get(account.id).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_mutations_on_unknown_id_fail() {
        let store = MemoryUserStore::new();
        assert!(store.set_active(42, true).await.is_err());
        assert!(store
            .set_verification_status(42, VerificationStatus::Completed)
            .await
            .is_err());
        assert!(store.mark_verified_and_activate(42).await.is_err());
        assert!(store.delete(42).await.is_err());
    }

    #[tokio::test]
    async fn test_mark_verified_and_activate_is_atomic_and_idempotent() {
        let store = MemoryUserStore::new();
        let account = store
            .create(NewAccount::new("alice", "alice@example.com"))
            .await
            .unwrap();

        let first = store.mark_verified_and_activate(account.id).await.unwrap();
        assert!(first.is_active);
        let enhancement = store.enhancement_of(account.id).await.unwrap().unwrap();
        assert!(enhancement.email_is_verified());

        // a second redemption converges to the same end state
        let second = store.mark_verified_and_activate(account.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_enhancement() {
        let store = MemoryUserStore::new();
        let account = store
            .create(NewAccount::new("alice", "alice@example.com"))
            .await
            .unwrap();

        store.delete(account.id).await.unwrap();
        assert!(store.get(account.id).await.unwrap().is_none());
        assert!(store.enhancement_of(account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_all_is_ordered_by_id() {
        let store = MemoryUserStore::new();
        for name in ["c", "a", "b"] {
            store
                .create(NewAccount::new(name, format!("{name}@example.com")))
                .await
                .unwrap();
        }
        let all = store.all().await.unwrap();
        let ids: Vec<u64> = all.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
