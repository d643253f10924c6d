//! Bulk activate/deactivate actions.
//!
//! The actions work on sets of account ids and report their outcome as
//! user-facing messages with correct singular/plural forms. Single-account
//! buttons funnel into the same bulk methods with a one-element set, so
//! there is only one code path.

use std::sync::Arc;

use auth_enhanced_core::error::AuthEnhancedResult;
use auth_enhanced_core::settings::{AuthSettings, OperationMode};

use auth_enhanced_accounts::store::UserStore;

/// Why an account was skipped by a bulk action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Activation refused: the email address is not verified (only enforced
    /// in email-activation mode).
    EmailNotVerified,
    /// Deactivation refused: the account belongs to the requester.
    OwnAccount,
}

/// Which bulk action produced an outcome. Decides the report wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// The bulk activate action.
    Activate,
    /// The bulk deactivate action.
    Deactivate,
}

/// The level of a report message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// The accounts named in the message were processed.
    Success,
    /// The accounts named in the message were skipped, or nothing happened.
    Error,
}

/// One user-facing report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMessage {
    /// The message level.
    pub level: MessageLevel,
    /// The message text.
    pub text: String,
}

/// The outcome of a bulk action.
#[derive(Debug, Clone, Default)]
pub struct BulkOutcome {
    /// Usernames of the accounts that were processed, in input order.
    pub done: Vec<String>,
    /// Usernames of the accounts that were skipped, with the reason.
    pub rejected: Vec<(String, RejectReason)>,
}

impl BulkOutcome {
    /// Returns `true` if the action touched nothing at all. An action where
    /// every account was rejected is *not* "nothing done"; this is reserved
    /// for empty or entirely invalid id sets.
    pub fn nothing_done(&self) -> bool {
        self.done.is_empty() && self.rejected.is_empty()
    }

    /// Renders the report lines for this outcome.
    pub fn messages(&self, kind: ActionKind) -> Vec<ActionMessage> {
        let mut messages = Vec::new();

        if !self.done.is_empty() {
            let count = self.done.len();
            let list = self.done.join(", ");
            let text = match kind {
                ActionKind::Activate if count == 1 => {
                    format!("{count} user was activated successfully ({list}).")
                }
                ActionKind::Activate => {
                    format!("{count} users were activated successfully ({list}).")
                }
                ActionKind::Deactivate if count == 1 => {
                    format!("{count} user was deactivated successfully ({list}).")
                }
                ActionKind::Deactivate => {
                    format!("{count} users were deactivated successfully ({list}).")
                }
            };
            messages.push(ActionMessage {
                level: MessageLevel::Success,
                text,
            });
        }

        if !self.rejected.is_empty() {
            let count = self.rejected.len();
            let list = self
                .rejected
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let text = match kind {
                ActionKind::Activate if count == 1 => format!(
                    "{count} user could not be activated, because his email \
                     address is not verified ({list})!"
                ),
                ActionKind::Activate => format!(
                    "{count} users could not be activated, because their \
                     email addresses are not verified ({list})!"
                ),
                ActionKind::Deactivate if count == 1 => format!(
                    "{count} user could not be deactivated, because this is \
                     your own account ({list})!"
                ),
                ActionKind::Deactivate => {
                    format!("{count} users could not be deactivated ({list})!")
                }
            };
            messages.push(ActionMessage {
                level: MessageLevel::Error,
                text,
            });
        }

        if self.nothing_done() {
            messages.push(ActionMessage {
                level: MessageLevel::Error,
                text: "Nothing was done. Probably this means, that no or \
                       invalid user IDs were provided."
                    .to_string(),
            });
        }

        messages
    }
}

/// The bulk activate/deactivate action layer.
pub struct AccountActions {
    settings: AuthSettings,
    store: Arc<dyn UserStore>,
}

impl AccountActions {
    /// Creates the action layer over the given store.
    pub fn new(settings: AuthSettings, store: Arc<dyn UserStore>) -> Self {
        Self { settings, store }
    }

    /// Activates the given accounts.
    ///
    /// In email-activation mode, accounts whose email address is not
    /// verified are skipped with
    /// [`RejectReason::EmailNotVerified`]. Ids that match no account
    /// contribute nothing to the outcome.
    pub async fn bulk_activate(&self, ids: &[u64]) -> AuthEnhancedResult<BulkOutcome> {
        let mut outcome = BulkOutcome::default();

        for &id in ids {
            let Some(account) = self.store.get(id).await? else {
                continue;
            };

            if self.settings.operation_mode == OperationMode::EmailActivation {
                let verified = self
                    .store
                    .enhancement_of(id)
                    .await?
                    .is_some_and(|e| e.email_is_verified());
                if !verified {
                    outcome
                        .rejected
                        .push((account.username, RejectReason::EmailNotVerified));
                    continue;
                }
            }

            self.store.set_active(id, true).await?;
            outcome.done.push(account.username);
        }

        tracing::debug!(
            done = outcome.done.len(),
            rejected = outcome.rejected.len(),
            "bulk activate finished"
        );
        Ok(outcome)
    }

    /// Deactivates the given accounts.
    ///
    /// The requester's own account is skipped with
    /// [`RejectReason::OwnAccount`]. Ids that match no account contribute
    /// nothing to the outcome.
    pub async fn bulk_deactivate(
        &self,
        ids: &[u64],
        requester_id: u64,
    ) -> AuthEnhancedResult<BulkOutcome> {
        let mut outcome = BulkOutcome::default();

        for &id in ids {
            let Some(account) = self.store.get(id).await? else {
                continue;
            };

            if id == requester_id {
                outcome
                    .rejected
                    .push((account.username, RejectReason::OwnAccount));
                continue;
            }

            self.store.set_active(id, false).await?;
            outcome.done.push(account.username);
        }

        tracing::debug!(
            done = outcome.done.len(),
            rejected = outcome.rejected.len(),
            "bulk deactivate finished"
        );
        Ok(outcome)
    }

    /// Activates a single account via the bulk code path.
    pub async fn activate_one(&self, id: u64) -> AuthEnhancedResult<BulkOutcome> {
        self.bulk_activate(&[id]).await
    }

    /// Deactivates a single account via the bulk code path.
    pub async fn deactivate_one(&self, id: u64, requester_id: u64) -> AuthEnhancedResult<BulkOutcome> {
        self.bulk_deactivate(&[id], requester_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_enhanced_accounts::enhancement::VerificationStatus;
    use auth_enhanced_accounts::store::MemoryUserStore;
    use auth_enhanced_accounts::user::NewAccount;

    fn settings(mode: OperationMode) -> AuthSettings {
        AuthSettings {
            secret_key: "only-for-testing".to_string(),
            operation_mode: mode,
            ..AuthSettings::default()
        }
    }

    async fn seeded_store() -> Arc<MemoryUserStore> {
        let store = Arc::new(MemoryUserStore::new());
        for name in ["alice", "bob", "carol"] {
            store
                .create(NewAccount::new(name, format!("{name}@example.com")))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_activate_in_manual_mode_ignores_verification() {
        let store = seeded_store().await;
        let actions = AccountActions::new(settings(OperationMode::ManualActivation), store.clone());

        let outcome = actions.bulk_activate(&[1, 2]).await.unwrap();
        assert_eq!(outcome.done, vec!["alice", "bob"]);
        assert!(outcome.rejected.is_empty());
        assert!(store.get(1).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_activate_in_email_mode_rejects_unverified() {
        let store = seeded_store().await;
        store
            .set_verification_status(1, VerificationStatus::Completed)
            .await
            .unwrap();
        let actions = AccountActions::new(settings(OperationMode::EmailActivation), store.clone());

        let outcome = actions.bulk_activate(&[1, 2]).await.unwrap();
        assert_eq!(outcome.done, vec!["alice"]);
        assert_eq!(
            outcome.rejected,
            vec![("bob".to_string(), RejectReason::EmailNotVerified)]
        );
        assert!(store.get(1).await.unwrap().unwrap().is_active);
        assert!(!store.get(2).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_invalid_ids_contribute_nothing() {
        let store = seeded_store().await;
        let actions = AccountActions::new(settings(OperationMode::ManualActivation), store);

        let outcome = actions.bulk_activate(&[98, 99]).await.unwrap();
        assert!(outcome.nothing_done());

        let messages = outcome.messages(ActionKind::Activate);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].level, MessageLevel::Error);
        assert_eq!(
            messages[0].text,
            "Nothing was done. Probably this means, that no or invalid user \
             IDs were provided."
        );
    }

    #[tokio::test]
    async fn test_deactivate_skips_own_account() {
        let store = seeded_store().await;
        for id in 1..=3 {
            store.set_active(id, true).await.unwrap();
        }
        let actions = AccountActions::new(settings(OperationMode::AutoActivation), store.clone());

        let outcome = actions.bulk_deactivate(&[1, 2, 3], 2).await.unwrap();
        assert_eq!(outcome.done, vec!["alice", "carol"]);
        assert_eq!(
            outcome.rejected,
            vec![("bob".to_string(), RejectReason::OwnAccount)]
        );
        assert!(store.get(2).await.unwrap().unwrap().is_active);
        assert!(!store.get(1).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn test_all_rejected_is_not_nothing_done() {
        let store = seeded_store().await;
        let actions = AccountActions::new(settings(OperationMode::AutoActivation), store);

        let outcome = actions.bulk_deactivate(&[1], 1).await.unwrap();
        assert!(!outcome.nothing_done());
        assert!(outcome.done.is_empty());
    }

    #[tokio::test]
    async fn test_single_account_actions_funnel_into_bulk() {
        let store = seeded_store().await;
        let actions = AccountActions::new(settings(OperationMode::ManualActivation), store.clone());

        let outcome = actions.activate_one(1).await.unwrap();
        assert_eq!(outcome.done, vec!["alice"]);

        let outcome = actions.deactivate_one(1, 99).await.unwrap();
        assert_eq!(outcome.done, vec!["alice"]);
        assert!(!store.get(1).await.unwrap().unwrap().is_active);
    }

    // ── report wording ──────────────────────────────────────────────

    #[test]
    fn test_activate_messages_singular() {
        let outcome = BulkOutcome {
            done: vec!["alice".to_string()],
            rejected: vec![("bob".to_string(), RejectReason::EmailNotVerified)],
        };
        let messages = outcome.messages(ActionKind::Activate);
        assert_eq!(
            messages[0].text,
            "1 user was activated successfully (alice)."
        );
        assert_eq!(
            messages[1].text,
            "1 user could not be activated, because his email address is not \
             verified (bob)!"
        );
    }

    #[test]
    fn test_activate_messages_plural() {
        let outcome = BulkOutcome {
            done: vec!["alice".to_string(), "bob".to_string()],
            rejected: vec![
                ("carol".to_string(), RejectReason::EmailNotVerified),
                ("dave".to_string(), RejectReason::EmailNotVerified),
            ],
        };
        let messages = outcome.messages(ActionKind::Activate);
        assert_eq!(
            messages[0].text,
            "2 users were activated successfully (alice, bob)."
        );
        assert_eq!(
            messages[1].text,
            "2 users could not be activated, because their email addresses \
             are not verified (carol, dave)!"
        );
    }

    #[test]
    fn test_deactivate_messages() {
        let outcome = BulkOutcome {
            done: vec!["alice".to_string()],
            rejected: vec![("bob".to_string(), RejectReason::OwnAccount)],
        };
        let messages = outcome.messages(ActionKind::Deactivate);
        assert_eq!(
            messages[0].text,
            "1 user was deactivated successfully (alice)."
        );
        assert_eq!(
            messages[1].text,
            "1 user could not be deactivated, because this is your own \
             account (bob)!"
        );

        let plural = BulkOutcome {
            done: Vec::new(),
            rejected: vec![
                ("alice".to_string(), RejectReason::OwnAccount),
                ("bob".to_string(), RejectReason::OwnAccount),
            ],
        };
        let messages = plural.messages(ActionKind::Deactivate);
        assert_eq!(
            messages[0].text,
            "2 users could not be deactivated (alice, bob)!"
        );
    }

    #[test]
    fn test_message_levels() {
        let outcome = BulkOutcome {
            done: vec!["alice".to_string()],
            rejected: vec![("bob".to_string(), RejectReason::OwnAccount)],
        };
        let messages = outcome.messages(ActionKind::Deactivate);
        assert_eq!(messages[0].level, MessageLevel::Success);
        assert_eq!(messages[1].level, MessageLevel::Error);
    }
}
