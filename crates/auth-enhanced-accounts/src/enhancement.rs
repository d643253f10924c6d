//! Per-account enhancement records.
//!
//! The app stores its additional verification state next to the account
//! instead of widening the account record itself. Exactly one [`Enhancement`]
//! exists per account; the store creates it at account-creation time and
//! deletes it together with the account.

use serde::{Deserialize, Serialize};

/// The email verification status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// The email address has been verified.
    #[serde(rename = "EMAIL_VERIFICATION_COMPLETED")]
    Completed,
    /// A verification mail has been sent and awaits redemption.
    #[serde(rename = "EMAIL_VERIFICATION_IN_PROGRESS")]
    InProgress,
    /// No successful verification has happened. This is the initial state.
    #[default]
    #[serde(rename = "EMAIL_VERIFICATION_FAILED")]
    Failed,
}

/// The app-specific state attached to one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enhancement {
    /// The id of the account this record belongs to.
    pub user_id: u64,
    /// The current email verification status.
    pub email_verification_status: VerificationStatus,
}

impl Enhancement {
    /// Creates the enhancement record for a freshly created account.
    pub const fn for_user(user_id: u64) -> Self {
        Self {
            user_id,
            email_verification_status: VerificationStatus::Failed,
        }
    }

    /// Returns `true` if the email address has been verified.
    pub fn email_is_verified(&self) -> bool {
        self.email_verification_status == VerificationStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_failed() {
        assert_eq!(VerificationStatus::default(), VerificationStatus::Failed);
        let enhancement = Enhancement::for_user(1);
        assert_eq!(
            enhancement.email_verification_status,
            VerificationStatus::Failed
        );
    }

    #[test]
    fn test_email_is_verified_only_when_completed() {
        let mut enhancement = Enhancement::for_user(1);
        assert!(!enhancement.email_is_verified());

        enhancement.email_verification_status = VerificationStatus::InProgress;
        assert!(!enhancement.email_is_verified());

        enhancement.email_verification_status = VerificationStatus::Completed;
        assert!(enhancement.email_is_verified());
    }

    #[test]
    fn test_status_serde_uses_canonical_strings() {
        let json = serde_json::to_string(&VerificationStatus::Completed).unwrap();
        assert_eq!(json, "\"EMAIL_VERIFICATION_COMPLETED\"");
        let parsed: VerificationStatus =
            serde_json::from_str("\"EMAIL_VERIFICATION_IN_PROGRESS\"").unwrap();
        assert_eq!(parsed, VerificationStatus::InProgress);
    }
}
