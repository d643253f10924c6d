//! Status classification and list filtering for the admin layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use auth_enhanced_accounts::user::Account;

/// The aggregated status of an account.
///
/// Superuser takes precedence over staff; everything else is a plain user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    /// The account has all permissions.
    Superuser,
    /// The account can access the admin interface.
    Staff,
    /// A regular account.
    User,
}

impl UserStatus {
    /// Classifies an account by its permission flags.
    pub const fn classify(account: &Account) -> Self {
        if account.is_superuser {
            Self::Superuser
        } else if account.is_staff {
            Self::Staff
        } else {
            Self::User
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superuser => write!(f, "superuser"),
            Self::Staff => write!(f, "staff"),
            Self::User => write!(f, "user"),
        }
    }
}

/// A list filter over the aggregated status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// No filtering.
    #[default]
    All,
    /// Only regular users (neither staff nor superuser).
    Users,
    /// Only staff accounts (superusers included, they are staff too).
    Staff,
    /// Only superusers.
    Superusers,
}

impl StatusFilter {
    /// Applies the filter to a list of accounts.
    pub fn apply(self, accounts: &[Account]) -> Vec<Account> {
        accounts
            .iter()
            .filter(|a| match self {
                Self::All => true,
                Self::Users => !a.is_staff && !a.is_superuser,
                Self::Staff => a.is_staff,
                Self::Superusers => a.is_superuser,
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth_enhanced_accounts::user::NewAccount;

    fn account(id: u64, new: NewAccount) -> Account {
        Account {
            id,
            username: new.username,
            email: new.email,
            is_active: true,
            is_staff: new.is_staff,
            is_superuser: new.is_superuser,
            date_joined: chrono::Utc::now(),
        }
    }

    fn sample() -> Vec<Account> {
        vec![
            account(1, NewAccount::new("alice", "alice@example.com")),
            account(2, NewAccount::new("staffer", "staffer@example.com").staff()),
            account(3, NewAccount::new("root", "root@example.com").superuser()),
        ]
    }

    #[test]
    fn test_classify_superuser_wins_over_staff() {
        let accounts = sample();
        assert_eq!(UserStatus::classify(&accounts[0]), UserStatus::User);
        assert_eq!(UserStatus::classify(&accounts[1]), UserStatus::Staff);
        assert_eq!(UserStatus::classify(&accounts[2]), UserStatus::Superuser);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(UserStatus::Superuser.to_string(), "superuser");
        assert_eq!(UserStatus::Staff.to_string(), "staff");
        assert_eq!(UserStatus::User.to_string(), "user");
    }

    #[test]
    fn test_filter_users_excludes_staff_and_superusers() {
        let filtered = StatusFilter::Users.apply(&sample());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].username, "alice");
    }

    #[test]
    fn test_filter_staff_includes_superusers() {
        let filtered = StatusFilter::Staff.apply(&sample());
        let names: Vec<&str> = filtered.iter().map(|a| a.username.as_str()).collect();
        assert_eq!(names, vec!["staffer", "root"]);
    }

    #[test]
    fn test_filter_superusers() {
        let filtered = StatusFilter::Superusers.apply(&sample());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].username, "root");
    }

    #[test]
    fn test_filter_all() {
        assert_eq!(StatusFilter::All.apply(&sample()).len(), 3);
    }
}
