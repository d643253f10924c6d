//! Account records.
//!
//! The app works against a plain account record with fixed fields; there is
//! no dynamic field lookup. Additional verification state lives in the
//! [`Enhancement`](crate::enhancement::Enhancement) record, one per account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The store-assigned identifier.
    pub id: u64,
    /// The unique username.
    pub username: String,
    /// The email address. May be empty depending on the operation mode.
    pub email: String,
    /// Whether this account is active. Inactive accounts cannot log in.
    pub is_active: bool,
    /// Whether this account can access the admin interface.
    pub is_staff: bool,
    /// Whether this account has all permissions.
    pub is_superuser: bool,
    /// When this account was created.
    pub date_joined: DateTime<Utc>,
}

/// The input for creating a new account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAccount {
    /// The requested username.
    pub username: String,
    /// The email address. Required in email-activation mode.
    pub email: String,
    /// Whether the new account starts out active.
    pub is_active: bool,
    /// Whether the new account gets staff permissions.
    pub is_staff: bool,
    /// Whether the new account gets superuser permissions.
    pub is_superuser: bool,
}

impl NewAccount {
    /// Creates a new account request with the given username and email.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Marks the new account as a superuser (implies staff).
    #[must_use]
    pub fn superuser(mut self) -> Self {
        self.is_staff = true;
        self.is_superuser = true;
        self
    }

    /// Marks the new account as staff.
    #[must_use]
    pub fn staff(mut self) -> Self {
        self.is_staff = true;
        self
    }
}
