//! # auth-enhanced
//!
//! Account activation workflows on top of a pluggable user store:
//! operation modes, signed email verification tokens, admin bulk actions
//! and the `authenhanced` management command.
//!
//! This is the umbrella crate that re-exports all sub-crates for convenient
//! access. You can depend on `auth-enhanced` to get everything, or depend on
//! individual crates for finer-grained control.

/// Settings, error taxonomy, signing primitive and system checks.
pub use auth_enhanced_core as core;

/// Accounts, enhancement records, the store seam, activation, signup and
/// email dispatch.
#[cfg(feature = "accounts")]
pub use auth_enhanced_accounts as accounts;

/// Status classification, filtering and bulk activate/deactivate actions.
#[cfg(feature = "admin")]
pub use auth_enhanced_admin as admin;

/// The management command framework and the `authenhanced` command.
#[cfg(feature = "cli")]
pub use auth_enhanced_cli as cli;
