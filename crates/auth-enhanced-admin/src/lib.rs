//! # auth-enhanced-admin
//!
//! The admin-facing layer: aggregated status classification, list filtering
//! and the bulk activate/deactivate actions with their user-facing reports.
//!
//! ## Modules
//!
//! - [`filters`] - `UserStatus` classification and `StatusFilter`
//! - [`actions`] - `AccountActions` and the `BulkOutcome` reports

pub mod actions;
pub mod filters;

// Re-export the most commonly used types at the crate root.
pub use actions::{
    AccountActions, ActionKind, ActionMessage, BulkOutcome, MessageLevel, RejectReason,
};
pub use filters::{StatusFilter, UserStatus};
