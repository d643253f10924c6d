//! # auth-enhanced-core
//!
//! Settings resolver, error taxonomy, signing primitive and system checks
//! for the auth-enhanced workspace. This crate carries no account or storage
//! logic and provides the foundation for all other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - App settings, operation modes and the TOML loader
//! - [`signing`] - HMAC-SHA256 signing with embedded timestamps
//! - [`checks`] - System checks over the settings
//! - [`logging`] - Tracing-based logging integration

pub mod checks;
pub mod error;
pub mod logging;
pub mod settings;
pub mod signing;

// Re-export the most commonly used types at the crate root.
pub use error::{AuthEnhancedError, AuthEnhancedResult, ValidationError};
pub use settings::{AdminRecipient, AuthSettings, NotificationMethod, OperationMode};
