//! # auth-enhanced-cli
//!
//! The management command framework and the built-in `authenhanced`
//! command.
//!
//! ## Modules
//!
//! - [`command`] - The `ManagementCommand` trait and `CommandRegistry`
//! - [`commands`] - Built-in commands

pub mod command;
pub mod commands;

// Re-export the most commonly used types at the crate root.
pub use command::{CommandRegistry, ManagementCommand};
pub use commands::{check_admin_notification, check_email_uniqueness, run_authenhanced, AuthEnhancedCommand};
