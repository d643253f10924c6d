//! Built-in management commands.

mod authenhanced;

pub use authenhanced::{
    check_admin_notification, check_email_uniqueness, run_authenhanced, AuthEnhancedCommand,
};
