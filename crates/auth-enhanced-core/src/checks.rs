//! System checks for app-specific settings.
//!
//! Diagnostics over an [`AuthSettings`] value, run at startup or from the
//! management command. There are two kinds of checks: that all app-specific
//! settings carry accepted values, and that the logical connections between
//! different settings are valid.
//!
//! Checks never block startup; callers decide what to do with the messages.
//!
//! ## Overview
//!
//! - [`CheckMessage`]: A diagnostic message (level, message, hint, id).
//! - [`CheckLevel`]: Severity level.
//! - [`CheckRegistry`]: Registry for check functions with tag-based filtering.
//! - [`check_settings_values`]: Runs the built-in settings checks.

use crate::settings::{
    AuthSettings, MODE_AUTO_ACTIVATION, MODE_EMAIL_ACTIVATION, MODE_MANUAL_ACTIVATION,
};

/// Severity level for a check message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckLevel {
    /// Debugging information.
    Debug = 0,
    /// Informational message.
    Info = 1,
    /// A potential problem.
    Warning = 2,
    /// A definite problem that should be fixed.
    Error = 3,
    /// A critical error that prevents the application from running.
    Critical = 4,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// A diagnostic message produced by a system check.
///
/// Each message has a severity level, a human-readable message, an optional
/// hint, the object the issue relates to, and a stable identifier
/// (e.g. `"dae.e002"`).
#[derive(Debug, Clone)]
pub struct CheckMessage {
    /// The severity level.
    pub level: CheckLevel,
    /// The human-readable message describing the issue.
    pub msg: String,
    /// An optional hint on how to fix the issue.
    pub hint: Option<String>,
    /// The object (setting, model, etc.) that has the issue.
    pub obj: Option<String>,
    /// A unique identifier for this check message.
    pub id: Option<String>,
}

impl CheckMessage {
    /// Creates a new `CheckMessage` with the given level and details.
    pub fn new(
        level: CheckLevel,
        msg: impl Into<String>,
        hint: Option<&str>,
        obj: Option<&str>,
        id: Option<&str>,
    ) -> Self {
        Self {
            level,
            msg: msg.into(),
            hint: hint.map(String::from),
            obj: obj.map(String::from),
            id: id.map(String::from),
        }
    }

    /// Creates a warning-level message.
    pub fn warning(
        msg: impl Into<String>,
        hint: Option<&str>,
        obj: Option<&str>,
        id: Option<&str>,
    ) -> Self {
        Self::new(CheckLevel::Warning, msg, hint, obj, id)
    }

    /// Creates an error-level message.
    pub fn error(
        msg: impl Into<String>,
        hint: Option<&str>,
        obj: Option<&str>,
        id: Option<&str>,
    ) -> Self {
        Self::new(CheckLevel::Error, msg, hint, obj, id)
    }

    /// Returns `true` if this is a warning or higher severity.
    pub fn is_serious(&self) -> bool {
        self.level >= CheckLevel::Warning
    }
}

impl std::fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref id) = self.id {
            write!(f, "({id}) ")?;
        }
        write!(f, "{}: {}", self.level, self.msg)?;
        if let Some(ref hint) = self.hint {
            write!(f, "\n\tHINT: {hint}")?;
        }
        if let Some(ref obj) = self.obj {
            write!(f, "\n\tObject: {obj}")?;
        }
        Ok(())
    }
}

/// A check function that receives settings and returns diagnostic messages.
pub type CheckFn = fn(&AuthSettings) -> Vec<CheckMessage>;

/// A registered check with associated tags.
struct RegisteredCheck {
    func: CheckFn,
    tags: Vec<String>,
}

/// Registry for system check functions.
///
/// Check functions can be registered with tags, and then run all at once
/// or filtered by tag.
pub struct CheckRegistry {
    checks: Vec<RegisteredCheck>,
}

impl CheckRegistry {
    /// Creates a new empty check registry.
    pub const fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Creates a new check registry pre-loaded with the app's built-in
    /// settings checks.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(check_settings_values, &["settings"]);
        registry
    }

    /// Registers a check function with the given tags.
    pub fn register(&mut self, func: CheckFn, tags: &[&str]) {
        self.checks.push(RegisteredCheck {
            func,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        });
    }

    /// Runs all registered checks (or only those matching the given tags)
    /// and collects all resulting messages.
    pub fn run_checks(&self, tags: Option<&[&str]>, settings: &AuthSettings) -> Vec<CheckMessage> {
        let mut messages = Vec::new();

        for check in &self.checks {
            let should_run = tags.map_or(true, |filter_tags| {
                filter_tags
                    .iter()
                    .any(|t| check.tags.contains(&(*t).to_string()))
            });

            if should_run {
                messages.extend((check.func)(settings));
            }
        }

        messages
    }

    /// Returns the number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns `true` if no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================
// Built-in checks
// ============================================================

/// Checks a raw (not yet parsed) operation-mode string.
///
/// The typed settings struct cannot hold an invalid mode, so this check
/// applies before parsing, against the raw configuration value.
pub fn check_operation_mode_raw(raw_mode: &str) -> Vec<CheckMessage> {
    if [
        MODE_AUTO_ACTIVATION,
        MODE_EMAIL_ACTIVATION,
        MODE_MANUAL_ACTIVATION,
    ]
    .contains(&raw_mode)
    {
        return Vec::new();
    }

    vec![CheckMessage::error(
        "'operation_mode' is set to an invalid value!",
        Some(&format!(
            "Please check your settings and ensure, that 'operation_mode' is \
             set to one of the following values: '{MODE_AUTO_ACTIVATION}', \
             '{MODE_EMAIL_ACTIVATION}' or '{MODE_MANUAL_ACTIVATION}'."
        )),
        Some("settings.operation_mode"),
        Some("dae.e001"),
    )]
}

/// Checks, if the app-specific settings have valid values.
pub fn check_settings_values(settings: &AuthSettings) -> Vec<CheckMessage> {
    let mut messages = Vec::new();

    if settings.email_template_prefix.ends_with('/') {
        messages.push(CheckMessage::error(
            "'email_template_prefix' must not have a trailing slash!",
            Some(
                "Please check your settings and ensure, that \
                 'email_template_prefix' does not end with a slash ('/').",
            ),
            Some("settings.email_template_prefix"),
            Some("dae.e002"),
        ));
    }

    for recipient in &settings.admin_signup_notification {
        if recipient.name.is_empty() || recipient.address.is_empty() || recipient.methods.is_empty()
        {
            messages.push(CheckMessage::error(
                "'admin_signup_notification' contains an incomplete entry!",
                Some(
                    "Every entry needs a username, an email address and at \
                     least one notification method.",
                ),
                Some("settings.admin_signup_notification"),
                Some("dae.e003"),
            ));
        }
    }

    if settings.email_from_address == "webmaster@localhost" {
        messages.push(CheckMessage::warning(
            "'email_from_address' is still set to the default value.",
            Some("Set a project-specific from-address for outbound mail."),
            Some("settings.email_from_address"),
            Some("dae.w001"),
        ));
    }

    if settings.secret_key.is_empty() {
        messages.push(CheckMessage::warning(
            "'secret_key' is empty. Verification tokens will not be secure.",
            Some("Set a strong, unique secret key in your settings."),
            Some("settings.secret_key"),
            Some("dae.w002"),
        ));
    }

    messages
}
