//! Settings for auth-enhanced.
//!
//! All app-specific configuration lives in one immutable [`AuthSettings`]
//! struct with sensible defaults. The struct is constructed once at process
//! startup (from defaults, a TOML file, or both) and passed by reference into
//! every component that needs it; there is no ambient global settings state.
//!
//! The [`OperationMode`] enum governs how newly registered accounts are
//! handled:
//!
//! - [`OperationMode::AutoActivation`] — new accounts are activated right away.
//! - [`OperationMode::EmailActivation`] — new accounts receive a verification
//!   mail and are activated once the address is verified.
//! - [`OperationMode::ManualActivation`] — new accounts stay inactive until a
//!   superuser activates them.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthEnhancedError;

/// Canonical string for [`OperationMode::AutoActivation`].
pub const MODE_AUTO_ACTIVATION: &str = "AUTO_ACTIVATION";

/// Canonical string for [`OperationMode::EmailActivation`].
pub const MODE_EMAIL_ACTIVATION: &str = "EMAIL_ACTIVATION";

/// Canonical string for [`OperationMode::ManualActivation`].
pub const MODE_MANUAL_ACTIVATION: &str = "MANUAL_ACTIVATION";

/// Determines how newly registered accounts are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OperationMode {
    /// Newly created accounts are activated automatically.
    #[default]
    #[serde(rename = "AUTO_ACTIVATION")]
    AutoActivation,
    /// Newly created accounts receive a verification mail and are activated
    /// when the email address is verified.
    #[serde(rename = "EMAIL_ACTIVATION")]
    EmailActivation,
    /// Newly created accounts are *not* activated; activation relies on a
    /// superuser.
    #[serde(rename = "MANUAL_ACTIVATION")]
    ManualActivation,
}

impl OperationMode {
    /// Returns the canonical string form of this mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AutoActivation => MODE_AUTO_ACTIVATION,
            Self::EmailActivation => MODE_EMAIL_ACTIVATION,
            Self::ManualActivation => MODE_MANUAL_ACTIVATION,
        }
    }
}

impl fmt::Display for OperationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = AuthEnhancedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            MODE_AUTO_ACTIVATION => Ok(Self::AutoActivation),
            MODE_EMAIL_ACTIVATION => Ok(Self::EmailActivation),
            MODE_MANUAL_ACTIVATION => Ok(Self::ManualActivation),
            other => Err(AuthEnhancedError::Configuration(format!(
                "'{other}' is not a valid operation mode. Accepted values: \
                 '{MODE_AUTO_ACTIVATION}', '{MODE_EMAIL_ACTIVATION}' or \
                 '{MODE_MANUAL_ACTIVATION}'."
            ))),
        }
    }
}

/// The channel over which an admin notification is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationMethod {
    /// Deliver the notification by email.
    #[serde(rename = "mail")]
    Mail,
}

/// One entry of the admin signup notification list.
///
/// The `name` must reference an existing account; the referenced account must
/// have a verified email address and superuser permissions. This is validated
/// by the `authenhanced admin-notification` management command, not at
/// construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecipient {
    /// Username of the account to notify.
    pub name: String,
    /// The email address notifications are sent to.
    pub address: String,
    /// The delivery channels to use for this recipient.
    pub methods: Vec<NotificationMethod>,
}

impl AdminRecipient {
    /// Creates a recipient that is notified by mail.
    pub fn mail(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            methods: vec![NotificationMethod::Mail],
        }
    }

    /// Returns `true` if this recipient wants to be notified by mail.
    pub fn wants_mail(&self) -> bool {
        self.methods.contains(&NotificationMethod::Mail)
    }
}

/// The complete set of app settings with their default values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    // ── Core ─────────────────────────────────────────────────────────
    /// Whether debug mode is enabled.
    pub debug: bool,
    /// The secret key used for cryptographic signing.
    pub secret_key: String,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Activation ───────────────────────────────────────────────────
    /// How newly registered accounts are handled.
    pub operation_mode: OperationMode,

    // ── Verification tokens ──────────────────────────────────────────
    /// The salt applied to the token signer. Changing it invalidates all
    /// outstanding tokens.
    pub token_salt: String,
    /// How long a verification token is considered valid, in seconds. This
    /// applies to all verification processes in the app.
    pub verification_token_max_age: u64,

    // ── Email ────────────────────────────────────────────────────────
    /// Prefix under which the email templates are looked up. Must not carry
    /// a trailing slash.
    pub email_template_prefix: String,
    /// The from-address for all outbound mail.
    pub email_from_address: String,
    /// Optional subject prefix for user-facing mail, rendered as `[prefix]`.
    pub email_subject_prefix: Option<String>,
    /// Optional subject prefix for admin notification mail.
    pub admin_notification_subject_prefix: Option<String>,
    /// Accounts to notify about new signups.
    pub admin_signup_notification: Vec<AdminRecipient>,

    // ── Escape hatch ─────────────────────────────────────────────────
    /// Custom settings that don't fit into the above categories. Keys are
    /// injected through [`AuthSettings::inject_setting`], which enforces the
    /// uppercase naming convention.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            debug: true,
            secret_key: String::new(),
            log_level: "info".to_string(),
            operation_mode: OperationMode::AutoActivation,
            token_salt: "auth-enhanced.token-signer".to_string(),
            verification_token_max_age: 86_400, // one day
            email_template_prefix: "auth_enhanced".to_string(),
            email_from_address: "webmaster@localhost".to_string(),
            email_subject_prefix: None,
            admin_notification_subject_prefix: None,
            admin_signup_notification: Vec::new(),
            extra: HashMap::new(),
        }
    }
}

impl AuthSettings {
    /// Injects a custom setting, keeping an already-present value.
    ///
    /// Only uppercase names are accepted; this keeps the custom settings
    /// namespace disciplined. If the key already exists, the existing value
    /// wins and the given default is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`AuthEnhancedError::Configuration`] for non-uppercase names.
    pub fn inject_setting(
        &mut self,
        name: &str,
        default_value: serde_json::Value,
    ) -> Result<(), AuthEnhancedError> {
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(AuthEnhancedError::Configuration(
                "Only uppercase names are allowed!".to_string(),
            ));
        }

        self.extra.entry(name.to_string()).or_insert(default_value);
        Ok(())
    }

    /// Returns the injected setting with the given name, if present.
    pub fn get_extra(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }
}

/// Converts a duration string into seconds.
///
/// Accepted forms: a plain integer (`"1338"`), hours (`"5h"`) or days
/// (`"2d"`).
///
/// # Errors
///
/// Returns [`AuthEnhancedError::Conversion`] for anything else.
pub fn convert_to_seconds(value: &str) -> Result<u64, AuthEnhancedError> {
    let conversion_failed = || {
        AuthEnhancedError::Conversion(
            "Could not convert the parameter to an integer value.".to_string(),
        )
    };

    let (number, factor) = match value.strip_suffix('h') {
        Some(rest) => (rest, 3600),
        None => match value.strip_suffix('d') {
            Some(rest) => (rest, 3600 * 24),
            None => (value, 1),
        },
    };

    let number: u64 = number.parse().map_err(|_| conversion_failed())?;
    Ok(number * factor)
}

/// Loads settings from a TOML string, merging over the defaults.
///
/// Any field not present in the TOML keeps its default value.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or carries invalid values (e.g.
/// an unrecognized operation mode).
pub fn from_toml_str(toml_str: &str) -> Result<AuthSettings, AuthEnhancedError> {
    // Two-step approach: parse the TOML into a serde_json::Value, then merge
    // it with the serialized defaults, so partial files work.
    let toml_value: toml::Value = toml::from_str(toml_str).map_err(|e| {
        AuthEnhancedError::Configuration(format!("Failed to parse TOML: {e}"))
    })?;

    let json_value = toml_to_json(toml_value);
    let default_json = serde_json::to_value(AuthSettings::default()).map_err(|e| {
        AuthEnhancedError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, json_value);
    serde_json::from_value(merged).map_err(|e| {
        AuthEnhancedError::Configuration(format!("Failed to deserialize settings: {e}"))
    })
}

/// Loads settings from a TOML file, merging over the defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<AuthSettings, AuthEnhancedError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        AuthEnhancedError::Configuration(format!(
            "Failed to read settings file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Converts a TOML value into the equivalent JSON value.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Recursively merges `overlay` onto `base`; overlay values win.
fn merge_json(base: serde_json::Value, overlay: serde_json::Value) -> serde_json::Value {
    match (base, overlay) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => merge_json(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}
