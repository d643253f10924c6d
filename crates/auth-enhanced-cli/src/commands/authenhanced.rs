//! The `authenhanced` management command.
//!
//! Used to control and check certain bits of the app's setup. Three
//! subjects exist: `unique-email` verifies that all stored email addresses
//! are unique, `admin-notification` verifies that the configured
//! notification recipients are usable, and `full` runs both.

use std::collections::HashMap;

use async_trait::async_trait;

use auth_enhanced_core::error::{AuthEnhancedError, AuthEnhancedResult};
use auth_enhanced_core::settings::AuthSettings;

use auth_enhanced_accounts::store::UserStore;

use crate::command::ManagementCommand;

/// Checks that all stored email addresses are unique.
///
/// Matching is case-insensitive.
///
/// # Errors
///
/// Returns a [`Command`](AuthEnhancedError::Command) error listing the
/// usernames of all accounts whose email addresses collide.
pub async fn check_email_uniqueness(store: &dyn UserStore) -> AuthEnhancedResult<()> {
    let accounts = store.all().await?;

    let mut by_email: HashMap<String, Vec<&str>> = HashMap::new();
    for account in &accounts {
        by_email
            .entry(account.email.to_lowercase())
            .or_default()
            .push(&account.username);
    }

    // keep input (id) order in the report
    let mut colliding: Vec<&str> = accounts
        .iter()
        .filter(|a| by_email.get(&a.email.to_lowercase()).is_some_and(|v| v.len() > 1))
        .map(|a| a.username.as_str())
        .collect();

    if !colliding.is_empty() {
        colliding.dedup();
        return Err(AuthEnhancedError::Command(format!(
            "The following accounts don't have unique email addresses: {}",
            colliding.join(", ")
        )));
    }

    Ok(())
}

/// Checks that the configured admin notification recipients are usable:
/// every listed name must reference an existing account with a verified
/// email address, and that account must be a superuser.
///
/// # Errors
///
/// Returns a [`Command`](AuthEnhancedError::Command) error listing the
/// offending usernames. Missing accounts count as unverified.
pub async fn check_admin_notification(
    settings: &AuthSettings,
    store: &dyn UserStore,
) -> AuthEnhancedResult<()> {
    let mut unverified = Vec::new();
    let mut verified_accounts = Vec::new();

    for recipient in &settings.admin_signup_notification {
        let account = store.get_by_username(&recipient.name).await?;
        let verified = match &account {
            Some(account) => store
                .enhancement_of(account.id)
                .await?
                .is_some_and(|e| e.email_is_verified()),
            None => false,
        };

        if verified {
            if let Some(account) = account {
                verified_accounts.push(account);
            }
        } else {
            unverified.push(recipient.name.as_str());
        }
    }

    if !unverified.is_empty() {
        return Err(AuthEnhancedError::Command(format!(
            "The following accounts do not have a verified email address: {}. \
             Administrative notifications will only be sent to verified email \
             addresses.",
            unverified.join(", ")
        )));
    }

    // only superusers may actually modify accounts
    let unauthorised: Vec<&str> = verified_accounts
        .iter()
        .filter(|a| !a.is_superuser)
        .map(|a| a.username.as_str())
        .collect();

    if !unauthorised.is_empty() {
        return Err(AuthEnhancedError::Command(format!(
            "The following accounts do not have the sufficient permissions \
             to actually modify accounts: {}.",
            unauthorised.join(", ")
        )));
    }

    Ok(())
}

/// Runs the given subject(s) and returns the success lines to print.
///
/// `cmd` must be one of `unique-email`, `admin-notification` or `full`.
///
/// # Errors
///
/// An unrecognized `cmd` yields "No valid command was provided!"; check
/// failures propagate as [`Command`](AuthEnhancedError::Command) errors.
pub async fn run_authenhanced(
    cmd: &str,
    settings: &AuthSettings,
    store: &dyn UserStore,
) -> AuthEnhancedResult<Vec<String>> {
    if !matches!(cmd, "unique-email" | "admin-notification" | "full") {
        return Err(AuthEnhancedError::Command(
            "No valid command was provided!".to_string(),
        ));
    }

    let mut output = Vec::new();

    if matches!(cmd, "unique-email" | "full") {
        check_email_uniqueness(store).await?;
        output.push("[ok] All email addresses are unique!".to_string());
    }

    if matches!(cmd, "admin-notification" | "full") {
        check_admin_notification(settings, store).await?;
        output.push("[ok] Notification settings are valid!".to_string());
    }

    Ok(output)
}

/// Provides the command `authenhanced`.
pub struct AuthEnhancedCommand;

#[async_trait]
impl ManagementCommand for AuthEnhancedCommand {
    fn name(&self) -> &'static str {
        "authenhanced"
    }

    fn help(&self) -> &'static str {
        "App-specific management command, used to control and check the \
         app's setup"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("cmd")
                .required(true)
                .help(
                    "The actual command to perform (accepted values: \
                     'admin-notification', 'unique-email', and 'full')",
                ),
        )
    }

    async fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &AuthSettings,
        store: &dyn UserStore,
    ) -> AuthEnhancedResult<()> {
        let cmd = matches
            .get_one::<String>("cmd")
            .map(String::as_str)
            .unwrap_or_default();

        for line in run_authenhanced(cmd, settings, store).await? {
            println!("{line}");
        }

        Ok(())
    }
}
