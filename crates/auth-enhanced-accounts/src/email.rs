//! Email handling: messages, backends, templates and the signup
//! notification dispatcher.
//!
//! Outbound mail goes through the [`EmailBackend`] trait. [`ConsoleBackend`]
//! prints messages to stdout for development; [`InMemoryBackend`] collects
//! them for inspection in tests. Real transports (SMTP and friends) live
//! behind the same trait and are out of scope here.
//!
//! Bodies are rendered from templates: `{prefix}/{name}.txt` is required and
//! its absence is a fatal configuration error, `{prefix}/{name}.html` is
//! optional and silently skipped when missing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use auth_enhanced_core::error::{AuthEnhancedError, AuthEnhancedResult};
use auth_enhanced_core::settings::{AuthSettings, OperationMode};

use crate::crypto::TokenService;
use crate::user::Account;

/// An email message.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// The email subject line.
    pub subject: String,
    /// The plain text body.
    pub body: String,
    /// The sender's email address.
    pub from_email: String,
    /// The recipients.
    pub to: Vec<String>,
    /// Optional HTML alternative. When set, the mail is sent as multipart.
    pub html_body: Option<String>,
}

impl EmailMessage {
    /// Creates a new email message with the minimum required fields.
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        from_email: impl Into<String>,
        to: Vec<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            from_email: from_email.into(),
            to,
            html_body: None,
        }
    }

    /// Sets the HTML alternative for this message.
    #[must_use]
    pub fn with_html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    /// Formats the message as a human-readable string.
    pub fn format_message(&self) -> String {
        use std::fmt::Write;
        let mut output = String::new();
        let _ = writeln!(output, "From: {}", self.from_email);
        let _ = writeln!(output, "To: {}", self.to.join(", "));
        let _ = writeln!(output, "Subject: {}", self.subject);
        let _ = writeln!(output, "\n{}", self.body);
        if let Some(html) = &self.html_body {
            let _ = writeln!(output, "\n--- HTML ---\n{html}");
        }
        output
    }
}

/// A backend for sending email messages.
///
/// All methods are async and the trait requires `Send + Sync` so messages
/// can be sent from multiple tokio tasks.
#[async_trait]
pub trait EmailBackend: Send + Sync {
    /// Sends a single email message.
    async fn send(&self, message: &EmailMessage) -> AuthEnhancedResult<()>;

    /// Sends multiple email messages, returning the count of successfully
    /// sent.
    async fn send_many(&self, messages: &[EmailMessage]) -> AuthEnhancedResult<usize> {
        let mut count = 0;
        for message in messages {
            if self.send(message).await.is_ok() {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// An email backend that prints messages to stdout. For development.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleBackend;

#[async_trait]
impl EmailBackend for ConsoleBackend {
    async fn send(&self, message: &EmailMessage) -> AuthEnhancedResult<()> {
        let separator = "-".repeat(60);
        let formatted = message.format_message();

        // stdout I/O off the async runtime
        tokio::task::spawn_blocking(move || {
            println!("{separator}");
            print!("{formatted}");
            println!("{separator}");
        })
        .await
        .map_err(|e| AuthEnhancedError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// An email backend that collects messages in memory.
///
/// All sent messages are stored in a thread-safe vector that can be
/// inspected in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    messages: Arc<RwLock<Vec<EmailMessage>>>,
}

impl InMemoryBackend {
    /// Creates a new in-memory email backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all sent messages.
    pub async fn get_messages(&self) -> Vec<EmailMessage> {
        self.messages.read().await.clone()
    }

    /// Returns the number of sent messages.
    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Clears all stored messages.
    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }
}

#[async_trait]
impl EmailBackend for InMemoryBackend {
    async fn send(&self, message: &EmailMessage) -> AuthEnhancedResult<()> {
        if message.to.is_empty() {
            return Err(AuthEnhancedError::Validation(
                auth_enhanced_core::error::ValidationError::new(
                    "Email must have at least one recipient",
                    "no_recipients",
                ),
            ));
        }

        self.messages.write().await.push(message.clone());
        Ok(())
    }
}

// ============================================================
// Templates
// ============================================================

/// Renders email bodies from `tera` templates.
///
/// Templates are looked up as `{prefix}/{name}.txt` (required) and
/// `{prefix}/{name}.html` (optional).
pub struct EmailTemplates {
    tera: tera::Tera,
    prefix: String,
}

impl EmailTemplates {
    /// Creates an empty template set with the given lookup prefix.
    pub fn new(prefix: impl Into<String>) -> AuthEnhancedResult<Self> {
        Ok(Self {
            tera: tera::Tera::default(),
            prefix: prefix.into(),
        })
    }

    /// Creates a template set from a directory of templates.
    ///
    /// `dir` is globbed recursively; template names are the paths relative
    /// to `dir` (so a file `auth_enhanced/user_email_verification.txt`
    /// matches the default prefix).
    pub fn from_directory(dir: &str, prefix: impl Into<String>) -> AuthEnhancedResult<Self> {
        let glob = format!("{}/**/*", dir.trim_end_matches('/'));
        let tera = tera::Tera::new(&glob).map_err(|e| {
            AuthEnhancedError::Configuration(format!("Failed to load templates from '{dir}': {e}"))
        })?;
        Ok(Self {
            tera,
            prefix: prefix.into(),
        })
    }

    /// Creates a template set pre-loaded with the app's default templates
    /// for the given settings.
    pub fn with_defaults(settings: &AuthSettings) -> AuthEnhancedResult<Self> {
        let mut templates = Self::new(&settings.email_template_prefix)?;
        templates.add_raw(
            "admin_signup_notification.txt",
            "Hello {{ admin_name }},\n\n\
             a new account '{{ new_user_name }}' ({{ new_user_email }}) was \
             just registered.\n\
             {% if mode_auto %}The account is already active.{% endif %}\
             {% if mode_email %}The account awaits email verification.{% endif %}\
             {% if mode_manual %}The account awaits manual activation.{% endif %}\n\n\
             {{ webmaster_email }}\n",
        )?;
        templates.add_raw(
            "user_email_verification.txt",
            "Hello {{ new_user_name }},\n\n\
             please verify your email address with the following token:\n\n\
             {{ verification_token }}\n\n\
             {{ webmaster_email }}\n",
        )?;
        Ok(templates)
    }

    /// Registers a raw template under `{prefix}/{name}`.
    pub fn add_raw(&mut self, name: &str, body: &str) -> AuthEnhancedResult<()> {
        let full = format!("{}/{name}", self.prefix);
        self.tera
            .add_raw_template(&full, body)
            .map_err(|e| AuthEnhancedError::Configuration(format!("Invalid template: {e}")))
    }

    /// Renders the text body for the given template name.
    ///
    /// # Errors
    ///
    /// A missing text template is a configuration error; it must be
    /// provided.
    pub fn render_txt(&self, name: &str, context: &tera::Context) -> AuthEnhancedResult<String> {
        let template = format!("{}/{name}.txt", self.prefix);
        let body = self.tera.render(&template, context).map_err(|e| {
            AuthEnhancedError::Configuration(format!(
                "You have to provide a text template '{template}'. ({e})"
            ))
        })?;
        Ok(body.trim().to_string())
    }

    /// Renders the optional HTML alternative for the given template name.
    ///
    /// A missing HTML template is not an error; `None` is returned and the
    /// mail goes out as plain text.
    pub fn render_html(&self, name: &str, context: &tera::Context) -> Option<String> {
        let template = format!("{}/{name}.html", self.prefix);
        self.tera.render(&template, context).ok()
    }

    /// Builds a complete message from the template pair.
    pub fn build_message(
        &self,
        name: &str,
        context: &tera::Context,
        subject: impl Into<String>,
        from_email: impl Into<String>,
        to: Vec<String>,
    ) -> AuthEnhancedResult<EmailMessage> {
        let mut message = EmailMessage::new(subject, self.render_txt(name, context)?, from_email, to);
        message.html_body = self.render_html(name, context);
        Ok(message)
    }
}

// ============================================================
// Signup notifications
// ============================================================

/// Subject line of the admin notification mail.
const ADMIN_NOTIFICATION_SUBJECT: &str = "New Signup Notification";

/// Subject line of the verification mail.
const VERIFICATION_SUBJECT: &str = "Email Verification Mail";

/// Dispatches the mails triggered by a new signup.
///
/// Two kinds of mail exist:
///
/// - the admin notification, sent iff `admin_signup_notification` is
///   non-empty, one message per recipient wanting mail;
/// - the user verification mail, sent iff the operation mode is
///   `EmailActivation`, carrying a fresh token.
pub struct SignupNotifier {
    settings: AuthSettings,
    templates: EmailTemplates,
    backend: Arc<dyn EmailBackend>,
}

impl SignupNotifier {
    /// Creates a notifier over the given backend, with the default
    /// templates.
    pub fn new(settings: AuthSettings, backend: Arc<dyn EmailBackend>) -> AuthEnhancedResult<Self> {
        let templates = EmailTemplates::with_defaults(&settings)?;
        Ok(Self {
            settings,
            templates,
            backend,
        })
    }

    /// Creates a notifier with a custom template set.
    pub fn with_templates(
        settings: AuthSettings,
        templates: EmailTemplates,
        backend: Arc<dyn EmailBackend>,
    ) -> Self {
        Self {
            settings,
            templates,
            backend,
        }
    }

    /// The base template context shared by both mail kinds.
    fn base_context(&self, account: &Account) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("new_user_name", &account.username);
        context.insert("new_user_email", &account.email);
        context.insert("webmaster_email", &self.settings.email_from_address);
        match self.settings.operation_mode {
            OperationMode::AutoActivation => context.insert("mode_auto", &true),
            OperationMode::EmailActivation => context.insert("mode_email", &true),
            OperationMode::ManualActivation => context.insert("mode_manual", &true),
        }
        context
    }

    /// Sends one notification mail to every configured admin recipient that
    /// wants mail. Returns the number of messages sent.
    pub async fn notify_admins(&self, account: &Account) -> AuthEnhancedResult<usize> {
        let recipients: Vec<_> = self
            .settings
            .admin_signup_notification
            .iter()
            .filter(|r| r.wants_mail())
            .collect();
        if recipients.is_empty() {
            return Ok(0);
        }

        let mut subject = ADMIN_NOTIFICATION_SUBJECT.to_string();
        if let Some(prefix) = &self.settings.admin_notification_subject_prefix {
            subject = format!("[{prefix}] {subject}");
        }

        let mut messages = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let mut context = self.base_context(account);
            context.insert("admin_name", &recipient.name);

            messages.push(self.templates.build_message(
                "admin_signup_notification",
                &context,
                subject.clone(),
                self.settings.email_from_address.clone(),
                vec![recipient.address.clone()],
            )?);
        }

        let sent = self.backend.send_many(&messages).await?;
        tracing::info!(username = %account.username, sent, "admin signup notification dispatched");
        Ok(sent)
    }

    /// Sends the verification mail to the new account, with a freshly issued
    /// token.
    pub async fn send_verification_mail(
        &self,
        account: &Account,
        tokens: &TokenService,
    ) -> AuthEnhancedResult<()> {
        let mut subject = VERIFICATION_SUBJECT.to_string();
        if let Some(prefix) = &self.settings.email_subject_prefix {
            subject = format!("[{prefix}] {subject}");
        }

        let mut context = self.base_context(account);
        context.insert("verification_token", &tokens.issue_token(account)?);

        let message = self.templates.build_message(
            "user_email_verification",
            &context,
            subject,
            self.settings.email_from_address.clone(),
            vec![account.email.clone()],
        )?;

        self.backend.send(&message).await?;
        tracing::info!(username = %account.username, "verification mail dispatched");
        Ok(())
    }

    /// Dispatches all mails owed for a freshly created account: the admin
    /// notification (if configured) and, in email-activation mode, the
    /// verification mail. Called exactly once per signup.
    pub async fn dispatch(&self, account: &Account, tokens: &TokenService) -> AuthEnhancedResult<()> {
        self.notify_admins(account).await?;

        if self.settings.operation_mode == OperationMode::EmailActivation {
            self.send_verification_mail(account, tokens).await?;
        }

        Ok(())
    }
}
