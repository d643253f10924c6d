//! # auth-enhanced-accounts
//!
//! Account and enhancement records, the storage seam, the activation state
//! machine, verification tokens, the signup flow and the notification
//! dispatcher.
//!
//! ## Modules
//!
//! - [`user`] - Account records
//! - [`enhancement`] - Per-account verification state
//! - [`store`] - The `UserStore` trait and the in-memory implementation
//! - [`crypto`] - Verification token issue/verify
//! - [`activation`] - The activation state machine and token redemption
//! - [`signup`] - The registration flow
//! - [`email`] - Messages, backends, templates, signup notifications

pub mod activation;
pub mod crypto;
pub mod email;
pub mod enhancement;
pub mod signup;
pub mod store;
pub mod user;

// Re-export the most commonly used types at the crate root.
pub use activation::{account_state, initial_is_active, redeem_verification_token, AccountState};
pub use crypto::TokenService;
pub use email::{ConsoleBackend, EmailBackend, EmailMessage, EmailTemplates, InMemoryBackend, SignupNotifier};
pub use enhancement::{Enhancement, VerificationStatus};
pub use signup::SignupService;
pub use store::{MemoryUserStore, UserStore};
pub use user::{Account, NewAccount};
