//! Authentication module for the bookstore.
//!
//! Provides customer accounts, password hashing and visitor sessions.

mod account;
mod error;
mod password;
mod session;
mod store;

pub use account::{normalize_email, validate_email, Account, Identity, ProfileUpdate, Registration};
pub use error::AuthError;
pub use password::PasswordHasher;
pub use session::{Session, SessionId, SessionStore};
pub use store::{AccountHistory, AccountStore, DEMO_ADDRESS, DEMO_EMAIL, DEMO_NAME, DEMO_PASSWORD};
