//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// An account with this email already exists.
    #[error("account already exists: {0}")]
    DuplicateAccount(String),

    /// Email lacks "@" or ".".
    #[error("invalid email format: {0}")]
    InvalidEmailFormat(String),

    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A required registration field was blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No account for this email.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Session not found.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The operation needs a logged-in session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The session already has a checkout running.
    #[error("checkout already in progress for session: {0}")]
    CheckoutInProgress(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
