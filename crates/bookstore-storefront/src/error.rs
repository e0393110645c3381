//! Storefront errors.

use bookstore_auth::AuthError;
use bookstore_commerce::checkout::CheckoutFailure;
use bookstore_commerce::CommerceError;
use thiserror::Error;

/// Any failure surfaced by the [`Storefront`](crate::Storefront).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Checkout(#[from] CheckoutFailure),

    /// Configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Text to show the customer.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Commerce(e) => match e {
                CommerceError::InvalidQuantity(_) => "Quantity must be at least 1.".to_string(),
                CommerceError::MalformedQuantity(_) => {
                    "Invalid quantity. Please enter a number.".to_string()
                }
                CommerceError::QuantityExceedsLimit(_, max) => {
                    format!("Quantity cannot be more than {}.", max)
                }
                CommerceError::ItemNotFound(_) => "Book not found!".to_string(),
                CommerceError::EmptyCart => "Your cart is empty!".to_string(),
                CommerceError::OrderNotFound(_) => "Order not found".to_string(),
                other => other.to_string(),
            },
            StoreError::Auth(e) => match e {
                AuthError::DuplicateAccount(_) => {
                    "An account with this email already exists".to_string()
                }
                AuthError::InvalidEmailFormat(_) => "Invalid email format.".to_string(),
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::MissingField(_) => "Please fill in all required fields".to_string(),
                AuthError::NotAuthenticated => "Please log in to access this page.".to_string(),
                AuthError::SessionNotFound(_) => {
                    "Your session has expired. Please start again.".to_string()
                }
                AuthError::AccountNotFound(_) => "Account not found".to_string(),
                AuthError::Hashing(_) => "Something went wrong. Please try again.".to_string(),
                AuthError::CheckoutInProgress(_) => {
                    "Your order is already being processed.".to_string()
                }
            },
            StoreError::Checkout(failure) => failure.message(),
            StoreError::Config(message) => message.clone(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Commerce(e) => e.kind(),
            StoreError::Auth(e) => match e {
                AuthError::DuplicateAccount(_) => "duplicate_account",
                AuthError::InvalidEmailFormat(_) => "invalid_email_format",
                AuthError::InvalidCredentials => "invalid_credentials",
                AuthError::MissingField(_) => "missing_field",
                AuthError::AccountNotFound(_) => "account_not_found",
                AuthError::SessionNotFound(_) => "session_not_found",
                AuthError::NotAuthenticated => "not_authenticated",
                AuthError::Hashing(_) => "hashing",
                AuthError::CheckoutInProgress(_) => "checkout_in_progress",
            },
            StoreError::Checkout(failure) => failure.error.kind(),
            StoreError::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_commerce::checkout::{CheckoutStage, ShippingField};

    #[test]
    fn test_user_messages() {
        assert_eq!(
            StoreError::from(CommerceError::InvalidQuantity(0)).user_message(),
            "Quantity must be at least 1."
        );
        assert_eq!(
            StoreError::from(CommerceError::MalformedQuantity("abc".into())).user_message(),
            "Invalid quantity. Please enter a number."
        );
        assert_eq!(
            StoreError::from(AuthError::InvalidCredentials).user_message(),
            "Invalid email or password"
        );
        assert_eq!(
            StoreError::from(AuthError::DuplicateAccount("a@b.c".into())).user_message(),
            "An account with this email already exists"
        );
    }

    #[test]
    fn test_checkout_failure_message() {
        let failure = CheckoutFailure {
            stage: CheckoutStage::ShippingValidation,
            error: CommerceError::MissingField(ShippingField::ZipCode),
        };
        let err = StoreError::from(failure);
        assert_eq!(err.user_message(), "Please fill in the zip code field");
        assert_eq!(err.kind(), "missing_field");
    }
}
