//! Commerce error types.

use crate::checkout::ShippingField;
use thiserror::Error;

/// Errors that can occur in catalog, cart and checkout operations.
///
/// Every variant is recoverable: callers map it to a message and let the
/// customer retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Quantity below one on add.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity input that is not a number.
    #[error("Malformed quantity: {0:?}")]
    MalformedQuantity(String),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// No book with this title in the catalog.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A required shipping field was left blank.
    #[error("Missing required field: {}", .0.as_str())]
    MissingField(ShippingField),

    /// Credit card number, expiry or CVV missing.
    #[error("Incomplete payment information")]
    IncompletePaymentInfo,

    /// The payment gateway declined the charge.
    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Confirmation could not be delivered.
    #[error("Notification failed: {0}")]
    Notification(String),

    /// The purchaser's order history could not be updated.
    #[error("Order history update failed: {0}")]
    OrderHistory(String),
}

impl CommerceError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CommerceError::InvalidQuantity(_) => "invalid_quantity",
            CommerceError::MalformedQuantity(_) => "malformed_quantity",
            CommerceError::QuantityExceedsLimit(..) => "quantity_exceeds_limit",
            CommerceError::ItemNotFound(_) => "item_not_found",
            CommerceError::EmptyCart => "empty_cart",
            CommerceError::MissingField(_) => "missing_field",
            CommerceError::IncompletePaymentInfo => "incomplete_payment_info",
            CommerceError::PaymentDeclined(_) => "payment_declined",
            CommerceError::OrderNotFound(_) => "order_not_found",
            CommerceError::CurrencyMismatch { .. } => "currency_mismatch",
            CommerceError::Overflow => "overflow",
            CommerceError::Validation(_) => "validation",
            CommerceError::Notification(_) => "notification",
            CommerceError::OrderHistory(_) => "order_history",
        }
    }
}

