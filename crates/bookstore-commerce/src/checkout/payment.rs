//! Payment details and the mock payment gateway.

use crate::error::CommerceError;
use crate::ids::TransactionId;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// How the customer pays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Card payment; requires number, expiry and CVV.
    CreditCard,
    /// PayPal redirect.
    PayPal,
    /// Any other method name, kept verbatim.
    Other(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::PayPal => "paypal",
            PaymentMethod::Other(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Other(name) => name,
        }
    }
}

impl From<&str> for PaymentMethod {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit_card" => PaymentMethod::CreditCard,
            "paypal" => PaymentMethod::PayPal,
            _ => PaymentMethod::Other(s.trim().to_string()),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(s: String) -> Self {
        PaymentMethod::from(s.as_str())
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment fields entered at checkout.
///
/// `Debug` masks the card number and never prints the CVV.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Payment method.
    pub method: PaymentMethod,
    /// Card number (credit card only).
    pub card_number: Option<String>,
    /// Card expiry, e.g. "12/27".
    pub expiry: Option<String>,
    /// Card security code.
    pub cvv: Option<String>,
}

impl PaymentDetails {
    /// Card payment.
    pub fn credit_card(
        card_number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            method: PaymentMethod::CreditCard,
            card_number: Some(card_number.into()),
            expiry: Some(expiry.into()),
            cvv: Some(cvv.into()),
        }
    }

    /// PayPal payment.
    pub fn paypal() -> Self {
        Self {
            method: PaymentMethod::PayPal,
            card_number: None,
            expiry: None,
            cvv: None,
        }
    }

    /// Card number with surrounding whitespace removed, if non-empty.
    pub fn card_number(&self) -> Option<&str> {
        non_blank(&self.card_number)
    }

    /// Last four digits of the card, for logs and receipts.
    pub fn card_last4(&self) -> Option<&str> {
        self.card_number().map(|n| {
            let start = n.char_indices().rev().nth(3).map(|(i, _)| i).unwrap_or(0);
            &n[start..]
        })
    }

    /// Check that a card payment carries number, expiry and CVV.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.method == PaymentMethod::CreditCard
            && (self.card_number().is_none()
                || non_blank(&self.expiry).is_none()
                || non_blank(&self.cvv).is_none())
        {
            return Err(CommerceError::IncompletePaymentInfo);
        }
        Ok(())
    }
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentDetails")
            .field("method", &self.method)
            .field("card_last4", &self.card_last4())
            .field("expiry", &self.expiry)
            .field("cvv", &self.cvv.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Outcome of a payment attempt.
///
/// A transaction id exists only on approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentResult {
    /// Charge accepted.
    Approved {
        transaction_id: TransactionId,
        message: String,
    },
    /// Charge refused.
    Declined { reason: String },
}

impl PaymentResult {
    /// Check if the payment went through.
    pub fn is_success(&self) -> bool {
        matches!(self, PaymentResult::Approved { .. })
    }

    /// Transaction id, present only on approval.
    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            PaymentResult::Approved { transaction_id, .. } => Some(transaction_id),
            PaymentResult::Declined { .. } => None,
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> String {
        match self {
            PaymentResult::Approved { message, .. } => message.clone(),
            PaymentResult::Declined { reason } => format!("Payment failed: {}", reason),
        }
    }
}

/// A payment processor.
pub trait PaymentGateway: Send + Sync {
    /// Attempt to charge `amount`.
    fn authorize(&self, details: &PaymentDetails, amount: Money) -> PaymentResult;
}

/// Reason given for every mock decline.
pub const INVALID_CARD_NUMBER: &str = "Invalid card number";

/// Card suffix the mock gateway always declines.
pub const DECLINED_CARD_SUFFIX: &str = "1111";

/// Rule-based stand-in for a real payment processor.
///
/// - credit card without a number: declined
/// - any card number ending in `1111`: declined
/// - everything else: approved with a fresh `TXNnnnnnn` reference
#[derive(Debug, Clone, Copy, Default)]
pub struct MockPaymentGateway;

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self
    }
}

impl PaymentGateway for MockPaymentGateway {
    fn authorize(&self, details: &PaymentDetails, amount: Money) -> PaymentResult {
        let missing_number =
            details.method == PaymentMethod::CreditCard && details.card_number().is_none();
        // Suffix is checked on the number exactly as entered.
        let declined = missing_number
            || details
                .card_number
                .as_deref()
                .is_some_and(|number| number.ends_with(DECLINED_CARD_SUFFIX));
        if declined {
            warn!(
                method = %details.method,
                card_last4 = ?details.card_last4(),
                amount = %amount,
                "mock payment declined"
            );
            return PaymentResult::Declined {
                reason: INVALID_CARD_NUMBER.to_string(),
            };
        }

        let transaction_id = TransactionId::generate();
        let message = match details.method {
            PaymentMethod::PayPal => "Payment with PayPal processed successfully",
            _ => "Payment processed successfully",
        };
        info!(
            method = %details.method,
            transaction_id = %transaction_id,
            amount = %amount,
            "mock payment approved"
        );
        PaymentResult::Approved {
            transaction_id,
            message: message.to_string(),
        }
    }
}
