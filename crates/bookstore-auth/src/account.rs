//! Customer accounts.

use crate::AuthError;
use bookstore_commerce::checkout::Order;
use serde::{Deserialize, Serialize};

/// A registered customer.
///
/// The password is only ever held as a hash. `Debug` omits it entirely.
#[derive(Clone, PartialEq)]
pub struct Account {
    /// Lowercased email, the account key.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Default shipping address.
    pub address: String,
    password_hash: String,
    orders: Vec<Order>,
}

impl Account {
    pub(crate) fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        password_hash: String,
    ) -> Self {
        Self {
            email: normalize_email(&email.into()),
            name: name.into(),
            address: address.into(),
            password_hash,
            orders: Vec::new(),
        }
    }

    pub(crate) fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub(crate) fn set_password_hash(&mut self, hash: String) {
        self.password_hash = hash;
    }

    /// Append an order, keeping history sorted by placement time.
    pub fn record_order(&mut self, order: Order) {
        self.orders.push(order);
        // Stable, so orders placed in the same instant keep append order.
        self.orders.sort_by_key(|o| o.placed_at);
    }

    /// Orders placed while logged in, oldest first.
    pub fn order_history(&self) -> &[Order] {
        &self.orders
    }

    /// Public view of this account.
    pub fn identity(&self) -> Identity {
        Identity {
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("address", &self.address)
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

/// Who is logged in on a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub name: String,
}

/// Registration form.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    /// Optional default address.
    pub address: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            address: String::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Check required fields and email format.
    pub fn validate(&self) -> Result<(), AuthError> {
        for (field, value) in [
            ("email", &self.email),
            ("password", &self.password),
            ("name", &self.name),
        ] {
            if value.trim().is_empty() {
                return Err(AuthError::MissingField(field));
            }
        }
        validate_email(&self.email)
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Profile changes. `None` leaves a field as it is.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    /// New password; blank means unchanged.
    pub new_password: Option<String>,
}

impl ProfileUpdate {
    /// Blank-filtered new password.
    pub fn new_password(&self) -> Option<&str> {
        self.new_password.as_deref().filter(|p| !p.is_empty())
    }
}

impl std::fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("new_password", &self.new_password().map(|_| "***"))
            .finish()
    }
}

/// Canonical form of an email used as the account key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal format check: the address must contain both "@" and ".".
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.contains('@') && email.contains('.') {
        Ok(())
    } else {
        Err(AuthError::InvalidEmailFormat(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstore_commerce::checkout::{OrderStatus, PaymentMethod, PaymentRecord, ShippingInfo};
    use bookstore_commerce::ids::{OrderId, TransactionId};
    use bookstore_commerce::money::{Currency, Money};
    use chrono::{Duration, Utc};

    fn order(id: &str, offset_minutes: i64) -> Order {
        Order {
            id: OrderId::new(id),
            user_email: "ada@example.com".to_string(),
            lines: Vec::new(),
            shipping: ShippingInfo::default(),
            payment: PaymentRecord {
                method: PaymentMethod::PayPal,
                transaction_id: TransactionId::new("TXN111111"),
            },
            discount: None,
            subtotal: Money::zero(Currency::USD),
            total: Money::zero(Currency::USD),
            placed_at: Utc::now() + Duration::minutes(offset_minutes),
            status: OrderStatus::Confirmed,
        }
    }

    #[test]
    fn test_email_normalized() {
        let account = Account::new(" Ada@Example.COM ", "Ada", "", "hash".to_string());
        assert_eq!(account.email, "ada@example.com");
    }

    #[test]
    fn test_history_sorted_by_placement() {
        let mut account = Account::new("ada@example.com", "Ada", "", "hash".to_string());
        account.record_order(order("LATE", 10));
        account.record_order(order("EARLY", -10));

        let ids: Vec<&str> = account.order_history().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["EARLY", "LATE"]);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada.example.com").is_err());
        assert!(validate_email("ada@example").is_err());
    }

    #[test]
    fn test_registration_requires_fields() {
        assert_eq!(
            Registration::new("", "pw", "Ada").validate(),
            Err(AuthError::MissingField("email"))
        );
        assert_eq!(
            Registration::new("ada@example.com", "", "Ada").validate(),
            Err(AuthError::MissingField("password"))
        );
        assert_eq!(
            Registration::new("ada@example.com", "pw", " ").validate(),
            Err(AuthError::MissingField("name"))
        );
        assert!(Registration::new("ada@example.com", "pw", "Ada").validate().is_ok());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let account = Account::new("ada@example.com", "Ada", "", "$argon2id$secret".to_string());
        assert!(!format!("{:?}", account).contains("argon2id"));

        let registration = Registration::new("ada@example.com", "hunter2", "Ada");
        assert!(!format!("{:?}", registration).contains("hunter2"));

        let update = ProfileUpdate {
            new_password: Some("hunter2".to_string()),
            ..Default::default()
        };
        assert!(!format!("{:?}", update).contains("hunter2"));
    }
}
