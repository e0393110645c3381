//! Order confirmation delivery.
//!
//! Nothing here talks to a mail server. [`LogNotifier`] writes the rendered
//! confirmation to the tracing pipeline and [`OutboxNotifier`] keeps it in
//! memory so callers can inspect what would have been sent.

use crate::checkout::Order;
use crate::error::CommerceError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::info;

/// Sends order confirmations.
pub trait Notifier: Send + Sync {
    /// Deliver the confirmation for `order` to `to`.
    fn send_order_confirmation(&self, to: &str, order: &Order) -> Result<(), CommerceError>;
}

/// A rendered confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OrderConfirmation {
    pub fn render(to: &str, order: &Order) -> Self {
        let mut body = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(body, "Order Date: {}", order.placed_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(body, "Total Amount: {}", order.total.display());
        let _ = writeln!(body, "Items:");
        for line in &order.lines {
            let _ = writeln!(
                body,
                "  - {} x{} @ {}",
                line.title,
                line.quantity,
                line.unit_price.display()
            );
        }
        let address = if order.shipping.address.trim().is_empty() {
            "N/A"
        } else {
            order.shipping.address.as_str()
        };
        let _ = write!(body, "Shipping Address: {}", address);

        Self {
            to: to.to_string(),
            subject: format!("Order Confirmation - Order #{}", order.id),
            body,
        }
    }
}

/// Emits confirmations as `info` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_order_confirmation(&self, to: &str, order: &Order) -> Result<(), CommerceError> {
        let confirmation = OrderConfirmation::render(to, order);
        info!(
            to = %confirmation.to,
            subject = %confirmation.subject,
            body = %confirmation.body,
            "order confirmation sent"
        );
        Ok(())
    }
}

/// Keeps every confirmation in memory.
#[derive(Debug, Default)]
pub struct OutboxNotifier {
    sent: Mutex<Vec<OrderConfirmation>>,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirmations sent so far, oldest first.
    pub fn sent(&self) -> Vec<OrderConfirmation> {
        self.sent.lock().clone()
    }

    /// Most recent confirmation.
    pub fn last(&self) -> Option<OrderConfirmation> {
        self.sent.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl Notifier for OutboxNotifier {
    fn send_order_confirmation(&self, to: &str, order: &Order) -> Result<(), CommerceError> {
        let confirmation = OrderConfirmation::render(to, order);
        info!(to = %confirmation.to, subject = %confirmation.subject, "order confirmation queued");
        self.sent.lock().push(confirmation);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{OrderLine, OrderStatus, PaymentMethod, PaymentRecord, ShippingInfo};
    use crate::ids::{OrderId, TransactionId};
    use crate::money::{Currency, Money};
    use chrono::{TimeZone, Utc};

    fn order() -> Order {
        Order {
            id: OrderId::new("0A1B2C3D"),
            user_email: "ada@example.com".to_string(),
            lines: vec![OrderLine {
                title: "Moby Dick".to_string(),
                category: "Adventure".to_string(),
                unit_price: Money::new(1249, Currency::USD),
                quantity: 2,
                line_total: Money::new(2498, Currency::USD),
            }],
            shipping: ShippingInfo::new(
                "Ada",
                "ada@example.com",
                "1 Main St",
                "Springfield",
                "12345",
            ),
            payment: PaymentRecord {
                method: PaymentMethod::PayPal,
                transaction_id: TransactionId::new("TXN654321"),
            },
            discount: None,
            subtotal: Money::new(2498, Currency::USD),
            total: Money::new(2498, Currency::USD),
            placed_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            status: OrderStatus::Confirmed,
        }
    }

    #[test]
    fn test_render_confirmation() {
        let confirmation = OrderConfirmation::render("ada@example.com", &order());
        assert_eq!(confirmation.subject, "Order Confirmation - Order #0A1B2C3D");
        assert!(confirmation.body.contains("Order Date: 2024-01-02 03:04:05"));
        assert!(confirmation.body.contains("Total Amount: $24.98"));
        assert!(confirmation.body.contains("  - Moby Dick x2 @ $12.49"));
        assert!(confirmation.body.ends_with("Shipping Address: 1 Main St"));
    }

    #[test]
    fn test_outbox_records_sends() {
        let outbox = OutboxNotifier::new();
        assert!(outbox.is_empty());
        outbox.send_order_confirmation("ada@example.com", &order()).unwrap();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox.last().unwrap().to, "ada@example.com");
    }

    #[test]
    fn test_log_notifier_succeeds() {
        assert!(LogNotifier.send_order_confirmation("x@y.z", &order()).is_ok());
    }
}
