//! Order types.

use crate::cart::{AppliedDiscount, CartLine};
use crate::checkout::{PaymentMethod, ShippingInfo};
use crate::error::CommerceError;
use crate::ids::{OrderId, TransactionId};
use crate::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Paid and accepted.
    #[default]
    Confirmed,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

/// How an order was paid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentRecord {
    /// Payment method used.
    pub method: PaymentMethod,
    /// Gateway reference.
    pub transaction_id: TransactionId,
}

/// A completed purchase.
///
/// Lines are an owned snapshot of the cart at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Email the confirmation was sent to.
    pub user_email: String,
    /// Items in the order.
    pub lines: Vec<OrderLine>,
    /// Shipping details.
    pub shipping: ShippingInfo,
    /// Payment method and transaction reference.
    pub payment: PaymentRecord,
    /// Discount applied at checkout.
    pub discount: Option<AppliedDiscount>,
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// Amount charged.
    pub total: Money,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
    /// Order status.
    pub status: OrderStatus,
}

impl Order {
    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Savings from the discount code.
    pub fn savings(&self) -> Money {
        self.discount
            .as_ref()
            .map(|d| d.amount)
            .unwrap_or_else(|| Money::zero(self.total.currency))
    }

    /// Flat, display-ready view of the order.
    pub fn summary(&self) -> OrderSummary {
        OrderSummary {
            order_id: self.id.to_string(),
            user_email: self.user_email.clone(),
            items: self
                .lines
                .iter()
                .map(|l| OrderSummaryItem {
                    title: l.title.clone(),
                    quantity: l.quantity,
                    price: l.unit_price.display_amount(),
                })
                .collect(),
            shipping_info: self.shipping.clone(),
            payment_method: self.payment.method.to_string(),
            transaction_id: self.payment.transaction_id.to_string(),
            discount_code: self.discount.as_ref().map(|d| d.code.clone()),
            total_amount: self.total.display_amount(),
            order_date: self.placed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            status: self.status.display_name().to_string(),
        }
    }
}

/// A line in an order, copied from the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Book title at time of order.
    pub title: String,
    /// Category at time of order.
    pub category: String,
    /// Unit price at time of order.
    pub unit_price: Money,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price × quantity.
    pub line_total: Money,
}

impl OrderLine {
    /// Snapshot a cart line.
    pub fn from_cart_line(line: &CartLine) -> Result<Self, CommerceError> {
        Ok(Self {
            title: line.book.title.clone(),
            category: line.book.category.clone(),
            unit_price: line.book.price,
            quantity: line.quantity,
            line_total: line.total_price()?,
        })
    }
}

/// Serializable order view for confirmation pages and JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
    pub order_id: String,
    pub user_email: String,
    pub items: Vec<OrderSummaryItem>,
    pub shipping_info: ShippingInfo,
    pub payment_method: String,
    pub transaction_id: String,
    pub discount_code: Option<String>,
    pub total_amount: String,
    pub order_date: String,
    pub status: String,
}

/// One line of an [`OrderSummary`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderSummaryItem {
    pub title: String,
    pub quantity: i64,
    pub price: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Book;
    use crate::money::Currency;
    use chrono::TimeZone;

    fn sample_order() -> Order {
        let line = CartLine {
            book: Book::new("1984", "Dystopia", Money::new(899, Currency::USD), ""),
            quantity: 2,
        };
        Order {
            id: OrderId::new("ABCD1234"),
            user_email: "ada@example.com".to_string(),
            lines: vec![OrderLine::from_cart_line(&line).unwrap()],
            shipping: ShippingInfo::new(
                "Ada",
                "ada@example.com",
                "1 Main St",
                "Springfield",
                "12345",
            ),
            payment: PaymentRecord {
                method: PaymentMethod::CreditCard,
                transaction_id: TransactionId::new("TXN123456"),
            },
            discount: None,
            subtotal: Money::new(1798, Currency::USD),
            total: Money::new(1798, Currency::USD),
            placed_at: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
            status: OrderStatus::Confirmed,
        }
    }

    #[test]
    fn test_order_line_snapshot() {
        let order = sample_order();
        assert_eq!(order.lines[0].line_total.amount_cents, 1798);
        assert_eq!(order.item_count(), 2);
        assert!(order.savings().is_zero());
    }

    #[test]
    fn test_order_summary() {
        let summary = sample_order().summary();
        assert_eq!(summary.order_id, "ABCD1234");
        assert_eq!(summary.order_date, "2024-03-09 14:05:00");
        assert_eq!(summary.total_amount, "17.98");
        assert_eq!(summary.status, "Confirmed");
        assert_eq!(summary.payment_method, "credit_card");
        assert_eq!(summary.items[0].price, "8.99");
    }

    #[test]
    fn test_default_status_is_confirmed() {
        assert_eq!(OrderStatus::default(), OrderStatus::Confirmed);
        assert_eq!(OrderStatus::Confirmed.as_str(), "confirmed");
    }
}
