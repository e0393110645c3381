//! Checkout workflow.
//!
//! A checkout runs through a fixed sequence of stages. Every stage up to
//! and including materialization may abort; an abort leaves the cart as it
//! was and commits nothing. Once the order is in the registry the remaining
//! side effects are best-effort and surface as receipt warnings.

use crate::cart::{Cart, CartPricing, DiscountOutcome, DiscountTable};
use crate::checkout::{
    Order, OrderLine, OrderRegistry, OrderStatus, PaymentDetails, PaymentGateway, PaymentRecord,
    PaymentResult, ShippingInfo,
};
use crate::error::CommerceError;
use crate::notification::Notifier;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Attempts at committing under a fresh id when the registry reports a collision.
const MAX_COMMIT_ATTEMPTS: usize = 4;

/// Stages of a checkout, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    /// Cart must not be empty.
    Precondition,
    /// Discount code lookup and pricing.
    Discount,
    /// Required shipping fields.
    ShippingValidation,
    /// Required payment fields.
    PaymentValidation,
    /// Charge through the gateway.
    Authorization,
    /// Order creation and registry insert.
    Materialization,
    /// History, confirmation and cart clearing.
    PostCommit,
}

impl CheckoutStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStage::Precondition => "precondition",
            CheckoutStage::Discount => "discount",
            CheckoutStage::ShippingValidation => "shipping_validation",
            CheckoutStage::PaymentValidation => "payment_validation",
            CheckoutStage::Authorization => "authorization",
            CheckoutStage::Materialization => "materialization",
            CheckoutStage::PostCommit => "post_commit",
        }
    }
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the customer submits at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub shipping: ShippingInfo,
    pub payment: PaymentDetails,
    /// Optional code, blank counts as none.
    pub discount_code: Option<String>,
}

impl CheckoutRequest {
    pub fn new(shipping: ShippingInfo, payment: PaymentDetails) -> Self {
        Self {
            shipping,
            payment,
            discount_code: None,
        }
    }

    pub fn with_discount(mut self, code: impl Into<String>) -> Self {
        self.discount_code = Some(code.into());
        self
    }
}

/// A checkout that stopped before committing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("checkout failed at {stage}: {error}")]
pub struct CheckoutFailure {
    pub stage: CheckoutStage,
    pub error: CommerceError,
}

impl CheckoutFailure {
    fn at(stage: CheckoutStage, error: CommerceError) -> Self {
        Self { stage, error }
    }

    /// Message suitable for showing to the customer.
    pub fn message(&self) -> String {
        match &self.error {
            CommerceError::EmptyCart => "Your cart is empty!".to_string(),
            CommerceError::MissingField(field) => {
                format!("Please fill in the {} field", field.display_name())
            }
            CommerceError::IncompletePaymentInfo => {
                "Please fill in all credit card details".to_string()
            }
            CommerceError::PaymentDeclined(reason) => format!("Payment failed: {}", reason),
            other => other.to_string(),
        }
    }
}

/// Result of a committed checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    /// Gateway message for the approved charge.
    pub payment_message: String,
    /// "You saved" notice when a code was applied.
    pub discount_message: Option<String>,
    /// Non-fatal problems: unknown discount codes, failed side effects.
    pub warnings: Vec<String>,
}

impl CheckoutReceipt {
    pub fn order_id(&self) -> &crate::ids::OrderId {
        &self.order.id
    }
}

/// Somewhere a purchaser's orders are kept.
pub trait OrderHistory {
    /// Append a committed order.
    fn record_order(&self, order: &Order) -> Result<(), CommerceError>;
}

/// Runs checkouts against a gateway, a notifier and an order registry.
pub struct CheckoutWorkflow<'a> {
    gateway: &'a dyn PaymentGateway,
    notifier: &'a dyn Notifier,
    registry: &'a OrderRegistry,
    discounts: &'a DiscountTable,
}

impl<'a> CheckoutWorkflow<'a> {
    pub fn new(
        gateway: &'a dyn PaymentGateway,
        notifier: &'a dyn Notifier,
        registry: &'a OrderRegistry,
        discounts: &'a DiscountTable,
    ) -> Self {
        Self {
            gateway,
            notifier,
            registry,
            discounts,
        }
    }

    /// Check out `cart`.
    ///
    /// On success the cart is emptied and the order is in the registry. On
    /// failure neither the cart nor the registry has changed.
    pub fn run(
        &self,
        cart: &mut Cart,
        request: &CheckoutRequest,
        purchaser: Option<&dyn OrderHistory>,
    ) -> Result<CheckoutReceipt, CheckoutFailure> {
        use CheckoutStage::*;

        if cart.is_empty() {
            debug!(stage = %Precondition, "checkout rejected: empty cart");
            return Err(CheckoutFailure::at(Precondition, CommerceError::EmptyCart));
        }

        let mut warnings = Vec::new();
        let discount = match self.discounts.resolve(request.discount_code.as_deref()) {
            DiscountOutcome::NoCode => None,
            DiscountOutcome::Applied(discount) => Some(discount),
            DiscountOutcome::Unrecognized(code) => {
                warn!(code = %code, "unrecognized discount code");
                warnings.push("Invalid discount code".to_string());
                None
            }
        };
        let pricing = cart
            .pricing(discount)
            .map_err(|e| CheckoutFailure::at(Discount, e))?;
        let discount_message = pricing
            .discount
            .as_ref()
            .map(|d| format!("{} You saved {}", d.description, d.amount.display()));

        if let Some(field) = request.shipping.first_missing() {
            debug!(stage = %ShippingValidation, field = field.as_str(), "checkout rejected");
            return Err(CheckoutFailure::at(
                ShippingValidation,
                CommerceError::MissingField(field),
            ));
        }

        request
            .payment
            .validate()
            .map_err(|e| CheckoutFailure::at(PaymentValidation, e))?;

        let (transaction_id, payment_message) =
            match self.gateway.authorize(&request.payment, pricing.grand_total) {
                PaymentResult::Approved {
                    transaction_id,
                    message,
                } => (transaction_id, message),
                PaymentResult::Declined { reason } => {
                    return Err(CheckoutFailure::at(
                        Authorization,
                        CommerceError::PaymentDeclined(reason),
                    ))
                }
            };

        let order = self
            .materialize(cart, request, &pricing, PaymentRecord {
                method: request.payment.method.clone(),
                transaction_id,
            })
            .map_err(|e| {
                warn!(error = %e, "charge approved but order could not be stored");
                CheckoutFailure::at(Materialization, e)
            })?;
        info!(
            order_id = %order.id,
            total = %order.total,
            items = order.item_count(),
            "order committed"
        );

        if let Some(history) = purchaser {
            if let Err(e) = history.record_order(&order) {
                warn!(
                    order_id = %order.id,
                    stage = %PostCommit,
                    error = %e,
                    "order history not updated"
                );
                warnings.push(format!("Order history could not be updated: {}", e));
            }
        }
        if let Err(e) = self
            .notifier
            .send_order_confirmation(&request.shipping.email, &order)
        {
            warn!(order_id = %order.id, stage = %PostCommit, error = %e, "confirmation not sent");
            warnings.push(format!("Confirmation email could not be sent: {}", e));
        }
        cart.clear();

        Ok(CheckoutReceipt {
            order,
            payment_message,
            discount_message,
            warnings,
        })
    }

    fn materialize(
        &self,
        cart: &Cart,
        request: &CheckoutRequest,
        pricing: &CartPricing,
        payment: PaymentRecord,
    ) -> Result<Order, CommerceError> {
        let lines = cart
            .lines()
            .iter()
            .map(OrderLine::from_cart_line)
            .collect::<Result<Vec<_>, _>>()?;

        let mut last_error = CommerceError::Validation("order was not stored".to_string());
        for _ in 0..MAX_COMMIT_ATTEMPTS {
            let order = Order {
                id: self.registry.next_id()?,
                user_email: request.shipping.email.trim().to_string(),
                lines: lines.clone(),
                shipping: request.shipping.clone(),
                payment: payment.clone(),
                discount: pricing.discount.clone(),
                subtotal: pricing.subtotal,
                total: pricing.grand_total,
                placed_at: Utc::now(),
                status: OrderStatus::Confirmed,
            };
            match self.registry.insert(order.clone()) {
                Ok(()) => return Ok(order),
                Err(e) => {
                    debug!(order_id = %order.id, "order id taken, retrying");
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::checkout::{MockPaymentGateway, PaymentMethod};
    use crate::checkout::ShippingField;
    use crate::money::Money;
    use crate::notification::OutboxNotifier;
    use parking_lot::Mutex;

    struct Fixture {
        gateway: MockPaymentGateway,
        notifier: OutboxNotifier,
        registry: OrderRegistry,
        discounts: DiscountTable,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                gateway: MockPaymentGateway::new(),
                notifier: OutboxNotifier::new(),
                registry: OrderRegistry::new(),
                discounts: DiscountTable::standard(),
            }
        }

        fn workflow(&self) -> CheckoutWorkflow<'_> {
            CheckoutWorkflow::new(&self.gateway, &self.notifier, &self.registry, &self.discounts)
        }
    }

    #[derive(Default)]
    struct VecHistory(Mutex<Vec<Order>>);

    impl OrderHistory for VecHistory {
        fn record_order(&self, order: &Order) -> Result<(), CommerceError> {
            self.0.lock().push(order.clone());
            Ok(())
        }
    }

    struct BrokenHistory;

    impl OrderHistory for BrokenHistory {
        fn record_order(&self, _order: &Order) -> Result<(), CommerceError> {
            Err(CommerceError::OrderHistory("account removed".to_string()))
        }
    }

    struct BrokenNotifier;

    impl Notifier for BrokenNotifier {
        fn send_order_confirmation(&self, _to: &str, _order: &Order) -> Result<(), CommerceError> {
            Err(CommerceError::Notification("smtp down".to_string()))
        }
    }

    /// Two Gatsby and one 1984, $30.97 in total.
    fn sample_cart() -> Cart {
        let catalog = Catalog::demo();
        let mut cart = Cart::default();
        cart.add(catalog.get("The Great Gatsby").unwrap(), 2).unwrap();
        cart.add(catalog.get("1984").unwrap(), 1).unwrap();
        cart
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo::new("Ada", "ada@example.com", "1 Main St", "Springfield", "12345")
    }

    fn card_request(number: &str) -> CheckoutRequest {
        CheckoutRequest::new(
            shipping(),
            PaymentDetails::credit_card(number, "12/27", "123"),
        )
    }

    #[test]
    fn test_checkout_with_save10() {
        let fx = Fixture::new();
        let mut cart = sample_cart();
        let history = VecHistory::default();
        let request = card_request("4242424242424242").with_discount("save10");

        let receipt = fx
            .workflow()
            .run(&mut cart, &request, Some(&history))
            .unwrap();

        assert_eq!(receipt.order.total, Money::new(2787, cart.currency()));
        assert_eq!(receipt.order.subtotal.amount_cents, 3097);
        assert_eq!(receipt.order.lines.len(), 2);
        assert_eq!(receipt.order.payment.method, PaymentMethod::CreditCard);
        assert!(receipt.order.payment.transaction_id.as_str().starts_with("TXN"));
        assert_eq!(
            receipt.discount_message.as_deref(),
            Some("Discount applied! You saved $3.10")
        );
        assert!(receipt.warnings.is_empty());
        assert!(cart.is_empty());

        assert_eq!(fx.registry.get(receipt.order_id()).unwrap(), receipt.order);
        assert_eq!(history.0.lock().len(), 1);
        let sent = fx.notifier.last().unwrap();
        assert_eq!(sent.to, "ada@example.com");
        assert!(sent.subject.ends_with(receipt.order_id().as_str()));
    }

    #[test]
    fn test_guest_checkout_with_paypal() {
        let fx = Fixture::new();
        let mut cart = sample_cart();
        let request = CheckoutRequest::new(shipping(), PaymentDetails::paypal());

        let receipt = fx.workflow().run(&mut cart, &request, None).unwrap();
        assert_eq!(receipt.order.total.amount_cents, 3097);
        assert_eq!(
            receipt.payment_message,
            "Payment with PayPal processed successfully"
        );
        assert!(receipt.discount_message.is_none());
    }

    #[test]
    fn test_unknown_discount_is_a_warning() {
        let fx = Fixture::new();
        let mut cart = sample_cart();
        let request = card_request("4242424242424242").with_discount("FREEBOOKS");

        let receipt = fx.workflow().run(&mut cart, &request, None).unwrap();
        assert_eq!(receipt.order.total.amount_cents, 3097);
        assert_eq!(receipt.warnings, vec!["Invalid discount code".to_string()]);
        assert!(receipt.order.discount.is_none());
    }

    fn assert_aborted(fx: &Fixture, cart: &Cart, before: &Cart, failure: &CheckoutFailure) {
        assert_eq!(cart, before, "cart changed on {:?}", failure.stage);
        assert!(fx.registry.is_empty());
        assert!(fx.notifier.is_empty());
    }

    #[test]
    fn test_empty_cart_aborts() {
        let fx = Fixture::new();
        let mut cart = Cart::default();
        let failure = fx
            .workflow()
            .run(&mut cart, &card_request("4242"), None)
            .unwrap_err();
        assert_eq!(failure.stage, CheckoutStage::Precondition);
        assert_eq!(failure.error, CommerceError::EmptyCart);
        assert_eq!(failure.message(), "Your cart is empty!");
        assert!(fx.registry.is_empty());
    }

    #[test]
    fn test_missing_shipping_field_aborts() {
        let fx = Fixture::new();
        let mut cart = sample_cart();
        let before = cart.clone();
        let mut request = card_request("4242424242424242");
        request.shipping.zip_code = String::new();

        let failure = fx.workflow().run(&mut cart, &request, None).unwrap_err();
        assert_eq!(failure.stage, CheckoutStage::ShippingValidation);
        assert_eq!(failure.error, CommerceError::MissingField(ShippingField::ZipCode));
        assert_eq!(failure.message(), "Please fill in the zip code field");
        assert_aborted(&fx, &cart, &before, &failure);
    }

    #[test]
    fn test_incomplete_card_aborts() {
        let fx = Fixture::new();
        let mut cart = sample_cart();
        let before = cart.clone();
        let mut request = card_request("4242424242424242");
        request.payment.cvv = None;

        let failure = fx.workflow().run(&mut cart, &request, None).unwrap_err();
        assert_eq!(failure.stage, CheckoutStage::PaymentValidation);
        assert_eq!(failure.message(), "Please fill in all credit card details");
        assert_aborted(&fx, &cart, &before, &failure);
    }

    #[test]
    fn test_declined_card_aborts() {
        let fx = Fixture::new();
        let mut cart = sample_cart();
        let before = cart.clone();
        let history = VecHistory::default();

        let failure = fx
            .workflow()
            .run(&mut cart, &card_request("4111111111111111"), Some(&history))
            .unwrap_err();
        assert_eq!(failure.stage, CheckoutStage::Authorization);
        assert_eq!(failure.message(), "Payment failed: Invalid card number");
        assert_aborted(&fx, &cart, &before, &failure);
        assert!(history.0.lock().is_empty());
    }

    #[test]
    fn test_post_commit_failures_become_warnings() {
        let gateway = MockPaymentGateway::new();
        let registry = OrderRegistry::new();
        let discounts = DiscountTable::standard();
        let workflow = CheckoutWorkflow::new(&gateway, &BrokenNotifier, &registry, &discounts);
        let mut cart = sample_cart();

        let receipt = workflow
            .run(&mut cart, &card_request("4242424242424242"), Some(&BrokenHistory))
            .unwrap();

        assert_eq!(receipt.warnings.len(), 2);
        assert!(registry.get(receipt.order_id()).is_ok());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(CheckoutStage::ShippingValidation.as_str(), "shipping_validation");
        assert_eq!(CheckoutStage::PostCommit.to_string(), "post_commit");
    }
}
