//! Checkout module.
//!
//! Contains shipping and payment input, the payment gateway, orders, the
//! order registry, and the checkout workflow that ties them together.

mod flow;
mod order;
mod payment;
mod registry;
mod shipping;

pub use flow::{
    CheckoutFailure, CheckoutReceipt, CheckoutRequest, CheckoutStage, CheckoutWorkflow,
    OrderHistory,
};
pub use order::{Order, OrderLine, OrderStatus, OrderSummary, OrderSummaryItem, PaymentRecord};
pub use payment::{
    MockPaymentGateway, PaymentDetails, PaymentGateway, PaymentMethod, PaymentResult,
    DECLINED_CARD_SUFFIX, INVALID_CARD_NUMBER,
};
pub use registry::OrderRegistry;
pub use shipping::{ShippingField, ShippingInfo};
