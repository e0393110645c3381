//! Bookstore domain types and logic.
//!
//! - **Catalog**: books and categories
//! - **Cart**: cart lines, quantities, discount codes, pricing
//! - **Checkout**: shipping and payment input, mock gateway, orders, the
//!   checkout workflow
//! - **Notification**: order confirmations
//!
//! # Example
//!
//! ```rust
//! use bookstore_commerce::prelude::*;
//!
//! let catalog = Catalog::demo();
//! let mut cart = Cart::new(Currency::USD);
//! cart.add(catalog.get("1984").unwrap(), 2).unwrap();
//!
//! let pricing = cart.pricing(None).unwrap();
//! assert_eq!(pricing.grand_total.display(), "$17.98");
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notification;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{Book, Catalog};

    // Cart
    pub use crate::cart::{
        parse_quantity, parse_quantity_update, AppliedDiscount, Cart, CartLine, CartPricing,
        Discount, DiscountOutcome, DiscountTable,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutFailure, CheckoutReceipt, CheckoutRequest, CheckoutStage, CheckoutWorkflow,
        MockPaymentGateway, Order, OrderHistory, OrderLine, OrderRegistry, OrderStatus,
        OrderSummary, PaymentDetails, PaymentGateway, PaymentMethod, PaymentResult, ShippingField,
        ShippingInfo,
    };

    // Notification
    pub use crate::notification::{LogNotifier, Notifier, OrderConfirmation, OutboxNotifier};
}
