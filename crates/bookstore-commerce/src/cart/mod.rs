//! Shopping cart module.
//!
//! Contains types for cart, cart lines, pricing, and discount codes.

mod cart;
mod pricing;
mod discount;

pub use cart::{parse_quantity, parse_quantity_update, Cart, CartLine, MAX_QUANTITY_PER_LINE};
pub use pricing::CartPricing;
pub use discount::{AppliedDiscount, Discount, DiscountOutcome, DiscountTable};
