//! Cart pricing calculations.

use crate::cart::{AppliedDiscount, Discount};
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Pricing breakdown for a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartPricing {
    /// Subtotal before discounts.
    pub subtotal: Money,
    /// The discount applied, if any.
    pub discount: Option<AppliedDiscount>,
    /// Total discount amount.
    pub discount_total: Money,
    /// Final total (subtotal - discount).
    pub grand_total: Money,
}

impl CartPricing {
    /// Apply an optional discount to a subtotal.
    pub fn calculate(subtotal: Money, discount: Option<&Discount>) -> Result<Self, CommerceError> {
        let applied = discount.map(|d| AppliedDiscount::from_discount(d, d.amount_for(&subtotal)));
        let discount_total = applied
            .as_ref()
            .map(|a| a.amount)
            .unwrap_or_else(|| Money::zero(subtotal.currency));
        let grand_total = subtotal
            .try_subtract(&discount_total)
            .ok_or(CommerceError::Overflow)?;

        Ok(Self {
            subtotal,
            discount: applied,
            discount_total,
            grand_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_pricing_without_discount() {
        let pricing = CartPricing::calculate(Money::new(3097, Currency::USD), None).unwrap();
        assert_eq!(pricing.grand_total.amount_cents, 3097);
        assert!(pricing.discount_total.is_zero());
        assert!(pricing.discount.is_none());
    }

    #[test]
    fn test_pricing_with_save10() {
        let discount = Discount::percentage("SAVE10", "Discount applied!", 10.0);
        let pricing =
            CartPricing::calculate(Money::new(3097, Currency::USD), Some(&discount)).unwrap();

        assert_eq!(pricing.discount_total.amount_cents, 310);
        assert_eq!(pricing.grand_total.amount_cents, 2787);
        assert_eq!(pricing.grand_total.display(), "$27.87");
        assert_eq!(pricing.discount.unwrap().code, "SAVE10");
    }
}
