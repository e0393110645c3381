//! Discount codes.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A percentage discount unlocked by a code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Discount {
    /// Discount code (e.g., "SAVE10"), matched case-insensitively.
    pub code: String,
    /// Message shown when the code is applied.
    pub name: String,
    /// Percentage off (0.0 - 100.0).
    pub percent: f64,
}

impl Discount {
    /// Create a new percentage discount.
    pub fn percentage(code: impl Into<String>, name: impl Into<String>, percent: f64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            percent,
        }
    }

    /// Amount taken off `subtotal`, never more than the subtotal itself.
    pub fn amount_for(&self, subtotal: &Money) -> Money {
        let amount = subtotal.percentage(self.percent);
        if amount.amount_cents > subtotal.amount_cents {
            *subtotal
        } else {
            amount
        }
    }

    /// Check whether `code` unlocks this discount.
    pub fn matches(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code.trim())
    }
}

/// Result of looking up a customer-supplied code.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountOutcome<'a> {
    /// No code was entered.
    NoCode,
    /// The code matched a discount.
    Applied(&'a Discount),
    /// A non-empty code that matched nothing. Not an error.
    Unrecognized(String),
}

/// The fixed table of codes a store accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountTable {
    discounts: Vec<Discount>,
}

impl DiscountTable {
    /// Build a table, rejecting out-of-range percentages and duplicate codes.
    pub fn new(discounts: Vec<Discount>) -> Result<Self, CommerceError> {
        for (i, discount) in discounts.iter().enumerate() {
            if discount.code.trim().is_empty() {
                return Err(CommerceError::Validation(
                    "discount code must not be empty".to_string(),
                ));
            }
            if !(0.0..=100.0).contains(&discount.percent) {
                return Err(CommerceError::Validation(format!(
                    "discount {} must be between 0 and 100 percent",
                    discount.code
                )));
            }
            if discounts.iter().skip(i + 1).any(|d| d.matches(&discount.code)) {
                return Err(CommerceError::Validation(format!(
                    "duplicate discount code: {}",
                    discount.code
                )));
            }
        }
        Ok(Self { discounts })
    }

    /// SAVE10 (10%) and WELCOME20 (20%).
    pub fn standard() -> Self {
        Self {
            discounts: vec![
                Discount::percentage("SAVE10", "Discount applied!", 10.0),
                Discount::percentage("WELCOME20", "Welcome discount applied!", 20.0),
            ],
        }
    }

    /// Look up a code. Blank input counts as no code.
    pub fn resolve(&self, code: Option<&str>) -> DiscountOutcome<'_> {
        let code = match code.map(str::trim) {
            None | Some("") => return DiscountOutcome::NoCode,
            Some(code) => code,
        };
        match self.discounts.iter().find(|d| d.matches(code)) {
            Some(discount) => DiscountOutcome::Applied(discount),
            None => DiscountOutcome::Unrecognized(code.to_string()),
        }
    }

    /// All discounts in the table.
    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }
}

impl Default for DiscountTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// A discount that has been applied to a cart total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedDiscount {
    /// The canonical discount code.
    pub code: String,
    /// Description for display.
    pub description: String,
    /// Percentage off.
    pub percent: f64,
    /// Amount discounted.
    pub amount: Money,
}

impl AppliedDiscount {
    /// Create from a discount and calculated amount.
    pub fn from_discount(discount: &Discount, amount: Money) -> Self {
        Self {
            code: discount.code.clone(),
            description: discount.name.clone(),
            percent: discount.percent,
            amount,
        }
    }
}
