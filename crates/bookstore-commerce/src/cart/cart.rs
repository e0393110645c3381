//! Cart and cart line types.

use crate::cart::{CartPricing, Discount};
use crate::catalog::Book;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_LINE: i64 = 100_000;

/// A shopping cart.
///
/// Lines are keyed by book title and kept in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: Currency,
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add a book to the cart.
    ///
    /// Quantities accumulate when the title is already present. Returns an
    /// error if:
    /// - Quantity is below one
    /// - The line would exceed MAX_QUANTITY_PER_LINE
    /// - The book is priced in another currency
    pub fn add(&mut self, book: &Book, quantity: i64) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if book.price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: book.price.currency.code().to_string(),
            });
        }

        if let Some(existing) = self.lines.iter_mut().find(|l| l.book.title == book.title) {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if new_quantity > MAX_QUANTITY_PER_LINE {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_LINE,
                ));
            }
            existing.quantity = new_quantity;
            debug!(title = %book.title, quantity = new_quantity, "cart line increased");
            return Ok(());
        }

        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }

        self.lines.push(CartLine {
            book: book.clone(),
            quantity,
        });
        debug!(title = %book.title, quantity, "cart line added");
        Ok(())
    }

    /// Remove a line by title. Absent titles are a no-op.
    pub fn remove(&mut self, title: &str) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| l.book.title != title);
        let removed = self.lines.len() < len_before;
        if removed {
            debug!(title, "cart line removed");
        }
        removed
    }

    /// Set the quantity of a line.
    ///
    /// A quantity of zero or less removes the line. Returns whether a line
    /// was changed; absent titles are a no-op.
    pub fn update_quantity(&mut self, title: &str, quantity: i64) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove(title));
        }

        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }

        match self.lines.iter_mut().find(|l| l.book.title == title) {
            Some(line) => {
                line.quantity = quantity;
                debug!(title, quantity, "cart line updated");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Take ordered quantities out of the cart.
    ///
    /// Lines added after `ordered` was snapshotted are left alone; a line
    /// whose remaining quantity drops to zero is removed.
    pub fn deduct(&mut self, ordered: &[CartLine]) {
        for sold in ordered {
            if let Some(line) = self.lines.iter_mut().find(|l| l.book.title == sold.book.title) {
                line.quantity -= sold.quantity;
            }
        }
        self.lines.retain(|l| l.quantity > 0);
        debug!(lines = self.lines.len(), "ordered lines deducted");
    }

    /// Sum of price × quantity over all lines.
    ///
    /// Cost is proportional to the number of distinct lines, not units.
    pub fn total_price(&self) -> Result<Money, CommerceError> {
        let line_totals = self
            .lines
            .iter()
            .map(CartLine::total_price)
            .collect::<Result<Vec<_>, _>>()?;
        Money::try_sum(line_totals.iter(), self.currency).ok_or(CommerceError::Overflow)
    }

    /// Total number of units (sum of quantities).
    pub fn total_item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get a line by title.
    pub fn line(&self, title: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.book.title == title)
    }

    /// Owned copy of the current lines.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    /// Cart currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Price the cart, optionally with a percentage discount.
    pub fn pricing(&self, discount: Option<&Discount>) -> Result<CartPricing, CommerceError> {
        CartPricing::calculate(self.total_price()?, discount)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::USD)
    }
}

/// One (book, quantity) pairing in a cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// The book being purchased.
    pub book: Book,
    /// Quantity, always at least one.
    pub quantity: i64,
}

impl CartLine {
    /// Unit price × quantity.
    pub fn total_price(&self) -> Result<Money, CommerceError> {
        self.book
            .price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)
    }
}

/// Parse a quantity typed by a customer for an add.
///
/// Non-numeric input is `MalformedQuantity`; numbers below one are
/// `InvalidQuantity`.
pub fn parse_quantity(input: &str) -> Result<i64, CommerceError> {
    let quantity = parse_quantity_update(input)?;
    if quantity < 1 {
        return Err(CommerceError::InvalidQuantity(quantity));
    }
    Ok(quantity)
}

/// Parse a quantity typed by a customer for an update.
///
/// Zero and negative values are accepted since they mean "remove".
pub fn parse_quantity_update(input: &str) -> Result<i64, CommerceError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| CommerceError::MalformedQuantity(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use proptest::prelude::*;

    fn book(title: &str, cents: i64) -> Book {
        Book::new(title, "Test", Money::new(cents, Currency::USD), "")
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price().unwrap(), Money::zero(Currency::USD));
    }

    #[test]
    fn test_add_same_book_accumulates() {
        let mut cart = Cart::default();
        let gatsby = book("The Great Gatsby", 1099);

        cart.add(&gatsby, 1).unwrap();
        cart.add(&gatsby, 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_item_count(), 3);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::default();
        let gatsby = book("The Great Gatsby", 1099);

        assert_eq!(cart.add(&gatsby, 0), Err(CommerceError::InvalidQuantity(0)));
        assert_eq!(cart.add(&gatsby, -3), Err(CommerceError::InvalidQuantity(-3)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_rejects_other_currency() {
        let mut cart = Cart::default();
        let euro_book = Book::new("Faust", "Drama", Money::new(900, Currency::EUR), "");
        assert!(matches!(
            cart.add(&euro_book, 1),
            Err(CommerceError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn test_quantity_limit() {
        let mut cart = Cart::default();
        let gatsby = book("The Great Gatsby", 1099);
        cart.add(&gatsby, MAX_QUANTITY_PER_LINE).unwrap();

        let result = cart.add(&gatsby, 1);
        assert!(matches!(result, Err(CommerceError::QuantityExceedsLimit(..))));
        assert_eq!(cart.total_item_count(), MAX_QUANTITY_PER_LINE);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::default();
        cart.add(&book("1984", 899), 1).unwrap();

        assert!(!cart.remove("Dune"));
        assert_eq!(cart.line_count(), 1);
        assert!(cart.remove("1984"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::default();
        cart.add(&book("1984", 899), 1).unwrap();

        assert!(cart.update_quantity("1984", 5).unwrap());
        assert_eq!(cart.total_item_count(), 5);
        assert!(!cart.update_quantity("Dune", 5).unwrap());
    }

    #[test]
    fn test_update_to_zero_equals_remove() {
        let mut updated = Cart::default();
        updated.add(&book("1984", 899), 2).unwrap();
        updated.add(&book("Moby Dick", 1249), 1).unwrap();
        let mut removed = updated.clone();

        updated.update_quantity("1984", 0).unwrap();
        removed.remove("1984");

        assert_eq!(updated, removed);
    }

    #[test]
    fn test_deduct_keeps_lines_added_later() {
        let catalog = Catalog::demo();
        let mut cart = Cart::new(Currency::USD);
        cart.add(catalog.get("1984").unwrap(), 2).unwrap();
        let ordered = cart.snapshot();

        cart.add(catalog.get("1984").unwrap(), 1).unwrap();
        cart.add(catalog.get("Moby Dick").unwrap(), 3).unwrap();
        cart.deduct(&ordered);

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.line("1984").unwrap().quantity, 1);
        assert_eq!(cart.line("Moby Dick").unwrap().quantity, 3);

        cart.deduct(&cart.snapshot());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_deduct_drops_lines_reduced_meanwhile() {
        let catalog = Catalog::demo();
        let mut cart = Cart::new(Currency::USD);
        cart.add(catalog.get("1984").unwrap(), 2).unwrap();
        let ordered = cart.snapshot();

        cart.update_quantity("1984", 1).unwrap();
        cart.deduct(&ordered);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_price() {
        let catalog = Catalog::demo();
        let mut cart = Cart::default();
        cart.add(catalog.get("The Great Gatsby").unwrap(), 2).unwrap();
        cart.add(catalog.get("1984").unwrap(), 1).unwrap();

        assert_eq!(cart.total_price().unwrap().amount_cents, 3097);
        assert_eq!(cart.total_item_count(), 3);
    }

    #[test]
    fn test_large_quantity_total() {
        let mut cart = Cart::default();
        cart.add(&book("Performance Test Book", 1000), 10_000).unwrap();
        assert_eq!(cart.total_price().unwrap().amount_cents, 10_000_000);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut cart = Cart::default();
        cart.add(&book("1984", 899), 1).unwrap();
        let snapshot = cart.snapshot();

        cart.update_quantity("1984", 7).unwrap();
        cart.clear();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].quantity, 1);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("3"), Ok(3));
        assert_eq!(parse_quantity(" 2 "), Ok(2));
        assert_eq!(parse_quantity("0"), Err(CommerceError::InvalidQuantity(0)));
        assert_eq!(
            parse_quantity("two"),
            Err(CommerceError::MalformedQuantity("two".to_string()))
        );
        assert_eq!(parse_quantity_update("-1"), Ok(-1));
        assert!(parse_quantity_update("").is_err());
    }

    proptest! {
        #[test]
        fn prop_total_is_order_independent(
            lines in proptest::collection::vec((0i64..100_000, 1i64..50), 1..8)
        ) {
            let books: Vec<(Book, i64)> = lines
                .iter()
                .enumerate()
                .map(|(i, (cents, qty))| (book(&format!("Book {i}"), *cents), *qty))
                .collect();

            let mut forward = Cart::default();
            for (b, q) in &books {
                forward.add(b, *q).unwrap();
            }
            let mut backward = Cart::default();
            for (b, q) in books.iter().rev() {
                backward.add(b, *q).unwrap();
            }

            let expected: i64 = books.iter().map(|(b, q)| b.price.amount_cents * q).sum();
            prop_assert_eq!(forward.total_price().unwrap().amount_cents, expected);
            prop_assert_eq!(backward.total_price().unwrap().amount_cents, expected);
        }

        #[test]
        fn prop_add_then_remove_restores_cart(
            existing in proptest::collection::vec(1i64..20, 0..5),
            quantity in 1i64..100,
        ) {
            let mut cart = Cart::default();
            for (i, q) in existing.iter().enumerate() {
                cart.add(&book(&format!("Book {i}"), 500), *q).unwrap();
            }
            let before = cart.clone();

            cart.add(&book("Fresh Title", 799), quantity).unwrap();
            cart.remove("Fresh Title");

            prop_assert_eq!(cart, before);
        }
    }
}
