//! Book types.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A purchasable book.
///
/// The title is the catalog key; two books with the same title cannot
/// coexist in one [`Catalog`](super::Catalog).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Title (unique within a catalog).
    pub title: String,
    /// Shelf category, e.g. "Fiction".
    pub category: String,
    /// Unit price.
    pub price: Money,
    /// Cover image reference.
    pub image: String,
}

impl Book {
    /// Create a new book.
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        price: Money,
        image: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            price,
            image: image.into(),
        }
    }
}
