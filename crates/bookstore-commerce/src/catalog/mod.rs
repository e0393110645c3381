//! Catalog module.
//!
//! The catalog is read-only reference data built once at startup.

mod book;

pub use book::Book;

use crate::error::CommerceError;
use crate::money::{Currency, Money};

/// An immutable list of books keyed by title.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate titles and negative prices.
    pub fn new(books: Vec<Book>) -> Result<Self, CommerceError> {
        for (i, book) in books.iter().enumerate() {
            if book.title.trim().is_empty() {
                return Err(CommerceError::Validation(
                    "book title must not be empty".to_string(),
                ));
            }
            if book.price.is_negative() {
                return Err(CommerceError::Validation(format!(
                    "price of {:?} must not be negative",
                    book.title
                )));
            }
            if books.iter().skip(i + 1).any(|b| b.title == book.title) {
                return Err(CommerceError::Validation(format!(
                    "duplicate title in catalog: {:?}",
                    book.title
                )));
            }
        }
        Ok(Self { books })
    }

    /// The four-book demo shelf.
    pub fn demo() -> Self {
        let usd = |amount: f64| Money::from_decimal(amount, Currency::USD);
        Self {
            books: vec![
                Book::new(
                    "The Great Gatsby",
                    "Fiction",
                    usd(10.99),
                    "/images/books/the_great_gatsby.jpg",
                ),
                Book::new("1984", "Dystopia", usd(8.99), "/images/books/1984.jpg"),
                Book::new(
                    "I Ching",
                    "Traditional",
                    usd(18.99),
                    "/images/books/I-Ching.jpg",
                ),
                Book::new(
                    "Moby Dick",
                    "Adventure",
                    usd(12.49),
                    "/images/books/moby_dick.jpg",
                ),
            ],
        }
    }

    /// Look up a book by exact title.
    pub fn find(&self, title: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.title == title)
    }

    /// Look up a book by exact title, failing with `ItemNotFound`.
    pub fn get(&self, title: &str) -> Result<&Book, CommerceError> {
        self.find(title)
            .ok_or_else(|| CommerceError::ItemNotFound(title.to_string()))
    }

    /// All books in display order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for book in &self.books {
            if !categories.contains(&book.category.as_str()) {
                categories.push(&book.category);
            }
        }
        categories
    }

    /// Books in a category (case-insensitive).
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Book> + 'a {
        self.books
            .iter()
            .filter(move |b| b.category.eq_ignore_ascii_case(category))
    }

    /// Number of books.
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check if the catalog has no books.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::demo()
    }
}
