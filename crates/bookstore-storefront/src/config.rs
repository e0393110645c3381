//! Store configuration.

use crate::StoreError;
use bookstore_auth::PasswordHasher;
use bookstore_commerce::cart::{Discount, DiscountTable};
use bookstore_commerce::catalog::{Book, Catalog};
use bookstore_commerce::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Store configuration file.
///
/// Omitted sections fall back to the demo shelf, the standard discount
/// codes and Argon2's default costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Currency for every price and cart.
    #[serde(default)]
    pub currency: Currency,

    /// Create demo@bookstore.com at startup.
    #[serde(default = "default_true")]
    pub seed_demo_account: bool,

    /// Sessions idle this long are dropped when new ones open.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u32,

    /// Password hashing costs.
    #[serde(default)]
    pub hashing: HashingConfig,

    /// Books on sale; the demo shelf when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub books: Option<Vec<BookConfig>>,

    /// Accepted discount codes; SAVE10 and WELCOME20 when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Vec<DiscountConfig>>,
}

fn default_true() -> bool {
    true
}

fn default_session_idle_minutes() -> u32 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            seed_demo_account: true,
            session_idle_minutes: default_session_idle_minutes(),
            hashing: HashingConfig::default(),
            books: None,
            discounts: None,
        }
    }
}

impl StoreConfig {
    /// Load config from a file. `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let parsed = if is_json(path) {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };
        parsed.map_err(|e| match e {
            StoreError::Config(msg) => StoreError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, StoreError> {
        toml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, StoreError> {
        serde_json::from_str(content).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Save config to a file, format chosen by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))?
        } else {
            self.to_toml_string()?
        };
        std::fs::write(path, content).map_err(|e| {
            StoreError::Config(format!("failed to write {}: {}", path.display(), e))
        })
    }

    pub fn to_toml_string(&self) -> Result<String, StoreError> {
        toml::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// A config with every section spelled out, for `config init`.
    pub fn example() -> Self {
        Self {
            books: Some(BookConfig::demo_shelf()),
            discounts: Some(
                DiscountTable::standard()
                    .discounts()
                    .iter()
                    .map(DiscountConfig::from)
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Build the catalog, priced in the configured currency.
    pub fn catalog(&self) -> Result<Catalog, StoreError> {
        let books = match &self.books {
            Some(books) => books.clone(),
            None => BookConfig::demo_shelf(),
        };
        let books = books
            .into_iter()
            .map(|b| b.into_book(self.currency))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Catalog::new(books)?)
    }

    /// Build the discount table.
    pub fn discount_table(&self) -> Result<DiscountTable, StoreError> {
        match &self.discounts {
            None => Ok(DiscountTable::standard()),
            Some(discounts) => Ok(DiscountTable::new(
                discounts.iter().map(DiscountConfig::to_discount).collect(),
            )?),
        }
    }

    pub fn hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.hashing.memory_kib, self.hashing.iterations)
    }

    /// How long a session may sit unused.
    pub fn session_idle(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.session_idle_minutes))
    }

    /// Check every section without starting a store.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.session_idle_minutes == 0 {
            return Err(StoreError::Config(
                "session_idle_minutes must be at least 1".to_string(),
            ));
        }
        self.catalog()?;
        self.discount_table()?;
        self.hashing.validate()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// One book in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookConfig {
    pub title: String,
    pub category: String,
    /// Price in major units, e.g. `10.99`.
    pub price: f64,
    #[serde(default)]
    pub image: String,
}

impl BookConfig {
    /// The four-book demo shelf.
    pub fn demo_shelf() -> Vec<BookConfig> {
        Catalog::demo()
            .books()
            .iter()
            .map(|b| BookConfig {
                title: b.title.clone(),
                category: b.category.clone(),
                price: b.price.to_decimal(),
                image: b.image.clone(),
            })
            .collect()
    }

    fn into_book(self, currency: Currency) -> Result<Book, StoreError> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(StoreError::Config(format!(
                "book {:?} has an invalid price: {}",
                self.title, self.price
            )));
        }
        Ok(Book::new(
            self.title,
            self.category,
            Money::from_decimal(self.price, currency),
            self.image,
        ))
    }
}

/// One discount code in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountConfig {
    pub code: String,
    /// Shown when the code is applied.
    pub message: String,
    pub percent: f64,
}

impl DiscountConfig {
    fn to_discount(&self) -> Discount {
        Discount::percentage(self.code.trim(), self.message.clone(), self.percent)
    }
}

impl From<&Discount> for DiscountConfig {
    fn from(discount: &Discount) -> Self {
        Self {
            code: discount.code.clone(),
            message: discount.name.clone(),
            percent: discount.percent,
        }
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Number of passes.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

fn default_memory_kib() -> u32 {
    PasswordHasher::default().memory_kib
}

fn default_iterations() -> u32 {
    PasswordHasher::default().iterations
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
        }
    }
}

impl HashingConfig {
    /// Smallest memory cost Argon2 accepts with one lane.
    pub const MIN_MEMORY_KIB: u32 = 8;

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.memory_kib < Self::MIN_MEMORY_KIB {
            return Err(StoreError::Config(format!(
                "hashing.memory_kib must be at least {}",
                Self::MIN_MEMORY_KIB
            )));
        }
        if self.iterations == 0 {
            return Err(StoreError::Config(
                "hashing.iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
