//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing a transaction reference where an order number is expected.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs with a per-type generator.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $generator:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random ID.
            pub fn generate() -> Self {
                Self($generator())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Short order token shown to customers, e.g. `"3FA9C01B"`.
    OrderId,
    generate_order_token
);

define_id!(
    /// Gateway reference for an approved payment, e.g. `"TXN482913"`.
    TransactionId,
    generate_transaction_ref
);

/// Length of an order token in characters.
pub const ORDER_ID_LEN: usize = 8;

/// Eight uppercase hex characters.
fn generate_order_token() -> String {
    let value: u32 = rand::thread_rng().gen();
    format!("{:08X}", value)
}

/// `TXN` followed by six digits.
fn generate_transaction_ref() -> String {
    let value: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    format!("TXN{}", value)
}
