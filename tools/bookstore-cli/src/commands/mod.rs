//! CLI command implementations.

pub mod catalog;
pub mod config;
pub mod demo;
pub mod quote;
pub mod shop;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use bookstore_storefront::StoreError;
use clap::{Args, Subcommand};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only list books in this category.
    #[arg(short = 'g', long)]
    pub category: Option<String>,
}

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Cart line as TITLE=QTY. Repeatable.
    #[arg(short, long = "item", value_name = "TITLE=QTY", required = true)]
    pub items: Vec<String>,

    /// Discount code to apply.
    #[arg(short, long)]
    pub discount: Option<String>,
}

/// Arguments for the demo command.
#[derive(Args)]
pub struct DemoArgs {
    /// Card number to pay with. Numbers ending in 1111 are declined.
    #[arg(long, default_value = "4242424242424242")]
    pub card: String,

    /// Pay with PayPal instead of a card.
    #[arg(long, conflicts_with = "card")]
    pub paypal: bool,

    /// Discount code to apply, e.g. SAVE10.
    #[arg(short, long)]
    pub discount: Option<String>,
}

/// Arguments for the shop command.
#[derive(Args)]
pub struct ShopArgs {
    /// Log in as the demo account before shopping.
    #[arg(long)]
    pub demo_login: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,

        /// File to write; `.json` selects JSON.
        #[arg(short, long, default_value = "bookstore.toml")]
        path: PathBuf,
    },
    /// Validate the config file.
    Validate,
}

/// Split a `TITLE=QTY` argument.
///
/// The last `=` separates the quantity so titles may contain `=`.
pub fn parse_item(arg: &str) -> Result<(String, String)> {
    let Some((title, quantity)) = arg.rsplit_once('=') else {
        bail!("Expected TITLE=QTY, got '{}'", arg);
    };
    let title = title.trim();
    if title.is_empty() {
        bail!("Missing title in '{}'", arg);
    }
    Ok((title.to_string(), quantity.trim().to_string()))
}

/// Turn a store error into the message a shopper would see.
pub fn user_error(err: StoreError) -> anyhow::Error {
    anyhow!(err.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(
            parse_item("The Great Gatsby=2").unwrap(),
            ("The Great Gatsby".to_string(), "2".to_string())
        );
        assert_eq!(
            parse_item(" 1984 = 3 ").unwrap(),
            ("1984".to_string(), "3".to_string())
        );
        assert_eq!(parse_item("A=B=1").unwrap().0, "A=B");
    }

    #[test]
    fn test_demo_discount_defaults_to_none() {
        #[derive(clap::Parser)]
        struct Demo {
            #[command(flatten)]
            args: DemoArgs,
        }

        let demo = <Demo as clap::Parser>::parse_from(["demo"]);
        assert_eq!(demo.args.discount, None);
        assert_eq!(demo.args.card, "4242424242424242");

        let demo = <Demo as clap::Parser>::parse_from(["demo", "--discount", "SAVE10"]);
        assert_eq!(demo.args.discount.as_deref(), Some("SAVE10"));
    }

    #[test]
    fn test_parse_item_rejects_malformed() {
        assert!(parse_item("Moby Dick").is_err());
        assert!(parse_item("=2").is_err());
    }
}
