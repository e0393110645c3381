//! Configuration management commands.

use std::path::Path;

use anyhow::{bail, Result};
use bookstore_storefront::StoreConfig;

use super::{user_error, ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force, path } => init_config(&path, force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(none, using defaults)"),
    }

    let config = &ctx.config;
    ctx.output.kv("currency", config.currency.code());
    ctx.output
        .kv("seed_demo_account", &config.seed_demo_account.to_string());
    ctx.output
        .kv("session_idle_minutes", &config.session_idle_minutes.to_string());
    ctx.output
        .kv("hashing.memory_kib", &config.hashing.memory_kib.to_string());
    ctx.output
        .kv("hashing.iterations", &config.hashing.iterations.to_string());

    ctx.output.info("");
    match &config.books {
        Some(books) => ctx.output.info(&format!("[[books]] {} configured", books.len())),
        None => ctx.output.info("[[books]] demo shelf"),
    }
    if let Ok(catalog) = config.catalog() {
        for book in catalog.books() {
            ctx.output
                .list_item(&format!("{} ({}) {}", book.title, book.category, book.price.display()));
        }
    }

    ctx.output.info("");
    match &config.discounts {
        Some(discounts) => ctx
            .output
            .info(&format!("[[discounts]] {} configured", discounts.len())),
        None => ctx.output.info("[[discounts]] standard codes"),
    }
    if let Ok(table) = config.discount_table() {
        for discount in table.discounts() {
            ctx.output
                .list_item(&format!("{} {}% off", discount.code, discount.percent));
        }
    }

    Ok(())
}

fn init_config(path: &Path, force: bool, ctx: &Context) -> Result<()> {
    let config_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        ctx.cwd.join(path)
    };

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    StoreConfig::example()
        .save(&config_path)
        .map_err(user_error)?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut warnings: Vec<String> = Vec::new();

    if let Err(e) = ctx.config.validate() {
        bail!("Configuration is invalid: {}", e.user_message());
    }

    if ctx.config_path.is_none() {
        warnings.push("no config file found, defaults are in use".to_string());
    }
    if ctx.config.books.as_ref().is_some_and(|b| b.is_empty()) {
        warnings.push("books is empty, nothing can be sold".to_string());
    }
    if ctx.config.discounts.as_ref().is_some_and(|d| d.is_empty()) {
        warnings.push("discounts is empty, every code will be rejected".to_string());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }

    Ok(())
}
