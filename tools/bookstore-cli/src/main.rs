//! Bookstore CLI - a terminal storefront.
//!
//! Commands:
//! - `bookstore catalog` - List books
//! - `bookstore quote` - Price a cart without checking out
//! - `bookstore demo` - Scripted end-to-end purchase
//! - `bookstore shop` - Interactive shopping session
//! - `bookstore config` - Manage configuration

mod commands;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CatalogArgs, ConfigArgs, DemoArgs, QuoteArgs, ShopArgs};

/// Bookstore CLI - browse, price and buy books from the terminal
#[derive(Parser)]
#[command(name = "bookstore")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the books on sale
    Catalog(CatalogArgs),

    /// Price a cart, optionally with a discount code
    Quote(QuoteArgs),

    /// Run a scripted purchase from registration to order history
    Demo(DemoArgs),

    /// Shop interactively
    Shop(ShopArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose, cli.json)?;

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx),
        Commands::Quote(args) => commands::quote::run(args, &ctx),
        Commands::Demo(args) => commands::demo::run(args, &ctx),
        Commands::Shop(args) => commands::shop::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
