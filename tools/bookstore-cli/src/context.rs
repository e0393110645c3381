//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use bookstore_commerce::notification::OutboxNotifier;
use bookstore_storefront::{StoreConfig, Storefront};

use crate::output::Output;

/// File names searched for, in order, from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["bookstore.toml", ".bookstore.toml", "bookstore.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Store configuration.
    pub config: StoreConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(resolve(&cwd, path)),
            None => find_config(&cwd),
        };
        let config = match &config_path {
            Some(path) => {
                output.debug(&format!("Using config: {}", path.display()));
                StoreConfig::load(path)?
            }
            None => StoreConfig::default(),
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Start a store from the loaded config.
    ///
    /// Confirmations go to the returned outbox so commands can print them.
    pub fn open_store(&self) -> Result<(Storefront, Arc<OutboxNotifier>)> {
        let outbox = Arc::new(OutboxNotifier::new());
        let store = Storefront::new(&self.config)
            .context("Failed to start the store")?
            .with_notifier(outbox.clone());
        Ok((store, outbox))
    }
}

/// Find a config file in the directory tree.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
