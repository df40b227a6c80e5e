mod init;
mod mutate;
mod query;
mod schema;
mod serve;
mod utils;

pub use init::handle_init;
pub use mutate::handle_mutate;
pub use query::handle_query;
pub use schema::handle_schema;
pub use serve::{ServeOverrides, handle_serve};

use crate::config::BlogConfig;
use crate::store::Store;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Common context passed to command handlers that touch the store
pub struct CommandContext {
    pub config: BlogConfig,
    pub root: PathBuf,
    /// Data file given on the command line, taking precedence over the config
    pub data_file: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(config: BlogConfig, root: PathBuf) -> Self {
        Self {
            config,
            root,
            data_file: None,
        }
    }

    pub fn with_data_file(mut self, data_file: Option<PathBuf>) -> Self {
        self.data_file = data_file;
        self
    }

    /// Loads `config_path`, or the nearest blogql.toml above the working directory.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let (config, root) = match config_path {
            Some(path) => BlogConfig::load_file(path),
            None => BlogConfig::load(&std::env::current_dir()?),
        }
        .context("Failed to load blogql configuration")?;
        Ok(Self::new(config, root))
    }

    pub fn data_file(&self) -> Option<PathBuf> {
        self.data_file
            .clone()
            .or_else(|| self.config.data_file(&self.root))
    }

    pub fn open_store(&self) -> Result<Store> {
        let data_file = self.data_file();
        Store::open(data_file.clone()).with_context(|| match data_file {
            Some(path) => format!("Failed to open data file {}", path.display()),
            None => "Failed to open store".to_string(),
        })
    }
}
