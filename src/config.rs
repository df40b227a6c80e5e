use crate::error::{BlogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file searched for upward from the working directory.
pub const CONFIG_FILE_NAME: &str = "blogql.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP path that accepts GraphQL requests.
    #[serde(default = "default_path")]
    pub path: String,

    /// Serve GraphiQL on `GET <path>`.
    #[serde(default = "default_playground")]
    pub playground: bool,

    /// Where `serve` writes the schema SDL at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_output: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_path() -> String {
    "/".to_string()
}

fn default_playground() -> bool {
    true
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            path: default_path(),
            playground: default_playground(),
            schema_output: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// JSON snapshot file. Without one the store is in-memory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Bearer token required for mutations. Without one the API is open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl BlogConfig {
    /// Loads the nearest `blogql.toml` at or above `start_path`.
    ///
    /// Returns the config and the project root used to resolve relative
    /// paths. Without a config file the defaults apply and `start_path` is
    /// the root.
    pub fn load(start_path: &Path) -> Result<(Self, PathBuf)> {
        match Self::find_config_file(start_path) {
            Some(config_path) => Self::load_file(&config_path),
            None => Ok((Self::default(), start_path.to_path_buf())),
        }
    }

    pub fn load_file(config_path: &Path) -> Result<(Self, PathBuf)> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            BlogError::Config(format!("Cannot read {}: {}", config_path.display(), e))
        })?;
        let config: BlogConfig = toml::from_str(&content)?;
        config.validate()?;
        let project_root = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            Some(_) => PathBuf::from("."),
            None => {
                return Err(BlogError::Config(
                    "Config file has no parent directory".to_string(),
                ));
            }
        };
        Ok((config, project_root))
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path.to_path_buf();
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.server.path.starts_with('/') {
            return Err(BlogError::Config(format!(
                "server.path must start with '/', got '{}'",
                self.server.path
            )));
        }
        if self.auth.token.as_deref() == Some("") {
            return Err(BlogError::Config(
                "auth.token cannot be empty; remove it to disable authentication".to_string(),
            ));
        }
        Ok(())
    }

    pub fn data_file(&self, project_root: &Path) -> Option<PathBuf> {
        self.store.data_file.as_ref().map(|f| project_root.join(f))
    }

    pub fn schema_output(&self, project_root: &Path) -> Option<PathBuf> {
        self.server.schema_output.as_ref().map(|f| project_root.join(f))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self).map_err(|e| BlogError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
