use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_UPSTREAM_URL: &str = "https://economia.awesomeapi.com.br/json/last/USD-BRL";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/cotacao";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub database_path: String,
    pub upstream_url: String,
    /// Key of the quote object in the upstream response, e.g. `USDBRL`
    pub quote_key: String,
    pub upstream_timeout_ms: u64,
    pub store_timeout_ms: u64,
}

impl ServerConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "0.0.0.0:8080".to_string(),
            database_path: "exchange.db".to_string(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            quote_key: "USDBRL".to_string(),
            upstream_timeout_ms: 200,
            store_timeout_ms: 200,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub output_path: String,
    // Shorter than the server's worst case of two 200ms budgets
    pub timeout_ms: u64,
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            server_url: DEFAULT_SERVER_URL.to_string(),
            output_path: "cotacao.txt".to_string(),
            timeout_ms: 300,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Resolves the configuration for a process.
    ///
    /// An explicit path must exist and parse. Without one, the per-user
    /// config file is used when present, otherwise the built-in defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_path(path);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "cotacao", "cotacao")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
