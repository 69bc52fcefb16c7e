//! Settings of the `walletly` binary.
//!
//! Read from `config/walletly.toml` (or the file given with `--config`), then
//! overridden by `WALLETLY_*` environment variables, nested keys joined with
//! `__` (e.g. `WALLETLY_APP__LEVEL=debug`, `WALLETLY_DATABASE__SQLITE=x.db`).
//!
//! ```toml
//! [app]
//! level = "info"
//! timezone = "Europe/Rome"
//!
//! [database]
//! sqlite = "walletly.db"
//!
//! [engine]
//! max_conflict_retries = 3
//! cascade_batch_size = 100
//!
//! [upload]
//! url = "https://api.cloudinary.com/v1_1/demo/image/upload"
//! preset = "walletly"
//! ```
use config::{Config, ConfigError, Environment, File};
use engine::EngineOptions;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/walletly.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// IANA name used for dates given on the command line and for stats.
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("walletly.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => String::from("sqlite::memory:"),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Upload {
    pub url: String,
    pub preset: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub engine: EngineOptions,
    pub upload: Option<Upload>,
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("WALLETLY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
