//! Configuration for the `jsonviews` binary
//!
//! Sources, lowest precedence first: built-in defaults, `jsonviews.toml` in the working
//! directory (or the file given with `--config`), then `JSONVIEWS__*` environment
//! variables such as `JSONVIEWS__LOGGING__LEVEL=debug`. A `.env` file is read first.

use jsonviews_engine::CompileOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub compile: CompileOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// JSON lines instead of human-readable output.
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// File backing the design-document store.
    pub path: PathBuf,
}

impl Config {
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("jsonviews").required(false),
        };

        Self::builder()?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("JSONVIEWS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("store.path", "jsonviews-store.json")?
            .set_default("compile.legacy_minute", false)
    }

    pub fn validate(&self) -> Result<(), String> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            ));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err("store.path must not be empty".to_string());
        }
        Ok(())
    }
}
