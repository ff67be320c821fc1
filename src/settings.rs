use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "alpha_missions";
const ENV_PREFIX: &str = "MISSIONS";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Forum root, with trailing slash.
    pub base_url: String,
    pub forum_id: u32,
    /// phpBB `start=` step between listing pages.
    pub topics_per_page: u32,
    /// Published CSV export of the roster spreadsheet.
    pub roster_url: Option<String>,
    pub user_agent: String,
    /// Max post bodies fetched at once within a page.
    pub concurrency: usize,
    pub timeout_secs: u64,
}

impl Settings {
    /// Defaults, then `alpha_missions.toml` if present, then `MISSIONS_*` env vars.
    pub fn load() -> Result<Self> {
        Self::builder()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("base_url", "https://foro.squadalpha.es/")?
            .set_default("forum_id", 18_i64)?
            .set_default("topics_per_page", 25_i64)?
            .set_default("user_agent", "Mozilla/5.0")?
            .set_default("concurrency", 8_i64)?
            .set_default("timeout_secs", 20_i64)
    }
}
