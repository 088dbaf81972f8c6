//! Configuration management for the Replenishment Dashboard
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RPL_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{MissingOfferPolicy, Policy, PolicyError};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Hosted table store configuration
    pub store: StoreConfig,

    /// Table names read for each run
    pub tables: TablesConfig,

    /// Replenishment rules
    pub policy: PolicyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct StoreConfig {
    /// Base URL of the PostgREST-style store
    #[validate(url)]
    pub url: String,

    /// API key sent as `apikey` and bearer token
    #[validate(length(min = 1))]
    pub api_key: String,

    /// Rows requested per page
    #[validate(range(min = 1, max = 10000))]
    pub page_size: usize,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,

    /// Column that orders paged reads; empty sends no `order`
    #[serde(default)]
    pub order_by: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TablesConfig {
    pub sales: String,
    pub offers: String,
    pub products: String,

    /// Open purchase orders; unset disables the backlog lookup
    #[serde(default)]
    pub purchase_orders: Option<String>,

    /// Extra stock tables shown next to each line, as `label = "table"`
    #[serde(default)]
    pub overlays: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    /// Preset name (standard, round_up_top_tier, classic)
    pub preset: String,

    #[serde(default)]
    pub excluded_channels: Vec<String>,

    #[serde(default)]
    pub missing_offer: MissingOfferPolicy,

    /// Overrides the preset's recent-order window; 0 disables it
    #[serde(default)]
    pub recent_order_window_days: Option<u32>,
}

impl PolicyConfig {
    /// Resolve the preset and apply the configured overrides
    pub fn build(&self) -> Result<Policy, PolicyError> {
        let mut policy = Policy::preset(&self.preset)?
            .with_excluded_channels(self.excluded_channels.clone())
            .with_missing_offer(self.missing_offer);
        if let Some(days) = self.recent_order_window_days {
            policy = policy.with_recent_order_window((days > 0).then_some(days));
        }
        policy.validate()?;
        Ok(policy)
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("RPL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.page_size", 1000)?
            .set_default("store.timeout_secs", 30)?
            .set_default("store.order_by", "id")?
            .set_default("tables.sales", "sales")?
            .set_default("tables.offers", "purchase_data")?
            .set_default("tables.products", "products")?
            .set_default("policy.preset", Policy::STANDARD)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RPL_ prefix)
            .add_source(
                Environment::with_prefix("RPL")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("policy.excluded_channels")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config
            .store
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid store settings: {}", e)))?;
        Ok(config)
    }
}
