// @file: kline_fetcher/src/utils/config.rs
// @description: Layered configuration (defaults, optional file, APP_* environment).
// @author: LAS.

use std::time::Duration;
use serde::Deserialize;
use config::{Config, ConfigError, File, Environment};
use crate::core::errors::KlineError;
use crate::core::models::{Interval, KlineQuery, MarketType};

//
// TYPE DEFINITIONS
//

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,

    // Endpoint
    // Empty base_url means the market's public host.
    pub base_url: String,
    pub market_type: MarketType,
    pub request_timeout_ms: u64,

    // Query Defaults
    pub default_symbol: String,
    pub default_interval: String,
    pub default_limit: i32,
}

impl AppConfig {
    //
    // PUBLIC INTERFACE
    //

    pub fn load() -> Result<Self, KlineError> {
        AppConfig::load_with(Environment::with_prefix("APP"))
    }

    /// Same layering as `load`, with the environment source supplied by the caller.
    pub fn load_with(environment: Environment) -> Result<Self, KlineError> {
        let builder = AppConfig::with_defaults()?
            // File & Env Overrides
            .add_source(File::with_name("config").required(false))
            .add_source(environment);

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn defaults() -> Result<Self, KlineError> {
        Ok(AppConfig::with_defaults()?.build()?.try_deserialize()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn default_query(&self) -> Result<KlineQuery, KlineError> {
        let interval: Interval = self.default_interval.parse()?;
        Ok(KlineQuery::new(self.default_symbol.clone(), interval).with_limit(self.default_limit))
    }


    //
    // INTERNAL HELPERS
    //

    fn with_defaults() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("log_level", "info")?

            // Binance Endpoint
            .set_default("base_url", "")?
            .set_default("market_type", "SPOT")?
            .set_default("request_timeout_ms", 10_000)?

            // Query Defaults
            .set_default("default_symbol", "BTCUSDT")?
            .set_default("default_interval", "1h")?
            .set_default("default_limit", 500)
    }
}
