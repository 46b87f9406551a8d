//! Configuration module
//!
//! Settings for the backend client and the auto-save countdown, read from
//! the environment (and a `.env` file when present).

use std::env;
use std::time::Duration;

const API_URL: &str = "http://localhost:8080";
const API_VERSION: &str = "v1";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const AUTOSAVE_INTERVAL_SECS: u32 = 60;
const AUTOSAVE_TICK_MS: u64 = 1000;

/// Backend connection settings
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
    pub token: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Base URL joined with the versioned API prefix, e.g. `http://host/api/v1`
    pub fn api_base(&self) -> String {
        format!(
            "{}/api/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

/// Auto-save countdown settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoSaveConfig {
    /// Number of ticks between the last change and the save.
    pub interval_secs: u32,
    /// Wall-clock length of one tick.
    pub tick: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            interval_secs: AUTOSAVE_INTERVAL_SECS,
            tick: Duration::from_millis(AUTOSAVE_TICK_MS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub client: ClientConfig,
    pub autosave: AutoSaveConfig,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let token = lookup("RELIEF_API_TOKEN")
            .ok_or_else(|| anyhow::anyhow!("RELIEF_API_TOKEN must be set"))?;

        let request_timeout_secs = match lookup("RELIEF_REQUEST_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("RELIEF_REQUEST_TIMEOUT_SECS must be a valid number"))?,
            None => REQUEST_TIMEOUT_SECS,
        };

        let interval_secs = match lookup("RELIEF_AUTOSAVE_INTERVAL_SECS") {
            Some(value) => value.parse::<u32>().map_err(|_| {
                anyhow::anyhow!("RELIEF_AUTOSAVE_INTERVAL_SECS must be a valid number")
            })?,
            None => AUTOSAVE_INTERVAL_SECS,
        };

        let tick_ms = match lookup("RELIEF_AUTOSAVE_TICK_MS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("RELIEF_AUTOSAVE_TICK_MS must be a valid number"))?,
            None => AUTOSAVE_TICK_MS,
        };

        let config = Config {
            client: ClientConfig {
                base_url: lookup("RELIEF_API_URL").unwrap_or_else(|| API_URL.to_string()),
                api_version: lookup("RELIEF_API_VERSION")
                    .unwrap_or_else(|| API_VERSION.to_string()),
                token,
                request_timeout: Duration::from_secs(request_timeout_secs),
            },
            autosave: AutoSaveConfig {
                interval_secs,
                tick: Duration::from_millis(tick_ms),
            },
            environment,
        };

        tracing::debug!(
            base_url = %config.client.base_url,
            api_version = %config.client.api_version,
            autosave_interval_secs = config.autosave.interval_secs,
            environment = %config.environment,
            "Loaded configuration"
        );

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.client.token.trim().is_empty() {
            return Err(anyhow::anyhow!("RELIEF_API_TOKEN cannot be empty"));
        }

        let url = self.client.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "RELIEF_API_URL must be an http:// or https:// URL"
            ));
        }

        if self.autosave.interval_secs == 0 {
            return Err(anyhow::anyhow!(
                "RELIEF_AUTOSAVE_INTERVAL_SECS must be greater than zero"
            ));
        }

        if self.autosave.tick.is_zero() {
            return Err(anyhow::anyhow!(
                "RELIEF_AUTOSAVE_TICK_MS must be greater than zero"
            ));
        }

        Ok(())
    }
}
