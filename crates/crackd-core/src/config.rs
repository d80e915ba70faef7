//! Configuration module
//!
//! Environment-based configuration for the pipeline and the caption store,
//! with defaults suitable for the hosted deployment.

use std::env;

const DEFAULT_API_URL: &str = "https://api.almostcrackd.ai";
const HTTP_TIMEOUT_SECS: u64 = 60;
const REGISTER_MAX_ATTEMPTS: u32 = 4;
const REGISTER_BACKOFF_MS: u64 = 600;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the caption pipeline API.
    pub api_base_url: String,
    /// HTTP client timeout, seconds.
    pub http_timeout_secs: u64,
    /// Maximum attempts for the image-registration step.
    pub register_max_attempts: u32,
    /// Linear backoff unit between registration attempts, milliseconds.
    pub register_backoff_ms: u64,
    /// Base URL of the row store (caption listing and votes).
    pub store_url: Option<String>,
    /// API key for the row store.
    pub store_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = Config {
            api_base_url: env::var("CRACKD_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            http_timeout_secs: env::var("CRACKD_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
            register_max_attempts: env::var("CRACKD_REGISTER_MAX_ATTEMPTS")
                .unwrap_or_else(|_| REGISTER_MAX_ATTEMPTS.to_string())
                .parse()
                .unwrap_or(REGISTER_MAX_ATTEMPTS),
            register_backoff_ms: env::var("CRACKD_REGISTER_BACKOFF_MS")
                .unwrap_or_else(|_| REGISTER_BACKOFF_MS.to_string())
                .parse()
                .unwrap_or(REGISTER_BACKOFF_MS),
            store_url: env::var("CRACKD_STORE_URL").ok().filter(|s| !s.is_empty()),
            store_api_key: env::var("CRACKD_STORE_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "CRACKD_API_URL must be an http(s) URL, got {:?}",
                self.api_base_url
            ));
        }

        if self.register_max_attempts == 0 {
            return Err(anyhow::anyhow!(
                "CRACKD_REGISTER_MAX_ATTEMPTS must be at least 1"
            ));
        }

        if self.store_url.is_some() != self.store_api_key.is_some() {
            return Err(anyhow::anyhow!(
                "CRACKD_STORE_URL and CRACKD_STORE_API_KEY must be set together"
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_URL.to_string(),
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            register_max_attempts: REGISTER_MAX_ATTEMPTS,
            register_backoff_ms: REGISTER_BACKOFF_MS,
            store_url: None,
            store_api_key: None,
        }
    }
}
