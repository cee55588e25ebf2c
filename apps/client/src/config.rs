use anyhow::{Context, Result};

/// Fallback optimization service for local development.
pub const DEFAULT_OPTIMIZER_API_URL: &str = "http://localhost:8000";

/// Application configuration loaded from environment variables.
/// Every variable has a default, so an empty environment runs against a local backend.
#[derive(Debug, Clone)]
pub struct Config {
    pub optimizer_api_url: String,
    pub optimizer_timeout_secs: u64,
    pub clipboard_enabled: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            optimizer_api_url: lookup("OPTIMIZER_API_URL")
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_OPTIMIZER_API_URL.to_string()),
            optimizer_timeout_secs: lookup("OPTIMIZER_TIMEOUT_SECS")
                .unwrap_or_else(|| "120".to_string())
                .parse::<u64>()
                .context("OPTIMIZER_TIMEOUT_SECS must be a whole number of seconds")?,
            clipboard_enabled: lookup("CLIPBOARD_ENABLED")
                .unwrap_or_else(|| "true".to_string())
                .parse::<bool>()
                .context("CLIPBOARD_ENABLED must be 'true' or 'false'")?,
            port: lookup("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
