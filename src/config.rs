// ⚙️ Configuration - Everything environment-specific comes from the process environment
//
// `.env` files are honored (dotenvy). Connection details never live in source.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, SeedError};
use crate::logging::Profile;

pub const ENV_DB_PATH: &str = "CATEGORIES_DB_PATH";
pub const ENV_BIND_ADDR: &str = "CATEGORIES_BIND_ADDR";
pub const ENV_BASE_URL: &str = "CATEGORIES_BASE_URL";
pub const ENV_BUSY_TIMEOUT: &str = "CATEGORIES_BUSY_TIMEOUT_SECS";
pub const ENV_LOG_FORMAT: &str = "CATEGORIES_LOG_FORMAT";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind_addr: String,
    pub base_url: String,
    pub busy_timeout: Duration,
    pub log_profile: Profile,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("categories.db"),
            bind_addr: "0.0.0.0:5000".to_string(),
            base_url: "http://localhost:5000".to_string(),
            busy_timeout: Duration::from_secs(10),
            log_profile: Profile::Development,
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(addr) = lookup(ENV_BIND_ADDR).filter(|v| !v.trim().is_empty()) {
            config.bind_addr = addr;
        }

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(secs) = lookup(ENV_BUSY_TIMEOUT) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                SeedError::Config(format!("{} must be a whole number of seconds, got '{}'", ENV_BUSY_TIMEOUT, secs))
            })?;
            config.busy_timeout = Duration::from_secs(secs);
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.log_profile = match format.trim().to_lowercase().as_str() {
                "" | "pretty" => Profile::Development,
                "json" => Profile::Production,
                other => {
                    return Err(SeedError::Config(format!(
                        "{} must be 'pretty' or 'json', got '{}'",
                        ENV_LOG_FORMAT, other
                    )))
                }
            };
        }

        Ok(config)
    }
}
