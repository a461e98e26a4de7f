//! Environment-driven configuration.
//!
//! `.env` loading happens in `main` via dotenvy before this is read, so a
//! checked-in env file and real environment variables behave the same.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_ADDR: &str = "127.0.0.1:8700";
const DEFAULT_DB: &str = "evermed.db";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBED_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("EVERMED_ADDR is not a valid socket address: {0}")]
    InvalidAddr(String),

    #[error("EVERMED_EMBED_TIMEOUT_SECS is not a valid number: {0}")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    /// Base64 pepper for passcode hashing and audit IP hashing. Optional so
    /// the chat surface still works on an unconfigured instance; share-pack
    /// creation fails loudly without it.
    pub share_link_pepper: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub embed_model: String,
    pub embed_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr_raw = env_or("EVERMED_ADDR", DEFAULT_ADDR);
        let addr = addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr_raw))?;

        let timeout_raw = env_or(
            "EVERMED_EMBED_TIMEOUT_SECS",
            &DEFAULT_EMBED_TIMEOUT_SECS.to_string(),
        );
        let timeout_secs: u64 = timeout_raw
            .parse()
            .map_err(|_| ConfigError::InvalidTimeout(timeout_raw))?;

        Ok(Self {
            addr,
            db_path: PathBuf::from(env_or("EVERMED_DB", DEFAULT_DB)),
            share_link_pepper: env_opt("SHARE_LINK_PEPPER"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_base_url: env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            embed_model: env_or("OPENAI_MODEL_EMBED", DEFAULT_EMBED_MODEL),
            embed_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}
