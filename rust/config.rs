use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

pub const DEFAULT_SESSION_PATH: &str = "./portal-session.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the portal API.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    /// Base used for `/files/view` links. Falls back to `api_url`.
    pub file_base_url: Url,
    pub session_path: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(api_url: &str) -> Result<Self> {
        let api_url = parse_base(api_url).context("PORTAL_API_URL is not a valid URL")?;
        Ok(Self {
            file_base_url: api_url.clone(),
            api_url,
            session_path: DEFAULT_SESSION_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// Parses a base URL and guarantees a trailing slash so relative joins keep
/// any path prefix such as `/api`.
pub fn parse_base(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Ok(Url::parse(&with_slash)?)
}
