use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

use subscribe_flow::DEFAULT_PAGE_SIZE;

/// Front-end configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: Option<String>,
    pub avatar_proxy_url: Option<String>,
    pub group_page_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `api_url` from the command line takes precedence over `SUBSCRIBE_API_URL`.
    pub fn from_env(api_url: Option<String>) -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let api_url = match api_url {
            Some(url) => url,
            None => env::var("SUBSCRIBE_API_URL").context("SUBSCRIBE_API_URL must be set")?,
        };

        let group_page_size = match env::var("GROUP_PAGE_SIZE") {
            Ok(raw) => parse_page_size(&raw)?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            api_url,
            api_token: env::var("SUBSCRIBE_API_TOKEN").ok().filter(|t| !t.is_empty()),
            avatar_proxy_url: env::var("AVATAR_PROXY_URL").ok().filter(|u| !u.is_empty()),
            group_page_size,
        })
    }
}

fn parse_page_size(raw: &str) -> Result<usize> {
    let size: usize = raw
        .trim()
        .parse()
        .context("GROUP_PAGE_SIZE must be a valid number")?;
    if size == 0 {
        bail!("GROUP_PAGE_SIZE must be at least 1");
    }
    Ok(size)
}
