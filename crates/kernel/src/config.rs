//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Upper bound for recipes per page, whatever the configuration asks for.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Viewport class of the client requesting recipe pages.
///
/// Constrained viewports get smaller pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    #[default]
    Desktop,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Recipes per page on desktop viewports (default: 9).
    pub page_size_desktop: u32,

    /// Recipes per page on mobile viewports (default: 5).
    pub page_size_mobile: u32,

    /// How long a household's facet catalog stays cached (default: 300s).
    pub facet_cache_ttl: Duration,

    /// Statement timeout applied to recipe page and count queries (default: 10s).
    pub query_timeout: Duration,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let page_size_desktop = parse_page_size("PAGE_SIZE_DESKTOP", 9)?;
        let page_size_mobile = parse_page_size("PAGE_SIZE_MOBILE", 5)?;

        let facet_cache_ttl = env::var("FACET_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("FACET_CACHE_TTL_SECS must be a valid u64")?;

        let query_timeout = env::var("QUERY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("QUERY_TIMEOUT_SECS must be a valid u64")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            page_size_desktop,
            page_size_mobile,
            facet_cache_ttl,
            query_timeout,
            cors_allowed_origins,
        })
    }

    /// Configuration for in-process use (tests, in-memory store).
    pub fn local() -> Self {
        Self {
            port: 3000,
            database_url: String::new(),
            database_max_connections: 1,
            page_size_desktop: 9,
            page_size_mobile: 5,
            facet_cache_ttl: Duration::from_secs(300),
            query_timeout: Duration::from_secs(10),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }

    /// Page size for the given device class, capped to [`MAX_PAGE_SIZE`].
    pub fn page_size(&self, device: DeviceClass) -> u32 {
        let requested = match device {
            DeviceClass::Mobile => self.page_size_mobile,
            DeviceClass::Desktop => self.page_size_desktop,
        };
        if requested > MAX_PAGE_SIZE {
            warn!(
                requested = requested,
                capped = MAX_PAGE_SIZE,
                "page size exceeds maximum, capping"
            );
            return MAX_PAGE_SIZE;
        }
        requested
    }
}

fn parse_page_size(var: &str, default: u32) -> Result<u32> {
    let size: u32 = match env::var(var) {
        Ok(v) => v
            .parse()
            .with_context(|| format!("{var} must be a valid u32"))?,
        Err(_) => default,
    };
    anyhow::ensure!(size > 0, "{var} must be greater than zero");
    Ok(size)
}
