//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults target the public DeisiShop API.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_MESSAGE_TTL_SECS` - Lifetime of the checkout confirmation (default: 5)
//! - `STOREFRONT_CATALOG_CACHE_SECS` - Lifetime of the cached catalog used by "add to cart" (default: 60)
//! - `STOREFRONT_RATE_LIMIT` - Rate limit checkout endpoints (default: true)
//! - `DEISISHOP_CATALOG_URL` - Product catalog endpoint
//! - `DEISISHOP_CHECKOUT_URL` - Purchase endpoint
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default DeisiShop product catalog endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://deisishop.pythonanywhere.com/products";

/// Default DeisiShop purchase endpoint.
pub const DEFAULT_CHECKOUT_URL: &str = "https://deisishop.pythonanywhere.com/buy";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// DeisiShop API endpoints
    pub deisishop: DeisishopConfig,
    /// How long a checkout confirmation stays visible
    pub message_ttl: Duration,
    /// How long a loaded catalog may be reused to resolve "add to cart"
    pub catalog_cache_ttl: Duration,
    /// Whether checkout endpoints are rate limited per client IP
    pub rate_limit: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error event sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// DeisiShop API configuration.
#[derive(Debug, Clone)]
pub struct DeisishopConfig {
    /// Endpoint returning the product catalog (GET)
    pub catalog_url: Url,
    /// Endpoint accepting purchases (POST)
    pub checkout_url: Url,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let message_ttl = Duration::from_secs(parse_env("STOREFRONT_MESSAGE_TTL_SECS", "5")?);
        let catalog_cache_ttl =
            Duration::from_secs(parse_env("STOREFRONT_CATALOG_CACHE_SECS", "60")?);
        let rate_limit = parse_env("STOREFRONT_RATE_LIMIT", "true")?;

        let deisishop = DeisishopConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            deisishop,
            message_ttl,
            catalog_cache_ttl,
            rate_limit,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (enables secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl DeisishopConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            catalog_url: get_url("DEISISHOP_CATALOG_URL", DEFAULT_CATALOG_URL)?,
            checkout_url: get_url("DEISISHOP_CHECKOUT_URL", DEFAULT_CHECKOUT_URL)?,
        })
    }
}

impl Default for DeisishopConfig {
    fn default() -> Self {
        Self {
            catalog_url: Url::parse(DEFAULT_CATALOG_URL).expect("default catalog URL is valid"),
            checkout_url: Url::parse(DEFAULT_CHECKOUT_URL).expect("default checkout URL is valid"),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get an absolute HTTP(S) URL from the environment.
fn get_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    validate_http_url(key, &get_env_or_default(key, default))
}

fn validate_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url: Url = parse_value(key, value)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}
