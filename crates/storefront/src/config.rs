//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_CURSOR_SECRET` - Pagination cursor key material (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 8080)
//! - `STOREFRONT_CATEGORIES_PATH` - Category tree document (default: categories.json)
//! - `STOREFRONT_TRANSLATIONS_DIR` - Directory of `{lang}.json` files (default: translations)
//! - `STOREFRONT_STATIC_DIR` - Static assets directory (default: crates/storefront/static)
//! - `STOREFRONT_PAGE_SIZE` - Products per category page (default: 12)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

const CURSOR_SECRET_VAR: &str = "STOREFRONT_CURSOR_SECRET";
const MIN_CURSOR_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_BYTE: f64 = 3.3;

/// Fragments that mark a copied sample value rather than a generated key.
const PLACEHOLDER_FRAGMENTS: &[&str] = &[
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
    "xxx",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(&'static str, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    /// Key material for sealing pagination cursors
    pub cursor_secret: SecretString,
    /// Category tree document, read once at startup
    pub categories_path: PathBuf,
    /// Directory holding `{lang}.json` translation tables
    pub translations_dir: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Products per category page
    pub page_size: NonZeroU32,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the cursor secret looks guessable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = env_var("STOREFRONT_DATABASE_URL")
            .or_else(|| env_var("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or(ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

        let cursor_secret =
            env_var(CURSOR_SECRET_VAR).ok_or(ConfigError::MissingEnvVar(CURSOR_SECRET_VAR))?;
        check_cursor_secret(&cursor_secret)
            .map_err(|reason| ConfigError::InsecureSecret(CURSOR_SECRET_VAR, reason))?;

        let page_size = NonZeroU32::new(parse_or("STOREFRONT_PAGE_SIZE", 12)?).ok_or_else(|| {
            ConfigError::InvalidEnvVar("STOREFRONT_PAGE_SIZE", "must be greater than zero".into())
        })?;

        Ok(Self {
            database_url,
            host: parse_or("STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parse_or("STOREFRONT_PORT", 8080)?,
            cursor_secret: SecretString::from(cursor_secret),
            categories_path: path_or("STOREFRONT_CATEGORIES_PATH", "categories.json"),
            translations_dir: path_or("STOREFRONT_TRANSLATIONS_DIR", "translations"),
            static_dir: path_or("STOREFRONT_STATIC_DIR", "crates/storefront/static"),
            page_size,
            sentry_dsn: env_var("SENTRY_DSN"),
            sentry_environment: env_var("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read a variable, treating an empty value as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn path_or(key: &str, default: &str) -> PathBuf {
    env_var(key).unwrap_or_else(|| default.to_owned()).into()
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key).map_or(Ok(default), |raw| {
        raw.parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key, e.to_string()))
    })
}

/// Shannon entropy of the byte distribution, in bits per byte.
fn entropy_bits_per_byte(value: &str) -> f64 {
    let mut counts = [0_usize; 256];
    for byte in value.bytes() {
        if let Some(count) = counts.get_mut(usize::from(byte)) {
            *count += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)] // secrets are far below 2^52 bytes
    let len = value.len() as f64;
    counts
        .iter()
        .filter(|&&count| count > 0)
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject cursor secrets that are short, copied from a sample, or low entropy.
fn check_cursor_secret(secret: &str) -> Result<(), String> {
    if secret.len() < MIN_CURSOR_SECRET_LENGTH {
        return Err(format!(
            "must be at least {MIN_CURSOR_SECRET_LENGTH} characters (got {})",
            secret.len()
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(fragment) = PLACEHOLDER_FRAGMENTS.iter().find(|f| lower.contains(*f)) {
        return Err(format!("appears to be a placeholder (contains '{fragment}')"));
    }

    let entropy = entropy_bits_per_byte(secret);
    if entropy < MIN_ENTROPY_BITS_PER_BYTE {
        return Err(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_BYTE:.1})"
        ));
    }
    Ok(())
}
