//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKETPLACE_BASE_URL` - Public URL for the service (`https://` enables secure cookies)
//! - `MARKETPLACE_IDENTITY_SECRET` - Shared secret the identity provider presents as a
//!   bearer token when handing over a signed-in user (at least 32 characters)
//!
//! ## Optional
//! - `MARKETPLACE_HOST` - Bind address (default: 127.0.0.1)
//! - `MARKETPLACE_PORT` - Listen port (default: 3000)
//! - `MARKETPLACE_LOGIN_PATH` - Where the session guard sends signed-out visitors
//!   (default: `/auth/login`)
//! - `MARKETPLACE_SESSION_CAPACITY` - Most sessions kept in memory at once (default: 100000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use marketplace_core::DEFAULT_REDIRECT_TARGET;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Minimum length for the identity provider secret.
const MIN_IDENTITY_SECRET_LENGTH: usize = 32;

/// Substrings that mark a secret as copied from an example file.
const PLACEHOLDER_PATTERNS: &[&str] = &["changeme", "change_me", "example", "placeholder", "secret"];

/// Service configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the service
    pub base_url: Url,
    /// Redirect target for the session guard (path on this host)
    pub login_path: String,
    /// Bearer token the identity provider must present on `/auth/session`
    pub identity_secret: SecretString,
    /// Most sessions held in memory before the least useful are evicted
    pub session_capacity: u64,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment tag (e.g. `production`)
    pub environment: Option<String>,
    /// Fraction of errors to report
    pub sample_rate: f32,
    /// Fraction of transactions to trace
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.0,
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_or_default::<IpAddr>(&var, "MARKETPLACE_HOST", "127.0.0.1")?;
        let port = parse_or_default::<u16>(&var, "MARKETPLACE_PORT", "3000")?;

        let base_url = required(&var, "MARKETPLACE_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("MARKETPLACE_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "MARKETPLACE_BASE_URL".to_string(),
                format!("unsupported scheme {:?}", base_url.scheme()),
            ));
        }

        let login_path = var("MARKETPLACE_LOGIN_PATH")
            .unwrap_or_else(|| DEFAULT_REDIRECT_TARGET.to_string());
        validate_login_path(&login_path)?;

        let identity_secret = required_secret(&var, "MARKETPLACE_IDENTITY_SECRET")?;
        let session_capacity =
            parse_or_default::<u64>(&var, "MARKETPLACE_SESSION_CAPACITY", "100000")?;

        let sentry = SentryConfig {
            dsn: var("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            environment: var("SENTRY_ENVIRONMENT"),
            sample_rate: parse_or_default::<f32>(&var, "SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_or_default::<f32>(&var, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            login_path,
            identity_secret,
            session_capacity,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn required(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    var(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Parse a variable, falling back to `default` when unset.
fn parse_or_default<T>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var(key).unwrap_or_else(|| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a required secret, rejecting short or placeholder values.
fn required_secret(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<SecretString, ConfigError> {
    let secret = SecretString::from(required(var, key)?);
    let value = secret.expose_secret();

    if value.len() < MIN_IDENTITY_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!(
                "must be at least {MIN_IDENTITY_SECRET_LENGTH} characters (got {})",
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    Ok(secret)
}

/// The guard's redirect target must stay on this host.
///
/// Browsers read both `//host` and `/\host` as protocol-relative URLs.
fn validate_login_path(path: &str) -> Result<(), ConfigError> {
    let mut chars = path.chars();
    let on_host = chars.next() == Some('/') && !matches!(chars.next(), Some('/' | '\\'));
    if !on_host {
        return Err(ConfigError::InvalidEnvVar(
            "MARKETPLACE_LOGIN_PATH".to_string(),
            format!("must be an absolute path on this host (got {path:?})"),
        ));
    }
    Ok(())
}
