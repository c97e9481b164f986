//! Server configuration.
//!
//! # Environment Variables
//!
//! - `HOST`: Server host address (default: `0.0.0.0`)
//! - `PORT`: Server port (default: `3000`)
//! - `JWT_SECRET`: Secret used to sign access tokens (required)
//! - `NOTIFICATION_INTERVAL_SECS`: Sweep period in seconds (default: `10`)
//! - `EVENT_CHANNEL_CAPACITY`: Push channel buffer per subscriber (default: `256`)
//!
//! # Example
//!
//! ```ignore
//! use infrastructure::config::ServerConfig;
//!
//! let config = ServerConfig::from_env()?;
//! println!("listening on {}", config.socket_address()?);
//! ```

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;
/// Default sweep period.
pub const DEFAULT_NOTIFICATION_INTERVAL: Duration = Duration::from_secs(10);
/// Default broadcast buffer.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

// =============================================================================
// Configuration Error
// =============================================================================

/// Errors raised while loading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// `JWT_SECRET` is missing or blank.
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingJwtSecret,

    /// A variable holds a value that cannot be parsed.
    #[error("{name} has invalid value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// `HOST` and `PORT` do not form a socket address.
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Runtime configuration for the server, the sweep and the auth gate.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Token signing secret.
    pub jwt_secret: SecretString,
    /// Period between notification sweeps.
    pub notification_interval: Duration,
    /// Buffer size of the push channel.
    pub event_channel_capacity: usize,
}

impl ServerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `JWT_SECRET` is missing or any
    /// variable holds an unparsable or zero value.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a configuration from an arbitrary variable source.
    ///
    /// Empty or whitespace-only values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut builder = Self::builder();

        if let Some(host) = read("HOST") {
            builder = builder.host(host);
        }
        if let Some(port) = read("PORT") {
            builder = builder.port(parse_value("PORT", &port)?);
        }
        if let Some(secret) = read("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(seconds) = read("NOTIFICATION_INTERVAL_SECS") {
            let seconds: u64 = parse_value("NOTIFICATION_INTERVAL_SECS", &seconds)?;
            builder = builder.notification_interval(Duration::from_secs(seconds));
        }
        if let Some(capacity) = read("EVENT_CHANNEL_CAPACITY") {
            let capacity: usize = parse_value("EVENT_CHANNEL_CAPACITY", &capacity)?;
            builder = builder.event_channel_capacity(capacity);
        }

        builder.build()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the secret is blank or a period or
    /// capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.jwt_secret.expose_secret().trim().is_empty() {
            return Err(ConfigurationError::MissingJwtSecret);
        }

        if self.notification_interval.is_zero() {
            return Err(ConfigurationError::InvalidValue {
                name: "NOTIFICATION_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if self.event_channel_capacity == 0 {
            return Err(ConfigurationError::InvalidValue {
                name: "EVENT_CHANNEL_CAPACITY",
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the address to bind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidAddress` if `host:port` does not parse.
    pub fn socket_address(&self) -> Result<SocketAddr, ConfigurationError> {
        let address = format!("{}:{}", self.host, self.port);
        address
            .parse()
            .map_err(|_| ConfigurationError::InvalidAddress(address))
    }
}

fn parse_value<T>(name: &'static str, value: &str) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|error: T::Err| ConfigurationError::InvalidValue {
            name,
            value: value.to_string(),
            reason: error.to_string(),
        })
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for `ServerConfig`.
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    jwt_secret: Option<SecretString>,
    notification_interval: Option<Duration>,
    event_channel_capacity: Option<usize>,
}

impl ServerConfigBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(SecretString::from(secret.into()));
        self
    }

    #[must_use]
    pub const fn notification_interval(mut self, interval: Duration) -> Self {
        self.notification_interval = Some(interval);
        self
    }

    #[must_use]
    pub const fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = Some(capacity);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if no secret was supplied or validation fails.
    pub fn build(self) -> Result<ServerConfig, ConfigurationError> {
        let config = ServerConfig {
            host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            jwt_secret: self.jwt_secret.ok_or(ConfigurationError::MissingJwtSecret)?,
            notification_interval: self
                .notification_interval
                .unwrap_or(DEFAULT_NOTIFICATION_INTERVAL),
            event_channel_capacity: self
                .event_channel_capacity
                .unwrap_or(DEFAULT_EVENT_CHANNEL_CAPACITY),
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[rstest]
    fn test_defaults_with_secret_only() {
        let config = ServerConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.notification_interval, Duration::from_secs(10));
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.jwt_secret.expose_secret(), "s3cret");
    }

    #[rstest]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "s3cret"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("NOTIFICATION_INTERVAL_SECS", "2"),
            ("EVENT_CHANNEL_CAPACITY", "8"),
        ]))
        .unwrap();

        assert_eq!(
            config.socket_address().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.notification_interval, Duration::from_secs(2));
        assert_eq!(config.event_channel_capacity, 8);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[("JWT_SECRET", "   ")])]
    fn test_missing_secret(#[case] pairs: &[(&str, &str)]) {
        let result = ServerConfig::from_lookup(lookup(pairs));
        assert_eq!(result.unwrap_err(), ConfigurationError::MissingJwtSecret);
    }

    #[rstest]
    #[case("PORT", "eighty")]
    #[case("PORT", "70000")]
    #[case("NOTIFICATION_INTERVAL_SECS", "0")]
    #[case("NOTIFICATION_INTERVAL_SECS", "-1")]
    #[case("EVENT_CHANNEL_CAPACITY", "0")]
    fn test_invalid_values(#[case] name: &str, #[case] value: &str) {
        let result = ServerConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret"), (name, value)]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { name: invalid, .. }) if invalid == name
        ));
    }

    #[rstest]
    fn test_invalid_host() {
        let config = ServerConfig::builder()
            .jwt_secret("s3cret")
            .host("not a host")
            .build()
            .unwrap();
        assert!(matches!(
            config.socket_address(),
            Err(ConfigurationError::InvalidAddress(_))
        ));
    }
}
