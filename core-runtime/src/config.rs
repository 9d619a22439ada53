//! # Server Configuration
//!
//! Provides configuration management for the lyrics server.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`ServerConfig`]. Every field has a production default, so an empty builder
//! yields a usable configuration; `build()` validates the values and fails
//! fast with an actionable message instead of letting a bad setting surface
//! at request time.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .database_path("lyrics.db")
//!     .rate_limit(50, Duration::from_secs(15 * 60))
//!     .lyrics_quota(50)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.lyrics_quota, 50);
//! ```
//!
//! ## Environment
//!
//! [`ServerConfig::from_env`] reads the same settings from process
//! environment variables (`PORT`, `BIND_ADDR`, `DATABASE_PATH`,
//! `SESSION_NAME`, `SESSION_SECURE`, `RATE_LIMIT_MAX`,
//! `RATE_LIMIT_WINDOW_SECS`, `LYRICS_QUOTA`, `FIREBASE_API_KEY`,
//! `LOG_FORMAT`, `LOG_LEVEL`). Unset variables keep their defaults.

use crate::error::{Error, Result};
use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_PATH: &str = "lyrics.db";
pub const DEFAULT_SESSION_NAME: &str = "toneteam.sid";
pub const DEFAULT_SESSION_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 50;
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_LYRICS_QUOTA: u32 = 50;

/// Session cookie settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub cookie_name: String,
    /// Only send the cookie over HTTPS.
    pub secure: bool,
    pub max_age: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_NAME.to_string(),
            secure: false,
            max_age: DEFAULT_SESSION_MAX_AGE,
        }
    }
}

/// Sliding window request limit applied per client key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_MAX,
            window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}

/// Configuration for the lyrics server.
///
/// Use [`ServerConfigBuilder`] or [`ServerConfig::from_env`] to construct
/// instances.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to
    pub bind_addr: SocketAddr,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    pub session: SessionSettings,

    pub rate_limit: RateLimitSettings,

    /// Maximum number of lyrics documents a single owner may hold
    pub lyrics_quota: u32,

    /// Web API key for the hosted identity provider. When absent the server
    /// falls back to the in-memory provider.
    pub firebase_api_key: Option<String>,

    pub log_format: LogFormat,

    pub log_level: LogLevel,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("session", &self.session)
            .field("rate_limit", &self.rate_limit)
            .field("lyrics_quota", &self.lyrics_quota)
            .field(
                "firebase_api_key",
                &self.firebase_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            session: SessionSettings::default(),
            rate_limit: RateLimitSettings::default(),
            lyrics_quota: DEFAULT_LYRICS_QUOTA,
            firebase_api_key: None,
            log_format: LogFormat::default(),
            log_level: LogLevel::Info,
        }
    }
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Builds a configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut builder = ServerConfig::builder();

        let host: IpAddr = match get("BIND_ADDR") {
            Some(raw) => parse_var("BIND_ADDR", &raw)?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port: u16 = match get("PORT") {
            Some(raw) => parse_var("PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        builder = builder.bind_addr(SocketAddr::new(host, port));

        if let Some(path) = get("DATABASE_PATH") {
            builder = builder.database_path(path);
        }
        if let Some(name) = get("SESSION_NAME") {
            builder = builder.session_cookie_name(name);
        }
        if let Some(raw) = get("SESSION_SECURE") {
            builder = builder.session_secure(parse_bool("SESSION_SECURE", &raw)?);
        }

        let max_requests = match get("RATE_LIMIT_MAX") {
            Some(raw) => parse_var("RATE_LIMIT_MAX", &raw)?,
            None => DEFAULT_RATE_LIMIT_MAX,
        };
        let window = match get("RATE_LIMIT_WINDOW_SECS") {
            Some(raw) => Duration::from_secs(parse_var("RATE_LIMIT_WINDOW_SECS", &raw)?),
            None => DEFAULT_RATE_LIMIT_WINDOW,
        };
        builder = builder.rate_limit(max_requests, window);

        if let Some(raw) = get("LYRICS_QUOTA") {
            builder = builder.lyrics_quota(parse_var("LYRICS_QUOTA", &raw)?);
        }
        if let Some(key) = get("FIREBASE_API_KEY") {
            builder = builder.firebase_api_key(key);
        }
        if let Some(raw) = get("LOG_FORMAT") {
            builder = builder.log_format(raw.parse()?);
        }
        if let Some(raw) = get("LOG_LEVEL") {
            builder = builder.log_level(raw.parse()?);
        }

        builder.build()
    }

    /// Logging settings derived from this configuration.
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig::default()
            .with_format(self.log_format)
            .with_level(self.log_level)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Database path is not empty
    /// - Session cookie name is a valid cookie token and expiry is positive
    /// - Rate limit admits at least one request in a non-empty window
    /// - Quota is at least one document
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        let name = &self.session.cookie_name;
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(Error::Config(format!(
                "Session cookie name '{}' must be non-empty and contain only \
                 ASCII letters, digits, '.', '_' or '-'",
                name
            )));
        }

        if self.session.max_age.is_zero() {
            return Err(Error::Config(
                "Session max age must be greater than zero".to_string(),
            ));
        }

        if self.rate_limit.max_requests == 0 {
            return Err(Error::Config(
                "Rate limit must allow at least one request per window".to_string(),
            ));
        }

        if self.rate_limit.window.is_zero() {
            return Err(Error::Config(
                "Rate limit window must be greater than zero".to_string(),
            ));
        }

        if self.lyrics_quota == 0 {
            return Err(Error::Config(
                "Lyrics quota must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {} ({})", key, raw, e)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!(
            "Invalid value for {}: {} (expected true or false)",
            key, raw
        ))),
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.bind_addr.set_port(port);
        self
    }

    /// Sets the database path.
    ///
    /// ```
    /// use core_runtime::config::ServerConfig;
    ///
    /// let config = ServerConfig::builder()
    ///     .database_path("/var/lib/toneteam/lyrics.db")
    ///     .build()
    ///     .unwrap();
    /// assert!(config.database_path.ends_with("lyrics.db"));
    /// ```
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.database_path = path.into();
        self
    }

    pub fn session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.config.session.cookie_name = name.into();
        self
    }

    /// Marks the session cookie `Secure`. Enable behind HTTPS.
    pub fn session_secure(mut self, secure: bool) -> Self {
        self.config.session.secure = secure;
        self
    }

    pub fn session_max_age(mut self, max_age: Duration) -> Self {
        self.config.session.max_age = max_age;
        self
    }

    /// Sets the per-key sliding window limit.
    pub fn rate_limit(mut self, max_requests: u32, window: Duration) -> Self {
        self.config.rate_limit = RateLimitSettings {
            max_requests,
            window,
        };
        self
    }

    pub fn lyrics_quota(mut self, quota: u32) -> Self {
        self.config.lyrics_quota = quota;
        self
    }

    pub fn firebase_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.firebase_api_key = Some(key.into());
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.log_format = format;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn build(self) -> Result<ServerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
