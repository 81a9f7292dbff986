mod validation;

use crate::domain::{EventMetadata, Level};
use crate::sender::ClientError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8088;
pub const DEFAULT_PATH: &str = "/services/collector/event/1.0";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Client error: {0}")]
    Client(#[from] ClientError),
}

/// Scheme used to reach the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Https,
    Http,
}

impl Protocol {
    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Https => "https",
            Protocol::Http => "http",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Client identifier sent as the `User-Agent`.
pub fn default_name() -> String {
    format!("splunk-log-stream/{}", env!("CARGO_PKG_VERSION"))
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_path() -> String {
    DEFAULT_PATH.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

/// Options of one stream, resolved once when the stream is created.
///
/// Only `token` is required, and [`StreamConfig::validate`] enforces it. Every
/// other key falls back to its default when omitted from a TOML/JSON document
/// or when built with [`StreamConfig::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Minimum severity forwarded, and the severity given to records that
    /// carry none.
    #[serde(default)]
    pub level: Level,
    #[serde(default = "default_true", alias = "autoFlush")]
    pub auto_flush: bool,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_timeout_ms", alias = "timeoutMs")]
    pub timeout_ms: u64,
    /// Skip TLS certificate verification (self-signed collector certificates).
    #[serde(default, alias = "acceptInvalidCerts")]
    pub accept_invalid_certs: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    /// `host` metadata of each event, not the collector's address.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "eventHost")]
    pub event_host: Option<String>,
}

impl StreamConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            name: default_name(),
            host: default_host(),
            protocol: Protocol::default(),
            port: default_port(),
            level: Level::default(),
            auto_flush: true,
            path: default_path(),
            timeout_ms: default_timeout_ms(),
            accept_invalid_certs: false,
            source: None,
            sourcetype: None,
            index: None,
            event_host: None,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_toml_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses without validating, for callers that layer overrides on top.
    pub fn parse_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reads a TOML file without validating it.
    pub fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml_str(&content)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Metadata applied to every event unless a middleware overrides it.
    pub fn metadata(&self) -> EventMetadata {
        EventMetadata {
            host: self.event_host.clone(),
            source: self.source.clone(),
            sourcetype: self.sourcetype.clone(),
            index: self.index.clone(),
        }
    }
}
