use super::logging_system::LogFormat;
use crate::config::{ConfigError, Protocol, StreamConfig};
use crate::domain::Level;
use clap::Parser;
use std::path::PathBuf;

/// Forward log lines read from stdin to a Splunk HTTP Event Collector.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// HEC token (required unless set in the configuration file)
    #[arg(long, env = "SPLUNK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Collector hostname
    #[arg(long, env = "SPLUNK_HOST")]
    pub host: Option<String>,

    /// Collector port
    #[arg(long, env = "SPLUNK_PORT")]
    pub port: Option<u16>,

    /// Collector protocol
    #[arg(long, env = "SPLUNK_PROTOCOL")]
    pub protocol: Option<Protocol>,

    /// Minimum severity forwarded; also the severity of records that carry none
    #[arg(long, env = "SPLUNK_LEVEL")]
    pub level: Option<Level>,

    /// Client identifier sent as User-Agent
    #[arg(long, env = "SPLUNK_NAME")]
    pub name: Option<String>,

    /// HEC endpoint path
    #[arg(long, env = "SPLUNK_PATH")]
    pub path: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, env = "SPLUNK_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Event `source` metadata
    #[arg(long, env = "SPLUNK_SOURCE")]
    pub source: Option<String>,

    /// Event `sourcetype` metadata
    #[arg(long, env = "SPLUNK_SOURCETYPE")]
    pub sourcetype: Option<String>,

    /// Event `index` metadata
    #[arg(long, env = "SPLUNK_INDEX")]
    pub index: Option<String>,

    /// Event `host` metadata
    #[arg(long, env = "SPLUNK_EVENT_HOST")]
    pub event_host: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, env = "SPLUNK_ACCEPT_INVALID_CERTS")]
    pub accept_invalid_certs: bool,

    /// TOML configuration file; flags override its values
    #[arg(long, env = "SPLUNK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Level of this tool's own diagnostics
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    pub log_level: Level,

    /// Format of this tool's own diagnostics
    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// Resolves the stream configuration: file first, then flags, then a
    /// single validation of the result.
    pub fn stream_config(&self) -> Result<StreamConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => StreamConfig::read_file(path)?,
            None => StreamConfig::new(String::new()),
        };

        if let Some(token) = &self.token {
            config.token.clone_from(token);
        }
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(protocol) = self.protocol {
            config.protocol = protocol;
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(name) = &self.name {
            config.name.clone_from(name);
        }
        if let Some(path) = &self.path {
            config.path.clone_from(path);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if self.source.is_some() {
            config.source.clone_from(&self.source);
        }
        if self.sourcetype.is_some() {
            config.sourcetype.clone_from(&self.sourcetype);
        }
        if self.index.is_some() {
            config.index.clone_from(&self.index);
        }
        if self.event_host.is_some() {
            config.event_host.clone_from(&self.event_host);
        }
        if self.accept_invalid_certs {
            config.accept_invalid_certs = true;
        }

        config.validate()?;
        Ok(config)
    }
}
