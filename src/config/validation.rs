use super::{ConfigError, StreamConfig};
use url::Url;

impl StreamConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "A token is required".to_string(),
            ));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Host must not be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "Port must be greater than 0".to_string(),
            ));
        }

        if !self.path.starts_with('/') {
            return Err(ConfigError::InvalidConfig(format!(
                "Path must start with '/': {}",
                self.path
            )));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        self.endpoint_url()?;
        Ok(())
    }

    /// `{protocol}://{host}:{port}{path}`
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "{}://{}:{}{}",
            self.protocol.scheme(),
            self.host,
            self.port,
            self.path
        );
        Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint URL '{raw}': {e}")))
    }
}
