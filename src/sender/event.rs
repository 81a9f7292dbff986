use crate::config::StreamConfig;
use crate::domain::LogRecord;
use crate::middleware::Context;
use serde::{Deserialize, Serialize};

/// Body of one HEC event request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HecEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourcetype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    pub event: EventBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBody {
    pub message: LogRecord,
    pub severity: String,
}

impl HecEvent {
    /// Builds the request body for a context that made it through the
    /// pipeline. Context overrides win over the configuration.
    pub fn from_context(context: &Context, config: &StreamConfig) -> Self {
        let severity = context
            .severity
            .or_else(|| context.message.level())
            .unwrap_or(config.level);
        let metadata = context.metadata.clone().or(&config.metadata());

        Self {
            time: context.message.time(),
            host: metadata.host,
            source: metadata.source,
            sourcetype: metadata.sourcetype,
            index: metadata.index,
            event: EventBody {
                message: context.message.clone(),
                severity: severity.as_str().to_string(),
            },
        }
    }
}

/// Acknowledgement body returned by the collector, e.g.
/// `{"text": "Invalid token", "code": 4}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HecAck {
    pub text: String,
    pub code: i64,
}

impl HecAck {
    pub const SUCCESS: i64 = 0;
    pub const INVALID_TOKEN: i64 = 4;

    pub fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }
}
