use crate::sender::ClientError;
use thiserror::Error;

/// Message carried by the error emitted when `write` gets no record.
pub const MISSING_RECORD_MESSAGE: &str = "Must pass a parameter to write.";

/// Errors surfaced on a stream's error channel.
///
/// None of these escape `write`; they are only delivered to `on_error`
/// subscribers.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Must pass a parameter to write.")]
    MissingRecord,

    #[error(transparent)]
    Middleware(#[from] MiddlewareError),

    /// The collector answered with a non-zero application code.
    #[error("{message}")]
    Rejected { message: String, code: i64 },

    #[error("Transmission failed: {0}")]
    Transport(#[from] ClientError),
}

impl StreamError {
    /// Application code of a rejected event.
    pub fn code(&self) -> Option<i64> {
        match self {
            StreamError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_transmission(&self) -> bool {
        matches!(
            self,
            StreamError::Rejected { .. } | StreamError::Transport(_)
        )
    }
}

/// Error a middleware returns to abort a write.
#[derive(Error, Debug)]
pub enum MiddlewareError {
    #[error("{0}")]
    Message(String),

    #[error("{0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MiddlewareError {
    pub fn new(message: impl Into<String>) -> Self {
        MiddlewareError::Message(message.into())
    }

    pub fn from_source(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        MiddlewareError::Source(Box::new(source))
    }
}

impl From<&str> for MiddlewareError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for MiddlewareError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}
