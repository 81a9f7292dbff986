use crate::domain::{EventMetadata, Level, LogRecord};
use uuid::Uuid;

/// Per-write state handed to each middleware stage.
///
/// Created by the stream for a single `write` call and dropped once the
/// event is sent or an error is emitted.
#[derive(Debug, Clone)]
pub struct Context {
    id: Uuid,
    /// The record that will be sent.
    pub message: LogRecord,
    /// Overrides the severity derived from the record or the configuration.
    pub severity: Option<Level>,
    /// Overrides the configured event metadata, field by field.
    pub metadata: EventMetadata,
}

impl Context {
    pub fn new(message: LogRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            message,
            severity: None,
            metadata: EventMetadata::default(),
        }
    }

    /// Identifier used to correlate this write in diagnostics.
    pub fn id(&self) -> Uuid {
        self.id
    }
}
