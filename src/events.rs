//! Error events of a stream.
//!
//! Errors from `write` are never returned to the caller. They are handed to
//! every handler registered with `on_error`, in registration order. With no
//! handler registered the event is dropped.

use crate::domain::{LogRecord, StreamError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Extra information attached to transmission errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
    /// The record passed to `write`, before any middleware ran.
    pub message: LogRecord,
}

type Handler = Arc<dyn Fn(&StreamError, Option<&ErrorContext>) + Send + Sync>;

#[derive(Clone, Default)]
pub struct ErrorChannel {
    handlers: Arc<RwLock<Vec<Handler>>>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&StreamError, Option<&ErrorContext>) + Send + Sync + 'static,
    {
        self.handlers.write().push(Arc::new(handler));
    }

    /// Delivers one event to every handler. Returns how many were notified.
    pub fn emit(&self, error: &StreamError, context: Option<&ErrorContext>) -> usize {
        // Handlers may subscribe further handlers, so call them unlocked.
        let handlers: Vec<Handler> = self.handlers.read().clone();

        if handlers.is_empty() {
            debug!(code = ?error.code(), "Dropping error event with no subscriber: {}", error);
            return 0;
        }

        for handler in &handlers {
            handler(error, context);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl std::fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
