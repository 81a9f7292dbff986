//! Domain layer for splunk-log-stream.
//!
//! Contains the canonical types shared across all modules:
//! - `LogRecord`: one structured log entry
//! - `Level`: log severity (Trace/Debug/Info/Warn/Error/Fatal)
//! - `EventMetadata`: HEC host/source/sourcetype/index
//! - `StreamError` / `MiddlewareError`: errors delivered to observers

pub mod error;
pub mod log_level;
pub mod log_record;
pub mod metadata;

pub use error::{MISSING_RECORD_MESSAGE, MiddlewareError, StreamError};
pub use log_level::{Level, ParseLevelError};
pub use log_record::{LogRecord, MESSAGE_FIELD};
pub use metadata::EventMetadata;
