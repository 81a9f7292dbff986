#![deny(warnings, rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Durations in milliseconds fit in u64
    clippy::cast_precision_loss,      // Unix millis as f64 seconds
    clippy::missing_errors_doc,       // Error enums are documented instead
    clippy::module_name_repetitions,  // e.g. ConfigError in config module
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

//! Forward structured log records to a Splunk HTTP Event Collector.
//!
//! Each `write` runs the record through a middleware pipeline and sends it as
//! one HEC event. Errors never escape `write`; they are delivered to
//! `on_error` subscribers.

pub mod app;
pub mod config;
pub mod domain;
pub mod events;
pub mod layer;
pub mod middleware;
pub mod sender;
pub mod stream;

// Re-export main types for easy access
pub use config::{ConfigError, Protocol, StreamConfig};
pub use domain::{Level, LogRecord, MiddlewareError, StreamError};
pub use events::ErrorContext;
pub use layer::SplunkLayer;
pub use middleware::{Context, Middleware};
pub use stream::{SplunkStream, StreamAdapter, StreamKind, WriteOutcome, create_stream};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
