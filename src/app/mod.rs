pub mod cli;
pub mod logging_system;

pub use cli::Cli;
pub use logging_system::{LogFormat, LoggingInitError, setup_logging};

use crate::domain::LogRecord;
use crate::stream::{SplunkStream, create_stream};
use serde_json::Value;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

/// Counts for one run over an input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardSummary {
    pub lines: usize,
    pub skipped: usize,
    pub accepted: usize,
    pub failed: usize,
}

/// A JSON object line becomes a field mapping; anything else non-empty is
/// sent as a plain message.
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(fields)) => Some(LogRecord::from_fields(fields)),
        _ => Some(LogRecord::new(trimmed)),
    }
}

/// Writes every line of `reader` to `stream`, one request per line, in order.
///
/// Records whose numeric `level` is below the stream's level are skipped.
pub async fn forward_lines<R>(stream: &SplunkStream, reader: R) -> std::io::Result<ForwardSummary>
where
    R: AsyncBufRead + Unpin,
{
    let threshold = stream.config().level;
    let mut summary = ForwardSummary::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        summary.lines += 1;
        let Some(record) = parse_line(&line) else {
            summary.skipped += 1;
            continue;
        };
        if record.level().is_some_and(|level| level < threshold) {
            debug!(level = ?record.level(), "Skipping record below {}", threshold);
            summary.skipped += 1;
            continue;
        }

        if stream.write(record).await.is_success() {
            summary.accepted += 1;
        } else {
            summary.failed += 1;
        }
    }

    Ok(summary)
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Entry point of the `splunk-log-stream` binary.
pub async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::from_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    setup_logging(cli.log_level, cli.log_format)?;

    let config = cli.stream_config()?;
    info!(
        "Starting splunk-log-stream v{} -> {}://{}:{}{}",
        get_version(),
        config.protocol,
        config.host,
        config.port,
        config.path
    );

    let adapter = create_stream(config)?;
    let error_events = Arc::new(AtomicUsize::new(0));
    {
        let error_events = Arc::clone(&error_events);
        adapter.on_error(move |err, context| {
            error_events.fetch_add(1, Ordering::Relaxed);
            error!(
                code = ?err.code(),
                record = ?context.and_then(|c| c.message.msg()),
                "{}",
                err
            );
        });
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let summary = forward_lines(adapter.stream(), stdin).await?;
    info!(
        lines = summary.lines,
        accepted = summary.accepted,
        failed = summary.failed,
        skipped = summary.skipped,
        "Input exhausted"
    );

    if error_events.load(Ordering::Relaxed) > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
