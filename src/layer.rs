//! `tracing` integration: forwards events to a [`SplunkStream`].
//!
//! ```ignore
//! let adapter = create_stream(StreamConfig::new(token))?;
//! tracing_subscriber::registry()
//!     .with(adapter.layer())
//!     .with(tracing_subscriber::fmt::layer())
//!     .init();
//! ```

use crate::domain::{Level, LogRecord};
use crate::stream::SplunkStream;
use serde_json::{Map, Value};
use tokio::runtime::Handle;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Targets never forwarded, so sending an event cannot log another one.
const INTERNAL_TARGETS: &[&str] = &[env!("CARGO_CRATE_NAME"), "hyper", "reqwest", "h2", "rustls"];

fn is_internal_target(target: &str) -> bool {
    INTERNAL_TARGETS.iter().any(|prefix| {
        target == *prefix
            || target
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Layer writing each event at or above its level to the stream.
///
/// Writes are spawned on the current tokio runtime; events recorded outside
/// a runtime are dropped.
#[derive(Debug, Clone)]
pub struct SplunkLayer {
    stream: SplunkStream,
    level: Level,
    name: String,
    hostname: String,
    pid: u32,
}

impl SplunkLayer {
    pub fn new(stream: SplunkStream) -> Self {
        let level = stream.config().level;
        let name = stream.config().name.clone();
        let hostname = hostname::get()
            .ok()
            .and_then(|host| host.into_string().ok())
            .unwrap_or_default();

        Self {
            stream,
            level,
            name,
            hostname,
            pid: std::process::id(),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Logger name put in each record's `name` field.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn should_forward(&self, level: Level, target: &str) -> bool {
        level >= self.level && !is_internal_target(target)
    }

    /// Bunyan-shaped record: name, hostname, pid, level, msg, time, v.
    fn record_for(&self, event: &Event<'_>) -> LogRecord {
        let metadata = event.metadata();
        let level = Level::from(*metadata.level());

        let mut fields = Map::new();
        fields.insert("name".into(), Value::from(self.name.as_str()));
        fields.insert("hostname".into(), Value::from(self.hostname.as_str()));
        fields.insert("pid".into(), Value::from(self.pid));
        fields.insert("level".into(), Value::from(level.bunyan_code()));
        fields.insert("target".into(), Value::from(metadata.target()));
        fields.insert("time".into(), Value::from(unix_seconds()));
        fields.insert("v".into(), Value::from(0));

        let mut visitor = RecordVisitor {
            fields: &mut fields,
        };
        event.record(&mut visitor);

        LogRecord::from_fields(fields)
    }
}

impl<S> Layer<S> for SplunkLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !self.should_forward(Level::from(*metadata.level()), metadata.target()) {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            return;
        };

        let record = self.record_for(event);
        let stream = self.stream.clone();
        handle.spawn(async move {
            stream.write(record).await;
        });
    }
}

fn unix_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

struct RecordVisitor<'a> {
    fields: &'a mut Map<String, Value>,
}

impl RecordVisitor<'_> {
    fn put(&mut self, field: &Field, value: Value) {
        let key = match field.name() {
            "message" => "msg",
            name => name,
        };
        self.fields.insert(key.to_string(), value);
    }
}

impl Visit for RecordVisitor<'_> {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.put(field, Value::from(format!("{value:?}")));
    }
}
