use super::log_level::Level;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the human-readable message of a record.
pub const MESSAGE_FIELD: &str = "msg";
/// Numeric bunyan level, when the record carries one.
pub const LEVEL_FIELD: &str = "level";
/// Unix time in seconds (fractional), when the record carries one.
pub const TIME_FIELD: &str = "time";

/// One structured log entry submitted for transmission.
///
/// A record is a JSON object that always has a `msg` field. Strings are
/// wrapped as the message; objects keep their fields as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct LogRecord {
    fields: Map<String, Value>,
}

impl LogRecord {
    pub fn new(msg: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(MESSAGE_FIELD.to_string(), Value::String(msg.into()));
        Self { fields }
    }

    pub fn from_fields(mut fields: Map<String, Value>) -> Self {
        fields
            .entry(MESSAGE_FIELD)
            .or_insert_with(|| Value::String(String::new()));
        Self { fields }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn msg(&self) -> Option<&str> {
        self.fields.get(MESSAGE_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Removes a field. The message field cannot be removed, only replaced.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if key == MESSAGE_FIELD {
            return None;
        }
        self.fields.remove(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Severity carried by a numeric bunyan `level` field.
    pub fn level(&self) -> Option<Level> {
        self.fields
            .get(LEVEL_FIELD)
            .and_then(Value::as_u64)
            .map(Level::from_bunyan)
    }

    pub fn time(&self) -> Option<f64> {
        self.fields.get(TIME_FIELD).and_then(Value::as_f64)
    }
}

impl Default for LogRecord {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for LogRecord {
    fn from(msg: &str) -> Self {
        Self::new(msg)
    }
}

impl From<String> for LogRecord {
    fn from(msg: String) -> Self {
        Self::new(msg)
    }
}

impl From<Map<String, Value>> for LogRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_fields(fields)
    }
}

impl From<Value> for LogRecord {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            Value::String(msg) => Self::new(msg),
            Value::Null => Self::default(),
            other => Self::new(other.to_string()),
        }
    }
}

impl From<LogRecord> for Map<String, Value> {
    fn from(record: LogRecord) -> Self {
        record.fields
    }
}
