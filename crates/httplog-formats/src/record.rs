//! The structured log record passed through a format chain

use crate::error::{FormatError, Result};
use crate::path::{self, FieldPath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the log level
pub const LEVEL_KEY: &str = "level";
/// Key holding the log message (a string or an HTTP object)
pub const MESSAGE_KEY: &str = "message";
/// Key holding the human readable description
pub const DESCRIPTION_KEY: &str = "description";

/// A single log event: an open mapping from keys to JSON values.
///
/// Every record is expected to carry at least `level` and `message`, but
/// nothing enforces it; formats pass through records they do not
/// understand. Formats take the record by value and return the record to
/// continue with, which may or may not be the same allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogRecord(Map<String, Value>);

impl LogRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record with a level and a message
    pub fn with_message(level: impl Into<String>, message: impl Into<Value>) -> Self {
        let mut record = Self::new();
        record.insert(LEVEL_KEY, Value::String(level.into()));
        record.insert(MESSAGE_KEY, message.into());
        record
    }

    /// Convert a JSON value into a record; only objects are accepted
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(FormatError::not_an_object("<record>", &other)),
        }
    }

    /// The log level, when it is a string
    pub fn level(&self) -> Option<&str> {
        self.0.get(LEVEL_KEY).and_then(Value::as_str)
    }

    /// The raw `message` value
    pub fn message(&self) -> Option<&Value> {
        self.0.get(MESSAGE_KEY)
    }

    /// Replace the message
    pub fn set_message(&mut self, message: impl Into<Value>) {
        self.0.insert(MESSAGE_KEY.to_string(), message.into());
    }

    /// Get a top-level field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a top-level field is present and truthy
    pub fn has_truthy(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_truthy)
    }

    /// Insert a top-level field, returning the old value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a top-level field
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Whether a top-level field is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of top-level fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a nested value by dotted path
    pub fn get_path(&self, path: &FieldPath) -> Option<&Value> {
        let mut segments = path.segments();
        let first = self.0.get(segments.next()?)?;
        path::walk(first, segments)
    }

    /// Mutable variant of [`LogRecord::get_path`]
    pub fn get_path_mut(&mut self, path: &FieldPath) -> Option<&mut Value> {
        let mut segments = path.segments();
        let first = self.0.get_mut(segments.next()?)?;
        path::walk_mut(first, segments)
    }

    /// Write a nested value by dotted path, creating intermediate objects
    pub fn set_path(&mut self, path: &FieldPath, value: Value) -> Option<Value> {
        let mut root = Value::Object(std::mem::take(&mut self.0));
        let previous = path::set_path(&mut root, path, value);
        if let Value::Object(map) = root {
            self.0 = map;
        }
        previous
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Mutably borrow the underlying map
    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Take the underlying map
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Convert into a JSON object value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for LogRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for LogRecord {
    type Error = FormatError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<LogRecord> for Value {
    fn from(record: LogRecord) -> Self {
        record.into_value()
    }
}

/// Loose truthiness used for optional record fields.
///
/// `null`, `false`, `0`, `""` are falsy; everything else, including empty
/// objects and arrays, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
