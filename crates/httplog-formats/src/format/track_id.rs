//! Track id stamping

use super::Format;
use crate::record::{is_truthy, LogRecord};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Record key read for an existing track id
pub const TRACK_ID_KEY: &str = "trackId";

/// Where a track id comes from
#[derive(Clone)]
pub enum TrackIdSource {
    /// A fixed value
    Value(Value),
    /// Computed from the record being stamped
    Generator(Arc<dyn Fn(&LogRecord) -> Value + Send + Sync>),
}

impl TrackIdSource {
    /// Generator source from a closure
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&LogRecord) -> Value + Send + Sync + 'static,
    {
        Self::Generator(Arc::new(f))
    }

    fn is_set(&self) -> bool {
        match self {
            Self::Value(value) => is_truthy(value),
            Self::Generator(_) => true,
        }
    }

    fn produce(&self, record: &LogRecord) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Generator(generate) => generate(record),
        }
    }
}

impl fmt::Debug for TrackIdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Generators have no data form and serialize as `null`
impl Serialize for TrackIdSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Generator(_) => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for TrackIdSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::Value)
    }
}

impl From<Value> for TrackIdSource {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Options for [`TrackIdFormat`]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrackIdOptions {
    /// When false every record passes through untouched
    pub enabled: bool,
    /// Key the track id is written to
    pub key: String,
    /// Fallback track id for records without one
    pub track_id: Option<TrackIdSource>,
}

impl Default for TrackIdOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            key: TRACK_ID_KEY.to_string(),
            track_id: None,
        }
    }
}

impl TrackIdOptions {
    /// Enable or disable the format
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Write the track id under `key`
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the fallback source
    pub fn track_id(mut self, source: impl Into<TrackIdSource>) -> Self {
        self.track_id = Some(source.into());
        self
    }
}

/// Stamps a track id on every record.
///
/// A truthy `trackId` already on the record wins over the configured
/// source. Falsy configured values stamp nothing.
///
/// ```
/// use httplog_formats::format::{Format, TrackIdFormat, TrackIdOptions, TrackIdSource};
/// use httplog_formats::LogRecord;
/// use serde_json::json;
///
/// let format = TrackIdFormat::new(
///     TrackIdOptions::default().track_id(TrackIdSource::generator(|record| {
///         json!(format!("{}-1", record.level().unwrap_or("none")))
///     })),
/// );
/// let out = format.transform(LogRecord::with_message("info", "x"));
/// assert_eq!(out.get("trackId"), Some(&json!("info-1")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct TrackIdFormat {
    options: TrackIdOptions,
}

impl TrackIdFormat {
    /// Create the format
    pub fn new(options: TrackIdOptions) -> Self {
        Self { options }
    }

    /// Create the format from loosely typed JSON options
    pub fn from_value(options: &Value) -> Self {
        Self::new(crate::config::resolve(options))
    }
}

impl Format for TrackIdFormat {
    fn name(&self) -> &'static str {
        "track-id"
    }

    fn transform(&self, mut record: LogRecord) -> LogRecord {
        if !self.options.enabled {
            return record;
        }

        let track_id = match record.get(TRACK_ID_KEY) {
            Some(existing) if is_truthy(existing) => existing.clone(),
            _ => match &self.options.track_id {
                Some(source) if source.is_set() => source.produce(&record),
                _ => return record,
            },
        };
        record.insert(self.options.key.clone(), track_id);
        record
    }
}
