//! Request id stamping

use super::Format;
use crate::record::LogRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Record key the request id is written to
pub const REQUEST_ID_KEY: &str = "requestId";

/// Produces a fresh request id
pub type RequestIdGenerator = Arc<dyn Fn() -> Value + Send + Sync>;

/// Options for [`RequestIdFormat`]
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestIdOptions {
    /// When false every record passes through untouched
    pub enabled: bool,
    /// Id generator; without one nothing is stamped
    #[serde(skip)]
    pub generator: Option<RequestIdGenerator>,
}

impl Default for RequestIdOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            generator: None,
        }
    }
}

impl fmt::Debug for RequestIdOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestIdOptions")
            .field("enabled", &self.enabled)
            .field("generator", &self.generator.is_some())
            .finish()
    }
}

impl RequestIdOptions {
    /// Options generating random v4 UUIDs
    pub fn uuid() -> Self {
        Self::default().generator(|| Value::String(uuid::Uuid::new_v4().to_string()))
    }

    /// Enable or disable the format
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the generator
    pub fn generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.generator = Some(Arc::new(generator));
        self
    }
}

/// Stamps `requestId` on records that lack a truthy one
#[derive(Clone, Debug, Default)]
pub struct RequestIdFormat {
    options: RequestIdOptions,
}

impl RequestIdFormat {
    /// Create the format
    pub fn new(options: RequestIdOptions) -> Self {
        Self { options }
    }
}

impl Format for RequestIdFormat {
    fn name(&self) -> &'static str {
        "request-id"
    }

    fn transform(&self, mut record: LogRecord) -> LogRecord {
        if !self.options.enabled || record.has_truthy(REQUEST_ID_KEY) {
            return record;
        }
        if let Some(generate) = &self.options.generator {
            record.insert(REQUEST_ID_KEY, generate());
        }
        record
    }
}
