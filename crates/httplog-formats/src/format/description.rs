//! Fallback description stamping

use super::Format;
use crate::record::{is_truthy, LogRecord, DESCRIPTION_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options for [`DescriptionFormat`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptionOptions {
    /// Stamped on records without a description
    pub description: Option<String>,
}

impl DescriptionOptions {
    /// Options stamping `description`
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }
}

/// Adds a description to records that lack one.
///
/// ```
/// use httplog_formats::format::{DescriptionFormat, DescriptionOptions, Format};
/// use httplog_formats::LogRecord;
/// use serde_json::json;
///
/// let format = DescriptionFormat::new(DescriptionOptions::new("billing"));
/// let out = format.transform(LogRecord::with_message("info", "charged"));
/// assert_eq!(out.get("description"), Some(&json!("billing")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DescriptionFormat {
    description: Option<String>,
}

impl DescriptionFormat {
    /// Create the format
    pub fn new(options: DescriptionOptions) -> Self {
        Self {
            description: options.description.filter(|d| !d.is_empty()),
        }
    }

    /// Create the format from loosely typed JSON options
    pub fn from_value(options: &Value) -> Self {
        Self::new(crate::config::resolve(options))
    }
}

impl Format for DescriptionFormat {
    fn name(&self) -> &'static str {
        "description"
    }

    fn transform(&self, mut record: LogRecord) -> LogRecord {
        let Some(description) = &self.description else {
            return record;
        };
        if !record.get(DESCRIPTION_KEY).is_some_and(is_truthy) {
            record.insert(DESCRIPTION_KEY, description.as_str());
        }
        record
    }
}
