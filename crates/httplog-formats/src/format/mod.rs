//! Record transformers and the chain that runs them
//!
//! A [`Format`] takes a [`LogRecord`] by value and returns the record the
//! next format should see. Formats never fail: records they do not
//! understand pass through, and internal problems are reported through
//! `tracing`.
//!
//! [`FormatChain`] runs formats in registration order:
//!
//! ```
//! use httplog_formats::format::{FormatChain, HttpFormat, MaskFormat, MaskOptions};
//! use httplog_formats::LogRecord;
//! use serde_json::json;
//!
//! let chain = FormatChain::new()
//!     .with(HttpFormat::default())
//!     .with(MaskFormat::new(MaskOptions::default()));
//! assert_eq!(chain.names(), ["http", "mask"]);
//!
//! let record = LogRecord::with_message("info", "plain text");
//! assert_eq!(chain.transform(record.clone()), record);
//! ```

mod description;
mod filter;
mod http;
mod mask;
mod request_id;
mod track_id;

pub use description::{DescriptionFormat, DescriptionOptions};
pub use filter::{FilterFormat, FilterOptions};
pub use http::{resolve_url, HttpFormat, HttpOptions};
pub use mask::{MaskFormat, MaskOptions};
pub use request_id::{RequestIdFormat, RequestIdGenerator, RequestIdOptions, REQUEST_ID_KEY};
pub use track_id::{TrackIdFormat, TrackIdOptions, TrackIdSource, TRACK_ID_KEY};

use crate::path::FieldPath;
use crate::record::LogRecord;
use serde_json::Value;
use std::fmt;

/// Subtree the filter and mask formats work on unless told otherwise
pub const DEFAULT_TARGET: &str = "meta";

pub(crate) fn default_target() -> FieldPath {
    FieldPath::from_key(DEFAULT_TARGET)
}

/// A single step of a log formatting pipeline
pub trait Format: Send + Sync {
    /// Short name used for registration and diagnostics
    fn name(&self) -> &'static str;

    /// Transform one record
    fn transform(&self, record: LogRecord) -> LogRecord;
}

impl<F: Format + ?Sized> Format for Box<F> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn transform(&self, record: LogRecord) -> LogRecord {
        (**self).transform(record)
    }
}

/// A [`Format`] built from a closure
pub struct FnFormat<F> {
    name: &'static str,
    f: F,
}

/// Wrap a closure as a [`Format`].
///
/// ```
/// use httplog_formats::format::{from_fn, Format};
/// use httplog_formats::LogRecord;
///
/// let upper = from_fn("level-upper", |mut record: LogRecord| {
///     if let Some(level) = record.level().map(str::to_uppercase) {
///         record.insert("level", level);
///     }
///     record
/// });
/// let out = upper.transform(LogRecord::with_message("warn", "x"));
/// assert_eq!(out.level(), Some("WARN"));
/// ```
pub fn from_fn<F>(name: &'static str, f: F) -> FnFormat<F>
where
    F: Fn(LogRecord) -> LogRecord + Send + Sync,
{
    FnFormat { name, f }
}

impl<F> Format for FnFormat<F>
where
    F: Fn(LogRecord) -> LogRecord + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn transform(&self, record: LogRecord) -> LogRecord {
        (self.f)(record)
    }
}

impl<F> fmt::Debug for FnFormat<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFormat").field("name", &self.name).finish()
    }
}

/// An ordered list of formats applied one after another
#[derive(Default)]
pub struct FormatChain {
    formats: Vec<Box<dyn Format>>,
}

impl FormatChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// The canonical pipeline: http, description, filter, mask
    pub fn standard(
        http: HttpOptions,
        description: DescriptionOptions,
        filter: FilterOptions,
        mask: MaskOptions,
    ) -> Self {
        Self::new()
            .with(HttpFormat::new(http))
            .with(DescriptionFormat::new(description))
            .with(FilterFormat::new(filter))
            .with(MaskFormat::new(mask))
    }

    /// Append a format
    ///
    /// Formats run in the order they are added.
    pub fn push(&mut self, format: Box<dyn Format>) {
        self.formats.push(format);
    }

    /// Builder form of [`push`](Self::push)
    pub fn with<F: Format + 'static>(mut self, format: F) -> Self {
        self.push(Box::new(format));
        self
    }

    /// Number of registered formats
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Registered format names, in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.formats.iter().map(|format| format.name()).collect()
    }

    /// Run every format over `record`
    pub fn transform(&self, record: LogRecord) -> LogRecord {
        self.formats
            .iter()
            .fold(record, |record, format| format.transform(record))
    }

    /// Run the chain over a JSON value.
    ///
    /// Non-object values are not records and are returned unchanged.
    pub fn transform_value(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => self.transform(LogRecord::from(map)).into_value(),
            other => {
                tracing::debug!("value is not a log record, skipping format chain");
                other
            }
        }
    }
}

impl Format for FormatChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn transform(&self, record: LogRecord) -> LogRecord {
        FormatChain::transform(self, record)
    }
}

impl fmt::Debug for FormatChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatChain")
            .field("formats", &self.names())
            .finish()
    }
}
