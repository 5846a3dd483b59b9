//! Error types for httplog-formats

use thiserror::Error;

/// Result type alias for formatter internals
pub type Result<T, E = FormatError> = std::result::Result<T, E>;

/// Errors raised inside a format step.
///
/// None of these escape [`Format::transform`](crate::format::Format::transform):
/// formats recover locally and report through `tracing`.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A classified HTTP error carried neither a `request` nor a `response`
    #[error("HTTP error object has neither a request nor a response to describe")]
    MissingMetaSource,

    /// A value that must be a JSON object was something else
    #[error("expected an object at `{path}`, found {found}")]
    NotAnObject {
        /// Dotted path of the offending value
        path: String,
        /// JSON type name of what was found
        found: &'static str,
    },

    /// `baseURL` and `url` could not be joined into an absolute URL
    #[error("cannot resolve `{url}` against base `{base}`: {source}")]
    UrlResolution {
        /// The base URL
        base: String,
        /// The relative or absolute request URL
        url: String,
        /// Underlying parse error
        #[source]
        source: url::ParseError,
    },

    /// Options could not be deserialized into the typed options struct
    #[error("invalid format options: {0}")]
    Options(#[from] serde_json::Error),

    /// Environment configuration could not be loaded
    #[cfg(feature = "config")]
    #[error("environment configuration error: {0}")]
    Env(#[from] envy::Error),
}

impl FormatError {
    /// Build a [`FormatError::NotAnObject`] for `value` found at `path`
    pub fn not_an_object(path: impl Into<String>, value: &serde_json::Value) -> Self {
        Self::NotAnObject {
            path: path.into(),
            found: json_type_name(value),
        }
    }
}

/// JSON type name used in diagnostics
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
