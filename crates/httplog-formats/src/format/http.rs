//! Formatting of HTTP client requests, responses and errors
//!
//! [`HttpFormat`] recognizes an HTTP object in a record (see
//! [`classify`](crate::classify)), replaces the message with a one-line
//! summary, stamps a description and, when enabled, attaches the
//! canonical `{req, res}` meta projection.

use super::Format;
use crate::classify::{ErrorOutcome, HttpKind, HttpObject};
use crate::error::{FormatError, Result};
use crate::meta::{self, AllowedFields, MetaRole};
use crate::record::{is_truthy, LogRecord, DESCRIPTION_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Options for [`HttpFormat`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpOptions {
    /// When false every record passes through untouched
    pub enabled: bool,
    /// Description stamped on requests
    pub request_description: String,
    /// Description stamped on responses
    pub response_description: String,
    /// Description stamped on errors
    pub error_description: String,
    /// Attach the `{req, res}` projection
    pub meta: bool,
    /// Record key the projection is stored under
    pub meta_key: String,
    /// Include `stack` in the projection
    pub stack: bool,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            request_description: "Axios request".to_string(),
            response_description: "Axios response".to_string(),
            error_description: "Axios error".to_string(),
            meta: false,
            meta_key: "meta".to_string(),
            stack: false,
        }
    }
}

impl HttpOptions {
    /// Enable or disable the format
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Attach meta
    pub fn meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    /// Store meta under `key`
    pub fn meta_key(mut self, key: impl Into<String>) -> Self {
        self.meta_key = key.into();
        self
    }

    /// Include the error stack in meta
    pub fn stack(mut self, stack: bool) -> Self {
        self.stack = stack;
        self
    }

    /// Set the request description
    pub fn request_description(mut self, description: impl Into<String>) -> Self {
        self.request_description = description.into();
        self
    }

    /// Set the response description
    pub fn response_description(mut self, description: impl Into<String>) -> Self {
        self.response_description = description.into();
        self
    }

    /// Set the error description
    pub fn error_description(mut self, description: impl Into<String>) -> Self {
        self.error_description = description.into();
        self
    }

    fn description_for(&self, kind: HttpKind) -> &str {
        match kind {
            HttpKind::Request => &self.request_description,
            HttpKind::Response => &self.response_description,
            HttpKind::Error => &self.error_description,
        }
    }
}

/// Rewrites HTTP request, response and error records.
///
/// ```
/// use httplog_formats::format::{Format, HttpFormat, HttpOptions};
/// use httplog_formats::LogRecord;
/// use serde_json::json;
///
/// let format = HttpFormat::new(HttpOptions::default().meta(true));
/// let record = LogRecord::with_message("debug", json!({
///     "method": "post",
///     "url": "/",
///     "baseURL": "https://h/",
///     "isAxiosRequest": true
/// }));
///
/// let out = format.transform(record);
/// assert_eq!(out.message(), Some(&json!("POST https://h/")));
/// assert_eq!(out.get("description"), Some(&json!("Axios request")));
/// assert_eq!(
///     out.get("meta"),
///     Some(&json!({"req": {"method": "post", "url": "/", "baseURL": "https://h/"}}))
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct HttpFormat {
    options: HttpOptions,
    allowed: AllowedFields,
}

impl HttpFormat {
    /// Create the format
    pub fn new(options: HttpOptions) -> Self {
        let allowed = AllowedFields::new(options.stack);
        Self { options, allowed }
    }

    /// Create the format from loosely typed JSON options
    pub fn from_value(options: &Value) -> Self {
        Self::new(crate::config::resolve(options))
    }

    /// The resolved options
    pub fn options(&self) -> &HttpOptions {
        &self.options
    }

    fn format(&self, record: &LogRecord, object: HttpObject<'_>) -> LogRecord {
        let kind = object.kind();
        let mut out = LogRecord::from(meta::passthrough_fields(record.as_map()));
        out.insert(self.options.meta_key.clone(), Value::Object(Map::new()));

        if !record.has_truthy(DESCRIPTION_KEY) {
            out.insert(DESCRIPTION_KEY, self.options.description_for(kind));
        }
        if let Some(message) = summary_line(object) {
            out.set_message(message);
        }

        if !self.options.meta {
            return out;
        }
        match self.extract(object) {
            Ok(meta) => {
                out.insert(self.options.meta_key.clone(), Value::Object(meta));
            }
            Err(error) => {
                tracing::error!(%error, kind = ?kind, "failed to extract HTTP meta");
            }
        }
        out
    }

    fn extract(&self, object: HttpObject<'_>) -> Result<Map<String, Value>> {
        match object {
            HttpObject::Request(request) => {
                meta::extract_meta(request, MetaRole::Req, &self.allowed)
            }
            HttpObject::Response(response) => {
                meta::extract_meta(response, MetaRole::Res, &self.allowed)
            }
            HttpObject::Error { error, outcome } => {
                let source = match outcome {
                    ErrorOutcome::WithResponse => {
                        let response = error.get("response").unwrap_or(&Value::Null);
                        response
                            .as_object()
                            .cloned()
                            .ok_or_else(|| FormatError::not_an_object("response", response))?
                    }
                    ErrorOutcome::NoResponse => meta::network_error_source(error),
                    ErrorOutcome::Unsent => return Err(FormatError::MissingMetaSource),
                };
                meta::extract_meta(&source, MetaRole::Res, &self.allowed)
            }
        }
    }
}

impl Format for HttpFormat {
    fn name(&self) -> &'static str {
        "http"
    }

    fn transform(&self, record: LogRecord) -> LogRecord {
        if record.is_empty() {
            return record;
        }
        if !self.options.enabled {
            tracing::debug!("http format disabled, passing record through");
            return record;
        }
        let Some(object) = HttpObject::from_record(&record) else {
            tracing::debug!("record carries no HTTP object, passing through");
            return record;
        };
        self.format(&record, object)
    }
}

/// The one-line message for an HTTP object.
///
/// `None` means the record's own message stays, which is the case for
/// errors that never got a response.
fn summary_line(object: HttpObject<'_>) -> Option<String> {
    match object {
        HttpObject::Request(request) => Some(request_line(request)),
        HttpObject::Response(response) => Some(response_line(response)),
        HttpObject::Error {
            error,
            outcome: ErrorOutcome::WithResponse,
        } => error
            .get("response")
            .and_then(Value::as_object)
            .map(response_line),
        HttpObject::Error { .. } => None,
    }
}

/// `"<METHOD> <url>"`
fn request_line(request: &Map<String, Value>) -> String {
    join_parts([method(request), target(request)])
}

/// `"<METHOD> <url> <status> <statusText> <responseTime>ms"`
///
/// Method and URL come from the response's `config`.
fn response_line(response: &Map<String, Value>) -> String {
    let empty = Map::new();
    let config = response
        .get(meta::CONFIG_FIELD)
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    join_parts([
        method(config),
        target(config),
        text(response.get("status")),
        text(response.get("statusText")),
        text(response.get("responseTime")).map(|ms| format!("{ms}ms")),
    ])
}

fn join_parts<const N: usize>(parts: [Option<String>; N]) -> String {
    parts.into_iter().flatten().collect::<Vec<_>>().join(" ")
}

fn method(fields: &Map<String, Value>) -> Option<String> {
    text(fields.get("method")).map(|method| method.to_uppercase())
}

/// The absolute request URL: `baseURL` joined with `url` when a base is
/// present, `url` alone otherwise
fn target(fields: &Map<String, Value>) -> Option<String> {
    let url = text(fields.get("url"));
    let Some(base) = text(fields.get("baseURL")) else {
        return url;
    };
    let relative = url.as_deref().unwrap_or_default();
    match resolve_url(&base, relative) {
        Ok(resolved) => Some(resolved),
        Err(error) => {
            tracing::warn!(%error, "using request url without base");
            url
        }
    }
}

/// Resolve `url` against `base` the way a browser resolves a link.
///
/// ```
/// use httplog_formats::format::resolve_url;
///
/// assert_eq!(resolve_url("https://h/api/", "users").unwrap(), "https://h/api/users");
/// assert_eq!(resolve_url("https://h/api/", "/").unwrap(), "https://h/");
/// assert_eq!(resolve_url("https://h/", "http://other/x").unwrap(), "http://other/x");
/// assert!(resolve_url("not a url", "/").is_err());
/// ```
pub fn resolve_url(base: &str, url: &str) -> Result<String> {
    let resolve_error = |source| FormatError::UrlResolution {
        base: base.to_string(),
        url: url.to_string(),
        source,
    };
    let base_url = Url::parse(base).map_err(resolve_error)?;
    let joined = base_url.join(url).map_err(resolve_error)?;
    Ok(joined.into())
}

/// Text of a truthy scalar; falsy values and containers yield `None`
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        value if !is_truthy(value) => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
