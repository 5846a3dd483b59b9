//! Projection of HTTP objects into a canonical `{req, res}` meta shape
//!
//! Request configs describe themselves: `url`, `method` and `headers`
//! live at the top level. Responses and errors describe the request one
//! level down, under `config`. [`extract_meta`] reconciles the two by
//! always lifting `config` into `req`, so a response's request headers
//! end up at `meta.req.headers`, never at `meta.res.config.headers`.

use crate::error::{FormatError, Result};
use serde_json::{Map, Value};

/// Fields a network-level failure carries (`ECONNREFUSED`, `ENOTFOUND`, ...)
pub const NETWORK_ERROR_FIELDS: [&str; 6] =
    ["errno", "syscall", "hostname", "code", "address", "port"];

/// Timestamp stamped on requests by the timing interceptor
pub const START_TIME_FIELD: &str = "requestStartedAt";

/// Nested request description on responses and errors
pub const CONFIG_FIELD: &str = "config";

const BASE_ALLOWED_FIELDS: [&str; 11] = [
    "url",
    "baseURL",
    "method",
    "data",
    "headers",
    "status",
    "statusText",
    CONFIG_FIELD,
    "xsrfCookieName",
    "xsrfHeaderName",
    "timeout",
];

/// Keys that belong to the HTTP error object and are never copied to
/// the top level of the formatted record
const INTERNAL_KEYS: [&str; 5] = [CONFIG_FIELD, "request", "response", "isAxiosError", "toJSON"];

/// Which side of the exchange the top-level fields describe
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaRole {
    /// `meta.req`
    Req,
    /// `meta.res`
    Res,
}

impl MetaRole {
    /// Key used in the meta object
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Req => "req",
            Self::Res => "res",
        }
    }
}

/// The closed set of HTTP fields copied into meta.
///
/// Only the inclusion of `stack` is configurable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowedFields {
    fields: Vec<&'static str>,
}

impl AllowedFields {
    /// Build the allow list, with or without `stack`
    pub fn new(include_stack: bool) -> Self {
        let mut fields: Vec<&'static str> = BASE_ALLOWED_FIELDS.to_vec();
        fields.extend(NETWORK_ERROR_FIELDS);
        if include_stack {
            fields.push("stack");
        }
        fields.push("responseTime");
        fields.push(START_TIME_FIELD);
        Self { fields }
    }

    /// Whether `field` may be copied
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| *f == field)
    }
}

impl Default for AllowedFields {
    fn default() -> Self {
        Self::new(false)
    }
}

/// Project the allowed top-level fields of `source` under `role`.
///
/// `config`, when allowed and present, is extracted recursively and its
/// result becomes `req`. Fails if `config` is not an object.
///
/// ```
/// use httplog_formats::meta::{extract_meta, AllowedFields, MetaRole};
/// use serde_json::json;
///
/// let response = json!({
///     "status": 200,
///     "request": {"socket": "..."},
///     "config": {"method": "get", "url": "/", "adapter": "http"}
/// });
/// let meta = extract_meta(response.as_object().unwrap(), MetaRole::Res, &AllowedFields::default()).unwrap();
///
/// assert_eq!(
///     serde_json::Value::Object(meta),
///     json!({"res": {"status": 200}, "req": {"method": "get", "url": "/"}})
/// );
/// ```
pub fn extract_meta(
    source: &Map<String, Value>,
    role: MetaRole,
    allowed: &AllowedFields,
) -> Result<Map<String, Value>> {
    let mut projected = Map::new();
    let mut request = None;

    for (key, value) in source {
        if !allowed.contains(key) {
            continue;
        }
        if key == CONFIG_FIELD {
            let config = value
                .as_object()
                .ok_or_else(|| FormatError::not_an_object(CONFIG_FIELD, value))?;
            let mut nested = extract_meta(config, MetaRole::Req, allowed)?;
            request = nested.remove(MetaRole::Req.as_str());
        } else {
            projected.insert(key.clone(), value.clone());
        }
    }

    let mut meta = Map::new();
    meta.insert(role.as_str().to_string(), Value::Object(projected));
    if let Some(request) = request {
        meta.insert(MetaRole::Req.as_str().to_string(), request);
    }
    Ok(meta)
}

/// Assemble the meta source for an error that never got a response.
///
/// Pulls the network error fields, `config` and `stack` from the error
/// itself; `status` is always present and `null` when the error has none.
pub fn network_error_source(error: &Map<String, Value>) -> Map<String, Value> {
    let mut source = Map::new();
    for key in NETWORK_ERROR_FIELDS {
        if let Some(value) = error.get(key) {
            source.insert(key.to_string(), value.clone());
        }
    }
    source.insert(
        "status".to_string(),
        error.get("status").cloned().unwrap_or(Value::Null),
    );
    for key in [CONFIG_FIELD, "stack"] {
        if let Some(value) = error.get(key) {
            source.insert(key.to_string(), value.clone());
        }
    }
    source
}

/// Top-level record fields that are not part of the HTTP object.
///
/// Keeps caller metadata such as timestamps or request ids while dropping
/// the error's internals (`config`, `request`, `response`, the network
/// error fields, ...).
pub fn passthrough_fields(record: &Map<String, Value>) -> Map<String, Value> {
    record
        .iter()
        .filter(|(key, _)| {
            !INTERNAL_KEYS.contains(&key.as_str()) && !NETWORK_ERROR_FIELDS.contains(&key.as_str())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
