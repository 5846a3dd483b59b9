//! Recognizing HTTP client requests, responses and errors in a record
//!
//! Each kind has a primary signal, an explicit marker set in-band by an
//! upstream interceptor, and requests and responses also have a structural
//! fallback for objects that arrive without that instrumentation:
//!
//! | Kind | Where | Primary | Fallback |
//! |---|---|---|---|
//! | error | the record itself | `isAxiosError: true` or `name: "AxiosError"` | none |
//! | request | `message` object | truthy `isAxiosRequest` | has both `method` and `url` |
//! | response | `message` object | truthy `isAxiosResponse` | `config.headers.User-Agent` mentions the client |
//!
//! A record matching none of them is not an error; formats pass it
//! through untouched.

use crate::record::{is_truthy, LogRecord};
use serde_json::{Map, Value};

/// Flag set on error objects
pub const ERROR_MARKER: &str = "isAxiosError";
/// Error type name carried in `name` by newer clients
pub const ERROR_TYPE_NAME: &str = "AxiosError";
/// Flag set on request configs by the request interceptor
pub const REQUEST_MARKER: &str = "isAxiosRequest";
/// Flag set on responses by the response interceptor
pub const RESPONSE_MARKER: &str = "isAxiosResponse";
/// Substring of the client's default `User-Agent`
pub const CLIENT_USER_AGENT: &str = "axios";

const REQUEST_SHAPE_FIELDS: [&str; 2] = ["method", "url"];

/// Which HTTP shapes a record matched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    /// The record is an HTTP client error
    pub is_error: bool,
    /// `message` is a request config
    pub is_request: bool,
    /// `message` is a response
    pub is_response: bool,
}

impl Classification {
    /// Whether any HTTP shape matched
    pub fn is_http(&self) -> bool {
        self.is_error || self.is_request || self.is_response
    }

    /// The single kind this record is treated as.
    ///
    /// Errors take precedence, then responses, then requests. A response
    /// whose message also has the request shape is still a response.
    pub fn kind(&self) -> Option<HttpKind> {
        if self.is_error {
            Some(HttpKind::Error)
        } else if self.is_response {
            Some(HttpKind::Response)
        } else if self.is_request {
            Some(HttpKind::Request)
        } else {
            None
        }
    }
}

/// Kind of HTTP object found in a record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpKind {
    /// A request config about to be sent
    Request,
    /// A completed response
    Response,
    /// A failed request
    Error,
}

/// How far an errored request got
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorOutcome {
    /// The server answered with an error status
    WithResponse,
    /// A request went out but nothing came back (`ECONNREFUSED`,
    /// `ENOTFOUND`, ...)
    NoResponse,
    /// Neither a request nor a response is attached
    Unsent,
}

/// A record's HTTP payload, tagged with its kind
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HttpObject<'a> {
    /// `message` holds a request config
    Request(&'a Map<String, Value>),
    /// `message` holds a response
    Response(&'a Map<String, Value>),
    /// The record itself is the error
    Error {
        /// All fields of the error record
        error: &'a Map<String, Value>,
        /// Whether a response or request is attached
        outcome: ErrorOutcome,
    },
}

impl<'a> HttpObject<'a> {
    /// Classify `record` and borrow its HTTP payload
    pub fn from_record(record: &'a LogRecord) -> Option<Self> {
        let kind = classify(record).kind()?;
        let message = record.message().and_then(Value::as_object);
        match kind {
            HttpKind::Error => Some(Self::Error {
                error: record.as_map(),
                outcome: error_outcome(record.as_map()),
            }),
            HttpKind::Request => message.map(Self::Request),
            HttpKind::Response => message.map(Self::Response),
        }
    }

    /// The kind tag
    pub fn kind(&self) -> HttpKind {
        match self {
            Self::Request(_) => HttpKind::Request,
            Self::Response(_) => HttpKind::Response,
            Self::Error { .. } => HttpKind::Error,
        }
    }
}

/// Classify a record.
///
/// ```
/// use httplog_formats::classify::classify;
/// use httplog_formats::LogRecord;
/// use serde_json::json;
///
/// let record = LogRecord::with_message("debug", json!({"method": "get", "url": "/"}));
/// assert!(classify(&record).is_request);
///
/// let record = LogRecord::with_message("debug", json!({"url": "/"}));
/// assert!(!classify(&record).is_http());
/// ```
pub fn classify(record: &LogRecord) -> Classification {
    let is_error = is_error(record.as_map());
    let message = record.message().and_then(Value::as_object);

    Classification {
        is_error,
        is_request: !is_error && message.is_some_and(is_request),
        is_response: message.is_some_and(is_response),
    }
}

/// Whether `fields` carry the error marker or error type name
pub fn is_error(fields: &Map<String, Value>) -> bool {
    fields.get(ERROR_MARKER) == Some(&Value::Bool(true))
        || fields.get("name").and_then(Value::as_str) == Some(ERROR_TYPE_NAME)
}

/// Whether `message` is a request config
pub fn is_request(message: &Map<String, Value>) -> bool {
    if message.get(REQUEST_MARKER).is_some_and(is_truthy) {
        return true;
    }
    REQUEST_SHAPE_FIELDS
        .iter()
        .all(|field| message.contains_key(*field))
}

/// Whether `message` is a response
pub fn is_response(message: &Map<String, Value>) -> bool {
    if message.get(RESPONSE_MARKER).is_some_and(is_truthy) {
        return true;
    }
    message
        .get("config")
        .and_then(|config| config.get("headers"))
        .and_then(|headers| headers.get("User-Agent"))
        .and_then(Value::as_str)
        .is_some_and(|agent| agent.contains(CLIENT_USER_AGENT))
}

/// Determine how far an errored request got
pub fn error_outcome(error: &Map<String, Value>) -> ErrorOutcome {
    let present = |key: &str| error.get(key).is_some_and(is_truthy);
    if present("response") {
        ErrorOutcome::WithResponse
    } else if present("request") {
        ErrorOutcome::NoResponse
    } else {
        ErrorOutcome::Unsent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> LogRecord {
        LogRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_error_markers() {
        assert!(classify(&record(json!({"message": "x", "isAxiosError": true}))).is_error);
        assert!(classify(&record(json!({"message": "x", "name": "AxiosError"}))).is_error);
        assert!(!classify(&record(json!({"message": "x", "isAxiosError": "yes"}))).is_error);
        assert!(!classify(&record(json!({"message": "x", "name": "TypeError"}))).is_error);
    }

    #[test]
    fn test_request_needs_marker_or_both_fields() {
        let marked = record(json!({"message": {"isAxiosRequest": true}}));
        assert_eq!(classify(&marked).kind(), Some(HttpKind::Request));

        let shaped = record(json!({"message": {"method": "post", "url": "/"}}));
        assert_eq!(classify(&shaped).kind(), Some(HttpKind::Request));

        for partial in [json!({"method": "post"}), json!({"url": "/"})] {
            let r = record(json!({"message": partial}));
            assert!(!classify(&r).is_request);
        }
    }

    #[test]
    fn test_response_marker_and_user_agent_fallback() {
        let marked = record(json!({"message": {"status": 200, "isAxiosResponse": true}}));
        assert_eq!(classify(&marked).kind(), Some(HttpKind::Response));

        let sniffed = record(json!({
            "message": {"status": 200, "config": {"headers": {"User-Agent": "axios/0.21.1"}}}
        }));
        assert_eq!(classify(&sniffed).kind(), Some(HttpKind::Response));

        let other_client = record(json!({
            "message": {"status": 200, "config": {"headers": {"User-Agent": "curl/8.0"}}}
        }));
        assert!(!classify(&other_client).is_http());
    }

    #[test]
    fn test_response_wins_over_request_shape() {
        let both = record(json!({
            "message": {
                "method": "get",
                "url": "/users",
                "status": 200,
                "isAxiosResponse": true,
                "config": {"method": "get", "url": "/users"}
            }
        }));
        let classification = classify(&both);
        assert!(classification.is_request && classification.is_response);
        assert_eq!(classification.kind(), Some(HttpKind::Response));
        assert!(matches!(
            HttpObject::from_record(&both),
            Some(HttpObject::Response(_))
        ));
    }

    #[test]
    fn test_string_message_is_not_request_or_response() {
        let r = record(json!({"level": "info", "message": "plain text"}));
        assert_eq!(classify(&r), Classification::default());
        assert!(HttpObject::from_record(&r).is_none());
    }

    #[test]
    fn test_error_outcomes() {
        let with_response = record(json!({"isAxiosError": true, "request": {}, "response": {"status": 404}}));
        let no_response = record(json!({"isAxiosError": true, "request": {"path": "/"}}));
        let unsent = record(json!({"isAxiosError": true, "message": "boom"}));

        let outcome = |r: &LogRecord| match HttpObject::from_record(r) {
            Some(HttpObject::Error { outcome, .. }) => Some(outcome),
            _ => None,
        };
        assert_eq!(outcome(&with_response), Some(ErrorOutcome::WithResponse));
        assert_eq!(outcome(&no_response), Some(ErrorOutcome::NoResponse));
        assert_eq!(outcome(&unsent), Some(ErrorOutcome::Unsent));
    }
}
