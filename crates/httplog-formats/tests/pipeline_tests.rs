//! Integration tests for httplog-formats
//!
//! These tests drive complete format chains over records shaped like the
//! ones an HTTP client logger produces.

use httplog_formats::format::{
    DescriptionOptions, FilterOptions, HttpOptions, MaskOptions, RequestIdOptions, TrackIdOptions,
};
use httplog_formats::mask::Severity;
use httplog_formats::{
    DescriptionFormat, FilterFormat, Format, FormatChain, HttpFormat, LogRecord, MaskFormat,
    RequestIdFormat, TrackIdFormat,
};
use serde_json::{json, Value};

const REQUEST_STARTED_AT: u64 = 1676735337786;
const BASE_URL: &str = "https://spin-tm-proxy.infotorg-eastnor-test.dds.evry.cloud/";

fn record(value: Value) -> LogRecord {
    LogRecord::from_value(value).expect("fixture is an object")
}

fn request_config() -> Value {
    json!({
        "url": "/",
        "method": "post",
        "data": {
            "product": "hentEiersoek",
            "data": {"fornavn": "Anngrim", "etternavn": "Olsvik"}
        },
        "timeout": 0,
        "headers": {
            "common": {"Accept": "application/json, text/plain, */*"},
            "X-Session": "1621448702.23937#Y8dbR/s1Wi3Wep830IUp8IoZDzz",
            "Content-type": "application/json",
            "delete": {},
            "get": {},
            "head": {},
            "post": {"Content-Type": "application/x-www-form-urlencoded"},
            "put": {"Content-Type": "application/x-www-form-urlencoded"},
            "patch": {"Content-Type": "application/x-www-form-urlencoded"}
        },
        "baseURL": BASE_URL,
        "requestStartedAt": REQUEST_STARTED_AT,
        "isAxiosRequest": true
    })
}

fn response() -> Value {
    json!({
        "status": 200,
        "statusText": "OK",
        "headers": {
            "content-length": "3513",
            "content-type": "application/json",
            "date": "Mon Feb 06 2023 13:35:00 GMT",
            "server-timing": "dtRpid;desc=\"958029972\"",
            "connection": "close"
        },
        "config": {
            "url": "/",
            "method": "post",
            "data": "{\"product\":\"hentEiersoek\"}",
            "headers": {
                "Accept": "application/json, text/plain, */*",
                "Content-Type": "application/json",
                "User-Agent": "axios/0.21.1",
                "Content-Length": 76
            },
            "baseURL": BASE_URL,
            "xsrfCookieName": "XSRF-TOKEN",
            "xsrfHeaderName": "X-XSRF-TOKEN",
            "requestStartedAt": REQUEST_STARTED_AT
        },
        "responseTime": 100
    })
}

fn not_found_error() -> Value {
    let config = json!({
        "timeout": 0,
        "xsrfCookieName": "XSRF-TOKEN",
        "xsrfHeaderName": "X-XSRF-TOKEN",
        "maxContentLength": -1,
        "maxBodyLength": -1,
        "headers": {
            "Accept": "application/json, text/plain, */*",
            "User-Agent": "axios/1.3.3"
        },
        "method": "get",
        "url": "http://localhost:1337/uploads/non-existent.svg",
        "requestStartedAt": REQUEST_STARTED_AT
    });
    json!({
        "level": "warn",
        "name": "AxiosError",
        "message": "Request failed with status code 404",
        "config": config,
        "request": {
            "method": "GET",
            "path": "/uploads/non-existent.svg",
            "host": "localhost",
            "protocol": "http:"
        },
        "response": {
            "status": 404,
            "statusText": "Not Found",
            "headers": {
                "content-type": "application/json; charset=utf-8",
                "content-length": "94",
                "connection": "close"
            },
            "config": config,
            "data": {
                "data": null,
                "error": {"status": 404, "name": "NotFoundError", "message": "Not Found", "details": {}}
            },
            "responseTime": 18
        },
        "requestTraceId": "test1234-request-id",
        "timestamp": "2023-02-07 17:53:36.730"
    })
}

fn enotfound_error() -> Value {
    json!({
        "level": "error",
        "isAxiosError": true,
        "message": "getaddrinfo ENOTFOUND non-existent-domain-for-sure.com",
        "code": "ENOTFOUND",
        "errno": -3008,
        "syscall": "getaddrinfo",
        "hostname": "non-existent-domain-for-sure.com",
        "address": "1.2.3.4",
        "port": 80,
        "status": null,
        "stack": "Error: getaddrinfo ENOTFOUND non-existent-domain-for-sure.com\n    at GetAddrInfoReqWrap.onlookup",
        "config": {
            "headers": {
                "Accept": "application/json, text/plain, */*",
                "User-Agent": "axios/1.3.3"
            },
            "method": "get",
            "url": "http://non-existent-domain-for-sure.com/",
            "requestStartedAt": REQUEST_STARTED_AT
        },
        "request": {
            "method": "GET",
            "path": "/",
            "host": "non-existent-domain-for-sure.com",
            "protocol": "http:"
        }
    })
}

// ============================================================================
// HTTP Format Tests
// ============================================================================

mod http_tests {
    use super::*;

    #[test]
    fn test_request_meta() {
        let format = HttpFormat::new(HttpOptions::default().meta(true));
        let out = format.transform(record(json!({"level": "debug", "message": request_config()})));

        assert_eq!(out.level(), Some("debug"));
        assert_eq!(out.message(), Some(&json!(format!("POST {BASE_URL}"))));
        assert_eq!(out.get("description"), Some(&json!("Axios request")));

        let mut expected = request_config();
        expected.as_object_mut().unwrap().remove("isAxiosRequest");
        assert_eq!(out.get("meta"), Some(&json!({"req": expected})));
    }

    #[test]
    fn test_response_meta_and_passthrough() {
        let format = HttpFormat::from_value(&json!({"meta": true}));
        let out = format.transform(record(json!({
            "message": response(),
            "requestId": "1234-request-id",
            "timestamp": "2023-02-07 17:53:36.730"
        })));

        assert_eq!(
            out.message(),
            Some(&json!(format!("POST {BASE_URL} 200 OK 100ms")))
        );
        assert_eq!(out.get("requestId"), Some(&json!("1234-request-id")));
        assert_eq!(out.get("timestamp"), Some(&json!("2023-02-07 17:53:36.730")));
        assert_eq!(out.get("description"), Some(&json!("Axios response")));

        let meta = out.get("meta").unwrap();
        assert_eq!(meta["req"]["xsrfCookieName"], json!("XSRF-TOKEN"));
        assert_eq!(meta["req"]["headers"]["User-Agent"], json!("axios/0.21.1"));
        assert_eq!(meta["res"]["status"], json!(200));
        assert_eq!(meta["res"]["responseTime"], json!(100));
        assert!(meta["res"].get("config").is_none());
    }

    #[test]
    fn test_not_found_error() {
        let format = HttpFormat::new(HttpOptions::default().meta(true));
        let out = format.transform(record(not_found_error()));

        assert_eq!(out.level(), Some("warn"));
        assert_eq!(
            out.message(),
            Some(&json!(
                "GET http://localhost:1337/uploads/non-existent.svg 404 Not Found 18ms"
            ))
        );
        assert_eq!(out.get("description"), Some(&json!("Axios error")));
        assert_eq!(out.get("requestTraceId"), Some(&json!("test1234-request-id")));
        assert_eq!(
            out.get("meta"),
            Some(&json!({
                "req": {
                    "timeout": 0,
                    "xsrfCookieName": "XSRF-TOKEN",
                    "xsrfHeaderName": "X-XSRF-TOKEN",
                    "headers": {
                        "Accept": "application/json, text/plain, */*",
                        "User-Agent": "axios/1.3.3"
                    },
                    "method": "get",
                    "url": "http://localhost:1337/uploads/non-existent.svg",
                    "requestStartedAt": REQUEST_STARTED_AT
                },
                "res": {
                    "status": 404,
                    "statusText": "Not Found",
                    "headers": {
                        "content-type": "application/json; charset=utf-8",
                        "content-length": "94",
                        "connection": "close"
                    },
                    "data": {
                        "data": null,
                        "error": {"status": 404, "name": "NotFoundError", "message": "Not Found", "details": {}}
                    },
                    "responseTime": 18
                }
            }))
        );
    }

    #[test]
    fn test_network_error_meta_shape() {
        let expected_res = json!({
            "code": "ENOTFOUND",
            "errno": -3008,
            "syscall": "getaddrinfo",
            "hostname": "non-existent-domain-for-sure.com",
            "address": "1.2.3.4",
            "port": 80,
            "status": null
        });

        let out = HttpFormat::new(HttpOptions::default().meta(true))
            .transform(record(enotfound_error()));
        assert_eq!(
            out.message(),
            Some(&json!("getaddrinfo ENOTFOUND non-existent-domain-for-sure.com"))
        );
        assert_eq!(
            out.get("meta"),
            Some(&json!({
                "req": {
                    "headers": {
                        "Accept": "application/json, text/plain, */*",
                        "User-Agent": "axios/1.3.3"
                    },
                    "method": "get",
                    "url": "http://non-existent-domain-for-sure.com/",
                    "requestStartedAt": REQUEST_STARTED_AT
                },
                "res": expected_res
            }))
        );

        let out = HttpFormat::new(HttpOptions::default().meta(true).stack(true))
            .transform(record(enotfound_error()));
        let res = out.get("meta").unwrap()["res"].as_object().unwrap().clone();
        assert_eq!(res.len(), 8);
        assert!(res["stack"]
            .as_str()
            .unwrap()
            .starts_with("Error: getaddrinfo ENOTFOUND non-existent-domain-for-sure.com"));
    }

    #[test]
    fn test_meta_disabled_leaves_placeholder() {
        for fixture in [
            json!({"message": request_config()}),
            json!({"message": response()}),
            not_found_error(),
            enotfound_error(),
        ] {
            let out = HttpFormat::default().transform(record(fixture));
            assert_eq!(out.get("meta"), Some(&json!({})));
        }
    }
}

// ============================================================================
// Chain Tests
// ============================================================================

mod chain_tests {
    use super::*;

    #[test]
    fn test_standard_chain_filters_then_masks() {
        let chain = FormatChain::standard(
            HttpOptions::default().meta(true),
            DescriptionOptions::new("unused"),
            FilterOptions::default().black_list([
                "req.headers.common",
                "req.headers.delete",
                "req.headers.get",
                "req.headers.head",
                "req.headers.post",
                "req.headers.put",
                "req.headers.patch",
                "req.data",
            ]),
            MaskOptions::default()
                .white_list(["req.url", "req.method", "req.baseURL"])
                .fully_masked_fields(["req.headers.X-Session"]),
        );

        let out = chain.transform(record(json!({"level": "debug", "message": request_config()})));

        assert_eq!(out.message(), Some(&json!(format!("POST {BASE_URL}"))));
        assert_eq!(out.get("description"), Some(&json!("Axios request")));
        assert_eq!(
            out.get("meta"),
            Some(&json!({
                "req": {
                    "url": "/",
                    "method": "post",
                    "baseURL": BASE_URL,
                    "timeout": 0,
                    "requestStartedAt": REQUEST_STARTED_AT,
                    "headers": {
                        "X-Session": "******************************",
                        "Content-type": "ap************on"
                    }
                }
            }))
        );
    }

    #[test]
    fn test_plain_records_pass_through_every_format() {
        let chain = FormatChain::new()
            .with(HttpFormat::new(HttpOptions::default().meta(true)))
            .with(FilterFormat::new(FilterOptions::default().black_list(["req"])))
            .with(MaskFormat::new(MaskOptions::default().severity(Severity::Strict)));

        let plain = record(json!({"level": "info", "message": "Not an HTTP object"}));
        assert_eq!(chain.transform(plain.clone()), plain);
    }

    #[test]
    fn test_stampers() {
        let chain = FormatChain::new()
            .with(DescriptionFormat::new(DescriptionOptions::new("payments")))
            .with(TrackIdFormat::new(TrackIdOptions::default().track_id(json!("track-1"))))
            .with(RequestIdFormat::new(RequestIdOptions::uuid()));
        assert_eq!(chain.names(), ["description", "track-id", "request-id"]);

        let out = chain.transform(LogRecord::with_message("info", "charged"));
        assert_eq!(out.get("description"), Some(&json!("payments")));
        assert_eq!(out.get("trackId"), Some(&json!("track-1")));
        assert!(out.get("requestId").and_then(Value::as_str).is_some());

        let again = chain.transform(out.clone());
        assert_eq!(again, out);
    }

    #[test]
    fn test_strict_masking_of_network_error() {
        let chain = FormatChain::new()
            .with(HttpFormat::new(HttpOptions::default().meta(true)))
            .with(MaskFormat::new(
                MaskOptions::default()
                    .severity(Severity::Strict)
                    .white_list(["res.code", "req.url"]),
            ));

        let out = chain.transform(record(enotfound_error()));
        let meta = out.get("meta").unwrap();
        assert_eq!(meta["res"]["code"], json!("ENOTFOUND"));
        assert_eq!(meta["res"]["port"], json!("**"));
        assert_eq!(meta["res"]["status"], json!("****"));
        assert_eq!(meta["req"]["url"], json!("http://non-existent-domain-for-sure.com/"));
        assert_eq!(meta["req"]["method"], json!("***"));
    }
}

// ============================================================================
// Error Channel Tests
// ============================================================================

mod error_channel_tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    /// Captures the level of every event
    #[derive(Clone, Default)]
    struct EventCapture {
        levels: Arc<Mutex<Vec<tracing::Level>>>,
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.levels.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn test_meta_failure_is_reported_not_raised() {
        let capture = EventCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        let out = tracing::subscriber::with_default(subscriber, || {
            HttpFormat::new(HttpOptions::default().meta(true)).transform(record(json!({
                "level": "error",
                "isAxiosError": true,
                "message": "Request aborted"
            })))
        });

        assert_eq!(out.message(), Some(&json!("Request aborted")));
        assert_eq!(out.get("description"), Some(&json!("Axios error")));
        assert_eq!(out.get("meta"), Some(&json!({})));
        assert!(capture
            .levels
            .lock()
            .unwrap()
            .contains(&tracing::Level::ERROR));
    }

    #[test]
    fn test_malformed_options_never_surface() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let format = MaskFormat::from_value(&json!({"severity": 7, "target": ""}));
        assert_eq!(format.policy().severity, Severity::Partial);

        let format = FilterFormat::from_value(&json!(["not", "an", "object"]));
        assert!(format.policy().black_list.is_empty());
    }
}
