//! # httplog-formats
//!
//! Log record formats for HTTP client traffic.
//!
//! A log record is an open JSON object with at least a `level` and a
//! `message`. This crate provides composable [`Format`]s that rewrite such
//! records before they are emitted:
//!
//! - [`HttpFormat`] recognizes an HTTP request, response or error in a
//!   record, replaces the message with a one-line summary such as
//!   `POST https://h/ 200 OK 100ms` and projects the exchange into a
//!   canonical `{req, res}` meta object
//! - [`FilterFormat`] removes black-listed fields from a subtree
//! - [`MaskFormat`] redacts scalar values in a subtree according to a
//!   severity level, a white list and a list of fully masked fields
//! - [`DescriptionFormat`], [`TrackIdFormat`] and [`RequestIdFormat`]
//!   stamp simple fields
//!
//! Formats never fail. Records they do not understand pass through, and
//! internal problems are reported through `tracing`.
//!
//! ## Features
//!
//! - `config` - load the standard chain from `HTTPLOG_*` environment
//!   variables (with `.env` file support)
//!
//! ## Example
//!
//! ```
//! use httplog_formats::format::{FilterOptions, HttpOptions, MaskOptions};
//! use httplog_formats::{FormatChain, LogRecord};
//! use serde_json::json;
//!
//! let chain = FormatChain::new()
//!     .with(httplog_formats::HttpFormat::new(HttpOptions::default().meta(true)))
//!     .with(httplog_formats::FilterFormat::new(
//!         FilterOptions::default().black_list(["req.headers"]),
//!     ))
//!     .with(httplog_formats::MaskFormat::new(
//!         MaskOptions::default().white_list(["req.url", "req.method"]),
//!     ));
//!
//! let record = LogRecord::with_message("debug", json!({
//!     "method": "post",
//!     "url": "https://h/login",
//!     "headers": {"Authorization": "Bearer abc"},
//!     "data": {"password": "hunter22"}
//! }));
//!
//! let out = chain.transform(record);
//! assert_eq!(out.message(), Some(&json!("POST https://h/login")));
//! assert_eq!(
//!     out.get("meta"),
//!     Some(&json!({"req": {
//!         "method": "post",
//!         "url": "https://h/login",
//!         "data": {"password": "hu****22"}
//!     }}))
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod classify;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod mask;
pub mod meta;
pub mod path;
pub mod record;

pub use config::FormatsConfig;
pub use error::{FormatError, Result};
pub use format::{
    DescriptionFormat, FilterFormat, Format, FormatChain, HttpFormat, MaskFormat,
    RequestIdFormat, TrackIdFormat,
};
pub use mask::Severity;
pub use path::{FieldPath, FieldSet};
pub use record::LogRecord;
