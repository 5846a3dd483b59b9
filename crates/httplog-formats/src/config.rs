//! Option resolution and environment configuration
//!
//! Every format has a typed options struct whose `Default` impl holds the
//! frozen defaults. [`resolve`] merges a loosely typed JSON override over
//! those defaults, so callers can pass options the way a host logging
//! setup usually stores them, without ever getting an error back.
//!
//! With the `config` feature, [`FormatsConfig::from_env`] builds the
//! standard chain from `HTTPLOG_*` environment variables.
//!
//! # Example
//!
//! ```
//! use httplog_formats::config::resolve;
//! use httplog_formats::format::FilterOptions;
//! use serde_json::json;
//!
//! let options: FilterOptions = resolve(&json!({"blackList": [" req.headers ", 42]}));
//! assert_eq!(options.target.as_str(), "meta");
//! assert_eq!(options.black_list.len(), 1);
//!
//! // Anything that is not an object means "use the defaults"
//! let options: FilterOptions = resolve(&json!("nonsense"));
//! assert!(options.black_list.is_empty());
//! ```

use crate::error::Result;
use crate::format::{
    DescriptionFormat, DescriptionOptions, FilterFormat, FilterOptions, FormatChain, HttpFormat,
    HttpOptions, MaskFormat, MaskOptions,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolve options of type `T` from a JSON override.
///
/// See [`resolve_over`]; the base is `T::default()`.
pub fn resolve<T>(overrides: &Value) -> T
where
    T: Default + Clone + Serialize + DeserializeOwned,
{
    resolve_over(&T::default(), overrides)
}

/// Resolve options of type `T` from `defaults` and a JSON override.
///
/// A non-object override yields `defaults`. An object is merged key by
/// key over the serialized defaults, skipping `null` values, and the
/// result is deserialized. When that fails, each override key is tried
/// alone over the defaults and only the keys that are rejected are
/// dropped, so one bad field never discards the valid ones.
pub fn resolve_over<T>(defaults: &T, overrides: &Value) -> T
where
    T: Clone + Serialize + DeserializeOwned,
{
    let Value::Object(overrides) = overrides else {
        if !overrides.is_null() {
            tracing::warn!(
                found = crate::error::json_type_name(overrides),
                "format options must be an object, using defaults"
            );
        }
        return defaults.clone();
    };

    let base = match serde_json::to_value(defaults) {
        Ok(Value::Object(map)) => map,
        _ => return defaults.clone(),
    };
    let overrides = overrides.iter().filter(|(_, value)| !value.is_null());

    let mut merged = base.clone();
    merged.extend(overrides.clone().map(|(key, value)| (key.clone(), value.clone())));
    let error = match deserialize::<T>(merged) {
        Ok(options) => return options,
        Err(error) => error,
    };
    tracing::debug!(%error, "retrying format options field by field");

    let mut accepted = base.clone();
    for (key, value) in overrides {
        let mut single = base.clone();
        single.insert(key.clone(), value.clone());
        match deserialize::<T>(single) {
            Ok(_) => {
                accepted.insert(key.clone(), value.clone());
            }
            Err(error) => {
                tracing::warn!(option = %key, %error, "ignoring invalid format option");
            }
        }
    }

    deserialize(accepted).unwrap_or_else(|error| {
        tracing::warn!(%error, "invalid format options, using defaults");
        defaults.clone()
    })
}

fn deserialize<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(map))?)
}

/// Options for the standard chain: http, description, filter, mask.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatsConfig {
    /// HTTP request/response/error formatting
    pub http: HttpOptions,
    /// Fallback description
    pub description: DescriptionOptions,
    /// Field removal
    pub filter: FilterOptions,
    /// Field masking
    pub mask: MaskOptions,
}

impl FormatsConfig {
    /// Resolve every section from one JSON object keyed by section name
    pub fn from_value(value: &Value) -> Self {
        let section = |name: &str| value.get(name).cloned().unwrap_or(Value::Null);
        Self {
            http: resolve(&section("http")),
            description: resolve(&section("description")),
            filter: resolve(&section("filter")),
            mask: resolve(&section("mask")),
        }
    }

    /// Build the standard chain from this configuration
    pub fn into_chain(self) -> FormatChain {
        FormatChain::new()
            .with(HttpFormat::new(self.http))
            .with(DescriptionFormat::new(self.description))
            .with(FilterFormat::new(self.filter))
            .with(MaskFormat::new(self.mask))
    }
}

#[cfg(feature = "config")]
mod env {
    use super::FormatsConfig;
    use crate::error::Result;
    use crate::mask::Severity;
    use crate::path::{FieldPath, FieldSet};
    use serde::Deserialize;

    /// Environment variable prefix
    pub const ENV_PREFIX: &str = "HTTPLOG_";

    #[derive(Debug, Default, Deserialize)]
    struct EnvConfig {
        severity: Option<String>,
        meta: Option<bool>,
        stack: Option<bool>,
        meta_key: Option<String>,
        target: Option<String>,
        white_list: Option<String>,
        black_list: Option<String>,
        fully_masked_fields: Option<String>,
        description: Option<String>,
    }

    fn comma_separated(raw: &str) -> FieldSet {
        raw.split(',').collect()
    }

    impl FormatsConfig {
        /// Load configuration from `HTTPLOG_*` environment variables.
        ///
        /// A `.env` file in the working directory is loaded first if one
        /// exists. Unset variables keep their defaults; list variables are
        /// comma separated paths. An unknown severity falls back to the
        /// default with a warning.
        pub fn from_env() -> Result<Self> {
            let _ = dotenvy::dotenv();
            let env: EnvConfig = envy::prefixed(ENV_PREFIX).from_env()?;
            Ok(Self::default().apply_env(env))
        }

        fn apply_env(mut self, env: EnvConfig) -> Self {
            if let Some(raw) = env.severity {
                match raw.parse::<Severity>() {
                    Ok(severity) => self.mask.severity = severity,
                    Err(error) => tracing::warn!(%error, "ignoring HTTPLOG_SEVERITY"),
                }
            }
            if let Some(meta) = env.meta {
                self.http.meta = meta;
            }
            if let Some(stack) = env.stack {
                self.http.stack = stack;
            }
            if let Some(meta_key) = env.meta_key.filter(|k| !k.trim().is_empty()) {
                self.http.meta_key = meta_key.trim().to_string();
            }
            if let Some(target) = env.target.as_deref().and_then(FieldPath::parse) {
                self.filter.target = target.clone();
                self.mask.target = target;
            }
            if let Some(raw) = env.white_list {
                self.mask.white_list = comma_separated(&raw);
            }
            if let Some(raw) = env.fully_masked_fields {
                self.mask.fully_masked_fields = comma_separated(&raw);
            }
            if let Some(raw) = env.black_list {
                self.filter.black_list = comma_separated(&raw);
            }
            if env.description.is_some() {
                self.description.description = env.description;
            }
            self
        }
    }

}

#[cfg(feature = "config")]
pub use env::ENV_PREFIX;
