//! Field removal format

use super::{default_target, Format};
use crate::filter::{filter, FilterPolicy};
use crate::path::{FieldPath, FieldSet};
use crate::record::LogRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options for [`FilterFormat`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    /// When false every record passes through untouched
    pub enabled: bool,
    /// Record subtree the black list is relative to
    pub target: FieldPath,
    /// Paths removed from the target subtree
    pub black_list: FieldSet,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            target: default_target(),
            black_list: FieldSet::new(),
        }
    }
}

impl FilterOptions {
    /// Enable or disable the format
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the target subtree
    pub fn target(mut self, target: FieldPath) -> Self {
        self.target = target;
        self
    }

    /// Set the black list
    pub fn black_list<S: AsRef<str>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.black_list = paths.into_iter().collect();
        self
    }
}

impl From<FilterOptions> for FilterPolicy {
    fn from(options: FilterOptions) -> Self {
        Self {
            enabled: options.enabled,
            target: options.target,
            black_list: options.black_list,
        }
    }
}

/// Removes black-listed fields from the target subtree
#[derive(Clone, Debug)]
pub struct FilterFormat {
    policy: FilterPolicy,
}

impl Default for FilterFormat {
    fn default() -> Self {
        Self::new(FilterOptions::default())
    }
}

impl FilterFormat {
    /// Create the format
    pub fn new(options: FilterOptions) -> Self {
        Self {
            policy: options.into(),
        }
    }

    /// Create the format from loosely typed JSON options
    pub fn from_value(options: &Value) -> Self {
        Self::new(crate::config::resolve(options))
    }

    /// The policy this format applies
    pub fn policy(&self) -> &FilterPolicy {
        &self.policy
    }
}

impl Format for FilterFormat {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn transform(&self, record: LogRecord) -> LogRecord {
        filter(record, &self.policy)
    }
}
