//! Black-list removal of fields from a record subtree

use crate::path::{self, FieldPath, FieldSet};
use crate::record::LogRecord;
use serde_json::Value;

/// Which fields to remove, relative to which subtree
#[derive(Clone, Debug, PartialEq)]
pub struct FilterPolicy {
    /// When false the record is returned untouched
    pub enabled: bool,
    /// Path of the subtree the black list is relative to
    pub target: FieldPath,
    /// Paths removed from the target subtree
    pub black_list: FieldSet,
}

impl FilterPolicy {
    /// Enabled policy for `target` with an empty black list
    pub fn new(target: FieldPath) -> Self {
        Self {
            enabled: true,
            target,
            black_list: FieldSet::new(),
        }
    }

    /// Set the black list
    pub fn black_list<S: AsRef<str>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.black_list = paths.into_iter().collect();
        self
    }

    fn is_noop(&self) -> bool {
        !self.enabled || self.black_list.is_empty()
    }
}

/// Remove every black-listed path from `subtree`.
///
/// A path that resolves to an object or array removes the whole subtree
/// rooted there. Paths that resolve to nothing are ignored. Returns the
/// number of paths removed.
pub fn filter_value(subtree: &mut Value, black_list: &FieldSet) -> usize {
    let mut removed = 0;
    for path in black_list {
        if path::remove_path(subtree, path).is_some() {
            removed += 1;
        }
    }
    removed
}

/// Apply `policy` to `record`.
///
/// The record comes back unchanged when the policy is disabled, the black
/// list is empty, or the target is missing or an empty object. Only the
/// target subtree is touched; sibling fields are left as they are.
///
/// ```
/// use httplog_formats::filter::{filter, FilterPolicy};
/// use httplog_formats::path::FieldPath;
/// use httplog_formats::LogRecord;
/// use serde_json::json;
///
/// let record = LogRecord::from_value(json!({
///     "meta": {"req": {"url": "/", "headers": {"common": {}, "post": {}}}}
/// })).unwrap();
/// let policy = FilterPolicy::new(FieldPath::parse("meta").unwrap())
///     .black_list(["req.headers.common"]);
///
/// assert_eq!(
///     filter(record, &policy).into_value(),
///     json!({"meta": {"req": {"url": "/", "headers": {"post": {}}}}})
/// );
/// ```
pub fn filter(mut record: LogRecord, policy: &FilterPolicy) -> LogRecord {
    if policy.is_noop() {
        return record;
    }

    let Some(subtree) = record.get_path_mut(&policy.target) else {
        tracing::debug!(target_path = %policy.target, "filter target missing, skipping");
        return record;
    };
    if is_empty_container(subtree) {
        return record;
    }

    let removed = filter_value(subtree, &policy.black_list);
    tracing::trace!(target_path = %policy.target, removed, "filtered black-listed fields");
    record
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => true,
    }
}
