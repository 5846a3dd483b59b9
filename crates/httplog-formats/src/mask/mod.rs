//! Recursive masking of JSON subtrees
//!
//! [`MaskEngine`] walks a subtree and redacts each scalar leaf according to
//! a [`MaskPolicy`]. The decision for a leaf depends only on its full
//! dotted path:
//!
//! 1. listed in `fully_masked_fields`: masked with no readable edges,
//!    even if it is also white listed
//! 2. listed in `white_list`: kept verbatim
//! 3. otherwise: masked with the policy's [`ScalarMaskRules`]
//!
//! Matching is exact. White listing `req.headers` does not white list
//! `req.headers.Accept`; every leaf has to be named.
//!
//! # Example
//!
//! ```
//! use httplog_formats::mask::{MaskEngine, MaskPolicy, Severity};
//! use serde_json::json;
//!
//! let policy = MaskPolicy::new(Severity::Partial).white_list(["req.url"]);
//! let masked = MaskEngine::new(policy).mask(json!({
//!     "req": {"url": "/login", "data": {"password": "hunter22"}}
//! }));
//!
//! assert_eq!(masked, json!({
//!     "req": {"url": "/login", "data": {"password": "hu****22"}}
//! }));
//! ```

mod scalar;
mod severity;

pub use scalar::ScalarMaskRules;
pub use severity::{ParseSeverityError, Severity};

use crate::path::{FieldPath, FieldSet};
use serde_json::{Map, Value};

/// Masking policy for one subtree
#[derive(Clone, Debug, PartialEq)]
pub struct MaskPolicy {
    /// Severity level; `Open` disables masking entirely
    pub severity: Severity,
    /// Leaf paths kept verbatim
    pub white_list: FieldSet,
    /// Leaf paths masked completely, taking precedence over `white_list`
    pub fully_masked_fields: FieldSet,
    /// Rules applied to every other leaf
    pub mask_options: ScalarMaskRules,
}

impl Default for MaskPolicy {
    fn default() -> Self {
        Self::new(Severity::default())
    }
}

impl MaskPolicy {
    /// Policy with rules derived from `severity` and empty path sets
    pub fn new(severity: Severity) -> Self {
        Self {
            severity,
            white_list: FieldSet::new(),
            fully_masked_fields: FieldSet::new(),
            mask_options: ScalarMaskRules::for_severity(severity),
        }
    }

    /// Set the white list
    pub fn white_list<S: AsRef<str>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.white_list = paths.into_iter().collect();
        self
    }

    /// Set the fully masked fields
    pub fn fully_masked_fields<S: AsRef<str>>(
        mut self,
        paths: impl IntoIterator<Item = S>,
    ) -> Self {
        self.fully_masked_fields = paths.into_iter().collect();
        self
    }

    /// Replace the scalar rules
    pub fn mask_options(mut self, rules: ScalarMaskRules) -> Self {
        self.mask_options = rules;
        self
    }

    /// Decide what happens to the leaf at `path`
    pub fn decide(&self, path: &FieldPath) -> LeafDecision {
        if self.fully_masked_fields.contains(path) {
            LeafDecision::MaskFully
        } else if self.white_list.contains(path) {
            LeafDecision::Keep
        } else {
            LeafDecision::Mask
        }
    }
}

/// Outcome of [`MaskPolicy::decide`] for a single leaf
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafDecision {
    /// Leave the value as it is
    Keep,
    /// Mask with the policy's rules
    Mask,
    /// Mask with no readable characters
    MaskFully,
}

/// Applies a [`MaskPolicy`] to JSON subtrees
#[derive(Clone, Debug)]
pub struct MaskEngine {
    policy: MaskPolicy,
    full_rules: ScalarMaskRules,
}

impl MaskEngine {
    /// Create an engine for `policy`
    pub fn new(policy: MaskPolicy) -> Self {
        let full_rules = policy.mask_options.fully_masked();
        Self { policy, full_rules }
    }

    /// The policy this engine applies
    pub fn policy(&self) -> &MaskPolicy {
        &self.policy
    }

    /// Mask a subtree, returning a tree of the same shape.
    ///
    /// Objects and arrays are rebuilt with the same keys and order; only
    /// scalar leaves change. Array elements are addressed by index
    /// (`items.0.id`). A scalar passed as the subtree itself has no path
    /// and is masked with the base rules.
    pub fn mask(&self, subtree: Value) -> Value {
        if !self.policy.severity.masks() {
            return subtree;
        }

        match subtree {
            Value::Object(_) | Value::Array(_) => {
                map_children(subtree, None, &mut |path, leaf| self.mask_leaf(path, leaf))
            }
            scalar => self.policy.mask_options.mask(&scalar),
        }
    }

    fn mask_leaf(&self, path: &FieldPath, leaf: Value) -> Value {
        match self.policy.decide(path) {
            LeafDecision::Keep => leaf,
            LeafDecision::Mask => self.policy.mask_options.mask(&leaf),
            LeafDecision::MaskFully => self.full_rules.mask(&leaf),
        }
    }
}

/// Mask `subtree` under `policy`
pub fn mask(subtree: Value, policy: &MaskPolicy) -> Value {
    MaskEngine::new(policy.clone()).mask(subtree)
}

/// Rebuild a container, passing every scalar leaf with its full path
/// through `leaf`.
fn map_children<F>(container: Value, parent: Option<&FieldPath>, leaf: &mut F) -> Value
where
    F: FnMut(&FieldPath, Value) -> Value,
{
    let child_path = |key: &str| match parent {
        Some(parent) => parent.child(key),
        None => FieldPath::from_key(key),
    };

    match container {
        Value::Object(map) => {
            let mut rebuilt = Map::with_capacity(map.len());
            for (key, value) in map {
                let path = child_path(&key);
                rebuilt.insert(key, map_value(value, &path, leaf));
            }
            Value::Object(rebuilt)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .enumerate()
                .map(|(index, value)| map_value(value, &child_path(&index.to_string()), leaf))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn map_value<F>(value: Value, path: &FieldPath, leaf: &mut F) -> Value
where
    F: FnMut(&FieldPath, Value) -> Value,
{
    match value {
        Value::Object(_) | Value::Array(_) => map_children(value, Some(path), leaf),
        scalar => leaf(path, scalar),
    }
}
