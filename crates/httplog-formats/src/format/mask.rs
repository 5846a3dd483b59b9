//! Masking format

use super::{default_target, Format};
use crate::mask::{MaskEngine, MaskPolicy, ScalarMaskRules, Severity};
use crate::path::{FieldPath, FieldSet};
use crate::record::LogRecord;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Options for [`MaskFormat`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaskOptions {
    /// How aggressively to mask
    pub severity: Severity,
    /// Record subtree to mask
    pub target: FieldPath,
    /// Leaf paths, relative to `target`, left readable
    pub white_list: FieldSet,
    /// Leaf paths, relative to `target`, masked completely
    pub fully_masked_fields: FieldSet,
    /// Explicit scalar rules.
    ///
    /// `None`, `null` and `{}` all mean "derive from `severity`".
    #[serde(deserialize_with = "non_empty_rules")]
    pub mask_options: Option<ScalarMaskRules>,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            severity: Severity::default(),
            target: default_target(),
            white_list: FieldSet::new(),
            fully_masked_fields: FieldSet::new(),
            mask_options: None,
        }
    }
}

impl MaskOptions {
    /// Set the severity
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the target subtree
    pub fn target(mut self, target: FieldPath) -> Self {
        self.target = target;
        self
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

    /// Use explicit scalar rules
    pub fn mask_options(mut self, rules: ScalarMaskRules) -> Self {
        self.mask_options = Some(rules);
        self
    }

    /// The masking policy these options describe
    pub fn policy(&self) -> MaskPolicy {
        let rules = self
            .mask_options
            .clone()
            .unwrap_or_else(|| ScalarMaskRules::for_severity(self.severity));
        MaskPolicy {
            severity: self.severity,
            white_list: self.white_list.clone(),
            fully_masked_fields: self.fully_masked_fields.clone(),
            mask_options: rules,
        }
    }
}

fn non_empty_rules<'de, D>(deserializer: D) -> Result<Option<ScalarMaskRules>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) if !map.is_empty() => ScalarMaskRules::deserialize(Value::Object(map))
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Masks the scalar leaves of the target subtree.
///
/// The subtree is written back at the target path; records whose target
/// is missing or empty pass through.
///
/// ```
/// use httplog_formats::format::{Format, MaskFormat, MaskOptions};
/// use httplog_formats::mask::Severity;
/// use httplog_formats::LogRecord;
/// use serde_json::{json, Value};
///
/// let format = MaskFormat::new(
///     MaskOptions::default()
///         .severity(Severity::Strict)
///         .white_list(["req.url"]),
/// );
/// let mut record = LogRecord::with_message("info", "login");
/// record.insert("meta", json!({"req": {"url": "/login", "data": {"pin": 1234}}}));
///
/// let out = format.transform(record);
/// assert_eq!(
///     out.get("meta"),
///     Some(&json!({"req": {"url": "/login", "data": {"pin": "****"}}}))
/// );
/// ```
#[derive(Clone, Debug)]
pub struct MaskFormat {
    target: FieldPath,
    engine: MaskEngine,
}

impl Default for MaskFormat {
    fn default() -> Self {
        Self::new(MaskOptions::default())
    }
}

impl MaskFormat {
    /// Create the format
    pub fn new(options: MaskOptions) -> Self {
        Self {
            engine: MaskEngine::new(options.policy()),
            target: options.target,
        }
    }

    /// Create the format from loosely typed JSON options
    pub fn from_value(options: &Value) -> Self {
        Self::new(crate::config::resolve(options))
    }

    /// The policy applied to the target subtree
    pub fn policy(&self) -> &MaskPolicy {
        self.engine.policy()
    }
}

impl Format for MaskFormat {
    fn name(&self) -> &'static str {
        "mask"
    }

    fn transform(&self, mut record: LogRecord) -> LogRecord {
        if let Some(subtree) = record.get_path_mut(&self.target) {
            let is_empty = match subtree {
                Value::Object(map) => map.is_empty(),
                Value::Array(items) => items.is_empty(),
                _ => true,
            };
            if is_empty {
                tracing::debug!(target_path = %self.target, "nothing to mask");
            } else {
                *subtree = self.engine.mask(std::mem::take(subtree));
            }
        }
        record
    }
}
