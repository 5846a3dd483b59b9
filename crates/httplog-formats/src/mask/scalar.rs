//! Redaction of a single scalar value

use super::Severity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-type toggles and bounds for masking one scalar.
///
/// The defaults mask every scalar type completely, capped at 16
/// characters. [`ScalarMaskRules::for_severity`] derives the rules a
/// severity level implies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScalarMaskRules {
    /// Character used in place of hidden characters
    pub mask_with: char,
    /// Upper bound on the length of a masked value
    pub max_masked_chars: usize,
    /// Leading characters left readable
    pub unmasked_start_chars: usize,
    /// Trailing characters left readable
    pub unmasked_end_chars: usize,
    /// Mask string values
    pub mask_string: bool,
    /// Mask numeric values
    pub mask_number: bool,
    /// Mask `true` / `false`
    pub mask_boolean: bool,
    /// Mask `null`
    pub mask_null: bool,
}

impl Default for ScalarMaskRules {
    fn default() -> Self {
        Self {
            mask_with: '*',
            max_masked_chars: 16,
            unmasked_start_chars: 0,
            unmasked_end_chars: 0,
            mask_string: true,
            mask_number: true,
            mask_boolean: true,
            mask_null: true,
        }
    }
}

impl ScalarMaskRules {
    /// Rules implied by a severity level.
    ///
    /// `Partial` keeps two characters at each end, caps output at 30
    /// characters and leaves numbers, booleans and nulls untouched.
    /// `Strict` (and `Open`, which never reaches the masker) use the
    /// plain defaults.
    pub fn for_severity(severity: Severity) -> Self {
        match severity {
            Severity::Partial => Self {
                max_masked_chars: 30,
                unmasked_start_chars: 2,
                unmasked_end_chars: 2,
                mask_boolean: false,
                mask_null: false,
                mask_number: false,
                ..Self::default()
            },
            Severity::Open | Severity::Strict => Self::default(),
        }
    }

    /// Same rules with no readable edges and strings and numbers forced
    /// maskable; used for fully masked fields
    pub fn fully_masked(&self) -> Self {
        Self {
            unmasked_start_chars: 0,
            unmasked_end_chars: 0,
            mask_string: true,
            mask_number: true,
            ..self.clone()
        }
    }

    /// Set the mask character
    pub fn mask_with(mut self, c: char) -> Self {
        self.mask_with = c;
        self
    }

    /// Set the output length cap
    pub fn max_masked_chars(mut self, max: usize) -> Self {
        self.max_masked_chars = max;
        self
    }

    /// Set how many leading and trailing characters stay readable
    pub fn unmasked_edges(mut self, start: usize, end: usize) -> Self {
        self.unmasked_start_chars = start;
        self.unmasked_end_chars = end;
        self
    }

    fn applies_to(&self, value: &Value) -> bool {
        match value {
            Value::String(_) => self.mask_string,
            Value::Number(_) => self.mask_number,
            Value::Bool(_) => self.mask_boolean,
            Value::Null => self.mask_null,
            Value::Array(_) | Value::Object(_) => false,
        }
    }

    /// Mask one scalar.
    ///
    /// Values of a type these rules exclude come back unchanged, keeping
    /// their JSON type. Masked values are always strings.
    ///
    /// ```
    /// use httplog_formats::mask::{ScalarMaskRules, Severity};
    /// use serde_json::json;
    ///
    /// let partial = ScalarMaskRules::for_severity(Severity::Partial);
    /// assert_eq!(partial.mask(&json!("getaddrinfo")), json!("ge*******fo"));
    /// assert_eq!(partial.mask(&json!(80)), json!(80));
    ///
    /// let strict = ScalarMaskRules::default();
    /// assert_eq!(strict.mask(&json!(200)), json!("***"));
    /// ```
    pub fn mask(&self, value: &Value) -> Value {
        if !self.applies_to(value) {
            return value.clone();
        }

        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Value::String(self.mask_text(&text))
    }

    fn mask_text(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let out_len = chars.len().min(self.max_masked_chars);
        let start = self.unmasked_start_chars;
        let end = self.unmasked_end_chars;

        if start.saturating_add(end) >= out_len {
            return std::iter::repeat(self.mask_with).take(out_len).collect();
        }

        let mut masked = String::with_capacity(out_len);
        masked.extend(&chars[..start]);
        masked.extend(std::iter::repeat(self.mask_with).take(out_len - start - end));
        masked.extend(&chars[chars.len() - end..]);
        masked
    }
}
