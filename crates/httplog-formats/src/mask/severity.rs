//! Masking severity levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How aggressively scalar values are redacted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// No masking at all
    Open,
    /// Strings are masked with a couple of readable edge characters;
    /// numbers, booleans and nulls are left alone
    #[default]
    Partial,
    /// Every scalar is masked
    Strict,
}

impl Severity {
    /// Lowercase name, as used in options and environment variables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Partial => "partial",
            Self::Strict => "strict",
        }
    }

    /// Whether this level performs any masking
    pub fn masks(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a severity name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown masking severity `{0}`, expected one of: open, partial, strict")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "partial" => Ok(Self::Partial),
            "strict" => Ok(Self::Strict),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}
