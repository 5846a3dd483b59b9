//! Dotted field paths
//!
//! A [`FieldPath`] addresses a value inside nested JSON data by joining
//! object keys (or array indices) with `.`, e.g. `req.headers.Accept`.
//! The same syntax is used for mask white lists, fully masked fields,
//! filter black lists and format targets.
//!
//! Parsing never fails loudly: [`parse_paths`] silently drops entries
//! that are not strings or are not well formed, so a bad option can only
//! make a set smaller.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Path separator
pub const SEPARATOR: char = '.';

/// A canonical dotted path.
///
/// Canonical means trimmed, non-empty, and free of leading, trailing or
/// empty segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(String);

impl FieldPath {
    /// Parse and normalize a single path.
    ///
    /// Returns `None` for input that is empty after trimming, starts or
    /// ends with `.`, or contains an empty segment.
    ///
    /// ```
    /// use httplog_formats::path::FieldPath;
    ///
    /// assert_eq!(FieldPath::parse(" req.body ").unwrap().as_str(), "req.body");
    /// assert!(FieldPath::parse(".req.body").is_none());
    /// assert!(FieldPath::parse("res.").is_none());
    /// assert!(FieldPath::parse("   ").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.starts_with(SEPARATOR)
            || trimmed.ends_with(SEPARATOR)
            || trimmed.split(SEPARATOR).any(str::is_empty)
        {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Build a single-segment path from an object key without validation.
    ///
    /// Used while walking a tree, where keys come from the data itself.
    pub(crate) fn from_key(key: &str) -> Self {
        Self(key.to_string())
    }

    /// Path of `key` below this path
    pub fn child(&self, key: &str) -> Self {
        let mut joined = String::with_capacity(self.0.len() + 1 + key.len());
        joined.push_str(&self.0);
        joined.push(SEPARATOR);
        joined.push_str(key);
        Self(joined)
    }

    /// Iterate over the path segments
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Dot-joined string form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FieldPath::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid field path: {raw:?}")))
    }
}

/// An ordered set of unique [`FieldPath`]s.
///
/// Membership is exact string equality; `req.headers` does not contain
/// `req.headers.Accept`. Iteration follows first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    paths: Vec<FieldPath>,
}

impl FieldSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a path, returning `false` if it was already present
    pub fn insert(&mut self, path: FieldPath) -> bool {
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// Exact-match membership test
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    /// Exact-match membership test against a raw string
    pub fn contains_str(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p.as_str() == path)
    }

    /// Number of paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set has no paths
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate in first-seen order
    pub fn iter(&self) -> std::slice::Iter<'_, FieldPath> {
        self.paths.iter()
    }
}

impl<S: AsRef<str>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for raw in iter {
            if let Some(path) = FieldPath::parse(raw.as_ref()) {
                set.insert(path);
            }
        }
        set
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldPath;
    type IntoIter = std::slice::Iter<'a, FieldPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl Serialize for FieldSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.paths.iter())
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    /// Accepts any JSON value; see [`parse_paths`].
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(parse_paths(&raw))
    }
}

/// Build a [`FieldSet`] from an arbitrary JSON value.
///
/// Anything other than a non-empty array yields an empty set. Array
/// elements are kept only if they are strings that parse as a
/// [`FieldPath`]; duplicates collapse onto their first occurrence.
///
/// ```
/// use httplog_formats::path::parse_paths;
/// use serde_json::json;
///
/// let set = parse_paths(&json!([" req.body ", "req.body", ".x", 7, "res.headers"]));
/// let paths: Vec<_> = set.iter().map(|p| p.as_str()).collect();
/// assert_eq!(paths, ["req.body", "res.headers"]);
/// ```
pub fn parse_paths(raw: &Value) -> FieldSet {
    match raw {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => FieldSet::new(),
    }
}

/// Look up the value at `path` below `root`.
///
/// Object segments match keys; array segments must be decimal indices.
pub fn get_path<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    walk(root, path.segments())
}

pub(crate) fn walk<'a, 's>(
    root: &'a Value,
    mut segments: impl Iterator<Item = &'s str>,
) -> Option<&'a Value> {
    segments.try_fold(root, step)
}

/// Mutable variant of [`get_path`]
pub fn get_path_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    walk_mut(root, path.segments())
}

pub(crate) fn walk_mut<'a, 's>(
    root: &'a mut Value,
    mut segments: impl Iterator<Item = &'s str>,
) -> Option<&'a mut Value> {
    segments.try_fold(root, step_mut)
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// An intermediate value that is not an object or array is replaced by
/// an empty object. Returns the previous value at `path`, if any.
pub fn set_path(root: &mut Value, path: &FieldPath, value: Value) -> Option<Value> {
    let segments: Vec<&str> = path.segments().collect();
    let (last, parents) = segments.split_last()?;

    let mut current = root;
    for segment in parents {
        if !current.is_object() && !current.is_array() {
            *current = Value::Object(serde_json::Map::new());
        }
        current = match current {
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(index) if index < items.len() => &mut items[index],
                _ => return None,
            },
            Value::Object(map) => map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new())),
            _ => return None,
        };
    }

    if !current.is_object() && !current.is_array() {
        *current = Value::Object(serde_json::Map::new());
    }
    match current {
        Value::Object(map) => map.insert(last.to_string(), value),
        Value::Array(items) => match last.parse::<usize>() {
            Ok(index) if index < items.len() => Some(std::mem::replace(&mut items[index], value)),
            _ => None,
        },
        _ => None,
    }
}

/// Remove the value at `path`, returning it.
///
/// Removing from an array drops the element, shifting later ones down.
pub fn remove_path(root: &mut Value, path: &FieldPath) -> Option<Value> {
    let segments: Vec<&str> = path.segments().collect();
    let (last, parents) = segments.split_last()?;

    let parent = walk_mut(root, parents.iter().copied())?;
    match parent {
        Value::Object(map) => map.remove(*last),
        Value::Array(items) => {
            let index = last.parse::<usize>().ok()?;
            (index < items.len()).then(|| items.remove(index))
        }
        _ => None,
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?),
        _ => None,
    }
}
