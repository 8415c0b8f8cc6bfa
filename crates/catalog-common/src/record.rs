//! Asset records and parse outcomes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single metadata value extracted from an asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Integer(_) => None,
        }
    }

    /// Integer content, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Integer(v as i64)
    }
}

/// Metadata extracted from one discovered file: one future catalog row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    fields: BTreeMap<String, FieldValue>,
}

impl AssetRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record whose `path` field is set to `path`.
    pub fn with_path(path: &Path) -> Self {
        let mut record = Self::new();
        record.insert("path", path.to_string_lossy().into_owned());
        record
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Insert only when a value is present; absent optional attributes stay absent.
    pub fn insert_opt<V: Into<FieldValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn path(&self) -> Option<&str> {
        self.get_str("path")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A file that failed to parse, kept for reporting only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidAsset {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for InvalidAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Result of applying a parser to one file.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(AssetRecord),
    Invalid(InvalidAsset),
}

impl ParseOutcome {
    pub fn invalid(path: &Path, reason: impl fmt::Display) -> Self {
        ParseOutcome::Invalid(InvalidAsset {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        })
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }

    /// The parsed record, if any.
    pub fn record(&self) -> Option<&AssetRecord> {
        match self {
            ParseOutcome::Parsed(record) => Some(record),
            ParseOutcome::Invalid(_) => None,
        }
    }

    pub fn into_result(self) -> Result<AssetRecord, InvalidAsset> {
        match self {
            ParseOutcome::Parsed(record) => Ok(record),
            ParseOutcome::Invalid(invalid) => Err(invalid),
        }
    }
}

impl From<Result<AssetRecord, InvalidAsset>> for ParseOutcome {
    fn from(result: Result<AssetRecord, InvalidAsset>) -> Self {
        match result {
            Ok(record) => ParseOutcome::Parsed(record),
            Err(invalid) => ParseOutcome::Invalid(invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_with_path() {
        let record = AssetRecord::with_path(Path::new("/data/tas.nc"));
        assert_eq!(record.path(), Some("/data/tas.nc"));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_insert_opt_skips_missing() {
        let mut record = AssetRecord::new();
        record.insert_opt("units", Some("kg m-3"));
        record.insert_opt::<String>("long_name", None);
        assert_eq!(record.get_str("units"), Some("kg m-3"));
        assert!(!record.contains("long_name"));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::from(131i64).to_string(), "131");
        assert_eq!(FieldValue::from("IWC").to_string(), "IWC");
        assert_eq!(FieldValue::from(3usize).as_i64(), Some(3));
    }

    #[test]
    fn test_outcome_conversion() {
        let outcome = ParseOutcome::invalid(Path::new("/x.nc"), "bad ensemble");
        assert!(!outcome.is_parsed());
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.reason, "bad ensemble");
        assert_eq!(err.to_string(), "/x.nc: bad ensemble");
    }
}
