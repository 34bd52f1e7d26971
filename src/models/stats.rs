//! Per-project statistics records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single stored statistic value.
///
/// Numeric and text variables share one record, so values are tagged.
/// Zero is a valid, meaningful number; a missing entry means "unknown",
/// never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Number(f64),
    Text(String),
}

impl StatValue {
    /// Numeric value, if this entry is numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            StatValue::Text(_) => None,
        }
    }

    /// Text value, if this entry is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatValue::Number(_) => None,
            StatValue::Text(s) => Some(s),
        }
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Number(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

/// Raw statistics for one project, keyed by variable name.
///
/// The record is stored and replaced as a whole document: edits read the
/// record, change one value and write the full record back. A `BTreeMap`
/// keeps iteration and serialization order stable, so identical records
/// always serialize to identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsRecord {
    values: BTreeMap<String, StatValue>,
}

impl StatsRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous entry for the name.
    pub fn set(&mut self, name: impl Into<String>, value: StatValue) {
        self.values.insert(name.into(), value);
    }

    /// Set a numeric value.
    pub fn set_number(&mut self, name: impl Into<String>, value: f64) {
        self.set(name, StatValue::Number(value));
    }

    /// Set a text value.
    pub fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, StatValue::Text(value.into()));
    }

    /// Raw entry for a variable name.
    pub fn get(&self, name: &str) -> Option<&StatValue> {
        self.values.get(name)
    }

    /// Numeric value for a variable name.
    ///
    /// Returns `None` when the entry is missing or holds text; absence is
    /// "unknown", not zero.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(StatValue::as_number)
    }

    /// Text value for a variable name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(StatValue::as_text)
    }

    /// Whether the record has an entry for the name.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in stable (name) order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StatValue)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absence_is_not_zero() {
        let mut record = StatsRecord::new();
        record.set_number("remoteImages", 0.0);

        assert_eq!(record.number("remoteImages"), Some(0.0));
        assert_eq!(record.number("approvedImages"), None);
        assert!(!record.contains("approvedImages"));
    }

    #[test]
    fn test_set_replaces_value() {
        let mut record = StatsRecord::new();
        record.set_number("attendance", 100.0);
        record.set_number("attendance", 250.0);

        assert_eq!(record.number("attendance"), Some(250.0));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_text_and_number_entries() {
        let mut record = StatsRecord::new();
        record.set_number("female", 180.0);
        record.set_text("eventSummary", "Sold-out night");

        assert_eq!(record.number("female"), Some(180.0));
        assert_eq!(record.text("eventSummary"), Some("Sold-out night"));
        // A text entry has no numeric reading and vice versa.
        assert_eq!(record.number("eventSummary"), None);
        assert_eq!(record.text("female"), None);
    }

    #[test]
    fn test_serialization_is_flat_and_stable() {
        let mut record = StatsRecord::new();
        record.set_number("male", 220.0);
        record.set_number("female", 180.0);
        record.set_text("eventSummary", "ok");

        let json = serde_json::to_string(&record).unwrap();
        // BTreeMap ordering: keys serialize alphabetically regardless of
        // insertion order.
        assert_eq!(
            json,
            r#"{"eventSummary":"ok","female":180.0,"male":220.0}"#
        );

        let parsed: StatsRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_deserialize_from_stored_shape() {
        let json = r#"{"remoteImages": 120, "eventSummary": "hello"}"#;
        let record: StatsRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.number("remoteImages"), Some(120.0));
        assert_eq!(record.text("eventSummary"), Some("hello"));
    }
}
