//! Record module for harvested opportunities
//!
//! This module provides the fixed-schema record that flows from the list stage through
//! resolution into the CSV output.
//!
//! # Components
//!
//! - `FieldName`: every field a record can hold, with its wire key
//! - `Record`: one `Option<String>` slot per field; `None` is the unknown state
//! - `MergeMode`: authoritative vs gap-fill merging of partial extractions

mod field;
mod merge;

pub use field::FieldName;
pub use merge::MergeMode;

use std::fmt;

/// Text written for unset fields when a record leaves the process
pub const UNKNOWN: &str = "unknown";

/// Normalises a raw value from outside the process
///
/// Empty strings and the various "unknown" markers a model or a list page may emit
/// collapse to `None`, so that they can never be mistaken for real data.
///
/// # Examples
///
/// ```
/// use grant_harvester::record::normalize_value;
///
/// assert_eq!(normalize_value("  €50,000 "), Some("€50,000".to_string()));
/// assert_eq!(normalize_value("Unknown"), None);
/// assert_eq!(normalize_value("不明 (Fallback)"), None);
/// assert_eq!(normalize_value(""), None);
/// ```
pub fn normalize_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("不明") {
        return None;
    }

    let lower = trimmed.to_lowercase();
    if lower == UNKNOWN || lower == "n/a" {
        return None;
    }

    Some(trimmed.to_string())
}

/// A harvested opportunity record
///
/// Every field always has a slot. A slot holding `None` means the value is not known
/// yet; stored values are never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [Option<String>; FieldName::COUNT],
}

impl Record {
    /// Creates a record with every field unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stub record from a list-page entry
    pub fn stub(url: &str, title: &str) -> Self {
        let mut record = Self::new();
        record.set(FieldName::Url, url);
        record.set(FieldName::Title, title);
        record
    }

    /// Returns the value of a field, or None if it is unknown
    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    /// Sets a field from a raw value
    ///
    /// The value is normalised first; unknown markers clear the field.
    /// Returns true if the field holds a value afterwards.
    pub fn set(&mut self, field: FieldName, raw: &str) -> bool {
        self.values[field.index()] = normalize_value(raw);
        self.is_set(field)
    }

    /// Returns true if the field has a known value
    pub fn is_set(&self, field: FieldName) -> bool {
        self.values[field.index()].is_some()
    }

    /// Returns true iff every required field has a known value
    pub fn is_complete(&self, required: &[FieldName]) -> bool {
        required.iter().all(|field| self.is_set(*field))
    }

    /// Lists the required fields that are still unknown, in the order given
    pub fn missing(&self, required: &[FieldName]) -> Vec<FieldName> {
        required
            .iter()
            .copied()
            .filter(|field| !self.is_set(*field))
            .collect()
    }

    /// Iterates over the fields with known values, in canonical order
    pub fn known_fields(&self) -> impl Iterator<Item = (FieldName, &str)> + '_ {
        FieldName::ALL
            .iter()
            .filter_map(move |field| self.get(*field).map(|value| (*field, value)))
    }

    /// Number of fields with known values
    pub fn known_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    /// Returns true if no field has a known value
    pub fn is_empty(&self) -> bool {
        self.known_count() == 0
    }

    /// Convenience accessor for the record URL
    pub fn url(&self) -> Option<&str> {
        self.get(FieldName::Url)
    }

    /// Convenience accessor for the record title
    pub fn title(&self) -> Option<&str> {
        self.get(FieldName::Title)
    }

    /// Returns the value of a field as written to output, using the unknown sentinel
    pub fn display_value(&self, field: FieldName) -> &str {
        self.get(field).unwrap_or(UNKNOWN)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}>",
            self.title().unwrap_or(UNKNOWN),
            self.url().unwrap_or(UNKNOWN)
        )
    }
}
