//! Record shapes exchanged with the backing record store.
//!
//! The store is schemaless from this crate's point of view: a record is an
//! identifier plus whatever subset of columns the caller asked for.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column values keyed by column name.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Opaque identifier of a single record in the store.
///
/// Backends may use numeric or UUID keys; both are carried as their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A projection of one stored record: its id plus the requested fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Record {
    /// Create a record projection from an id and field map.
    pub fn new(id: impl Into<RecordId>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Return the named field as a string, if present and string-typed.
    ///
    /// `null` and non-string values are treated as absent.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }
}
