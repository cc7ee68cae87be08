//! Core value types for the Maestro music graph.
//!
//! Nodes are schemaless property bags tagged with a single label. Labels and
//! field names end up spliced into Cypher text, so both are restricted to a
//! plain identifier grammar before they ever reach a query builder.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;
use crate::policy::ID_FIELD;

const MAX_TOKEN_LEN: usize = 64;

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*` tokens of at most 64 characters.
pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    token.len() <= MAX_TOKEN_LEN && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a property key before it is used as a Cypher token.
pub fn validate_field_name(name: &str) -> Result<(), ModelError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ModelError::InvalidField(name.to_string()))
    }
}

// ── Labels ────────────────────────────────────────────────────────

/// A validated node label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label(String);

impl Label {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        if is_identifier(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ModelError::InvalidLabel(raw.to_string()))
        }
    }

    pub fn album() -> Self {
        Self("Album".to_string())
    }

    pub fn artist() -> Self {
        Self("Artist".to_string())
    }

    pub fn genre() -> Self {
        Self("Genre".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Label {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Label {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Identity ──────────────────────────────────────────────────────

/// Unique identifier assigned to every node at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Properties ────────────────────────────────────────────────────

/// A scalar property value.
///
/// Timestamps are accepted on input but stored as canonical RFC 3339 text,
/// so values read back from the graph carry them as `String`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
}

/// Field name to value mapping for one node.
pub type Properties = BTreeMap<String, PropertyValue>;

/// Canonical textual form of an instant: UTC, nanosecond precision, `Z` suffix.
///
/// Fixed width, so lexical order matches chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl PropertyValue {
    /// Replace temporal values with their canonical text.
    pub fn into_storable(self) -> Self {
        match self {
            Self::Timestamp(ts) => Self::String(format_timestamp(ts)),
            other => other,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Interpret the value as an instant, parsing stored text if necessary.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            Self::String(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|ts| ts.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

// ── Nodes ─────────────────────────────────────────────────────────

/// A node as stored in the graph: its id, its label, and every other property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: Label,
    #[serde(flatten)]
    pub properties: Properties,
}

impl Node {
    /// Build a node from a raw property map, lifting `id` out of it.
    pub fn from_properties(label: Label, mut properties: Properties) -> Result<Self, ModelError> {
        match properties.remove(ID_FIELD) {
            Some(PropertyValue::String(id)) => Ok(Self {
                id,
                label,
                properties,
            }),
            _ => Err(ModelError::MissingId {
                label: label.to_string(),
            }),
        }
    }

    pub fn get(&self, field: &str) -> Option<&PropertyValue> {
        self.properties.get(field)
    }

    pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(PropertyValue::as_timestamp)
    }
}
