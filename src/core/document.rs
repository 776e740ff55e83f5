//! Open-schema JSON document
//!
//! A document is a mapping of field name to JSON value. Two keys are
//! reserved: `id` (string, assigned once at creation) and `createdAt`
//! (epoch seconds, set at insert time unless the caller supplied one).

use super::{GatewayError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Reserved key holding the document identifier
pub const ID_FIELD: &str = "id";

/// Reserved key holding the creation timestamp (epoch seconds)
pub const CREATED_AT_FIELD: &str = "createdAt";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, JsonValue>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a document from any JSON value; only objects are accepted
    pub fn from_value(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(GatewayError::InvalidDocument(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Document identifier, if one has been assigned
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(JsonValue::as_str)
    }

    /// Creation timestamp in epoch seconds, if present and numeric
    pub fn created_at(&self) -> Option<f64> {
        self.0.get(CREATED_AT_FIELD).and_then(JsonValue::as_f64)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, JsonValue> {
        self.0
    }

    /// Stamp a freshly inserted document: the id is always replaced,
    /// `createdAt` only filled in when missing.
    pub(crate) fn assign_identity(&mut self, id: &str, created_at: f64) {
        self.0.insert(ID_FIELD.to_string(), JsonValue::from(id));
        self.0
            .entry(CREATED_AT_FIELD.to_string())
            .or_insert_with(|| JsonValue::from(created_at));
    }

    /// Field-level `$set` merge. Returns true if any field was added or
    /// changed value.
    pub fn merge(&mut self, fields: &Document) -> bool {
        let mut changed = false;
        for (key, value) in fields.iter() {
            if self.0.get(key) != Some(value) {
                self.0.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    /// Copy of `self` without the reserved `id` key
    pub(crate) fn without_id(&self) -> Document {
        let mut fields = self.clone();
        fields.remove(ID_FIELD);
        fields
    }
}

impl From<Map<String, JsonValue>> for Document {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self(map)
    }
}

impl From<Document> for JsonValue {
    fn from(doc: Document) -> Self {
        JsonValue::Object(doc.0)
    }
}

impl TryFrom<JsonValue> for Document {
    type Error = GatewayError;

    fn try_from(value: JsonValue) -> Result<Self> {
        Self::from_value(value)
    }
}

impl FromIterator<(String, JsonValue)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, JsonValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a JsonValue);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Epoch seconds with sub-second precision, the `createdAt` representation
pub fn epoch_seconds(at: DateTime<Utc>) -> f64 {
    at.timestamp_micros() as f64 / 1_000_000.0
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
