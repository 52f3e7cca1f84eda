//! Core types for wpick-core.
//!
//! This module defines the records that flow between the layers: the opaque
//! [`Item`] returned by the search endpoint, the [`ItemShape`] that knows
//! where an item keeps its label, and the UI-facing [`SelectOption`].

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An opaque content record (post, page, or taxonomy term) returned by the
/// search endpoint.
///
/// Only the identifier and the display label are interpreted. The full JSON
/// record is kept in `raw` so it can be written back into external attribute
/// state exactly as the site returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Site-wide identifier of the record.
    pub id: u64,
    /// Human-readable name extracted according to the item's [`ItemShape`].
    pub label: String,
    /// The record as received.
    pub raw: Value,
}

impl Item {
    pub fn new(id: u64, label: impl Into<String>, raw: Value) -> Self {
        Self {
            id,
            label: label.into(),
            raw,
        }
    }
}

/// Where an item's display label lives in the JSON record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemShape {
    /// Posts and pages: `title.rendered`, nested one level.
    Post,
    /// Taxonomy terms: `name`.
    Term,
}

impl ItemShape {
    /// Decode a single JSON record into an [`Item`].
    pub fn decode(self, record: Value) -> Result<Item, LoadError> {
        let id = record
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| LoadError::Parse("record has no numeric `id`".to_string()))?;

        let label = match self {
            ItemShape::Post => record
                .get("title")
                .and_then(|t| t.get("rendered"))
                .and_then(Value::as_str),
            ItemShape::Term => record.get("name").and_then(Value::as_str),
        }
        .ok_or_else(|| LoadError::Parse(format!("record {id} has no {} label", self)))?
        .to_string();

        Ok(Item { id, label, raw: record })
    }

    /// Decode a full response payload, which must be a JSON array of records.
    ///
    /// A single malformed record fails the whole payload.
    pub fn decode_payload(self, payload: Value) -> Result<Vec<Item>, LoadError> {
        match payload {
            Value::Array(records) => records.into_iter().map(|r| self.decode(r)).collect(),
            other => Err(LoadError::Parse(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl std::fmt::Display for ItemShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemShape::Post => write!(f, "title.rendered"),
            ItemShape::Term => write!(f, "name"),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// UI-facing label/value pair derived from an [`Item`].
///
/// Serializes as `{ "label": ..., "value": <raw record> }`, the shape stored
/// in external attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

impl SelectOption {
    /// Identifier of the underlying record, read from `value.id`.
    ///
    /// Options restored from external attributes may carry a bare numeric
    /// value (term pickers store the id directly), so both forms are accepted.
    pub fn id(&self) -> Option<u64> {
        match &self.value {
            Value::Number(n) => n.as_u64(),
            other => other.get("id").and_then(Value::as_u64),
        }
    }
}

impl From<Item> for SelectOption {
    fn from(item: Item) -> Self {
        SelectOption {
            label: item.label,
            value: item.raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
