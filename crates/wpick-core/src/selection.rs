//! Selection state and external attribute sync.
//!
//! A [`Selection`] holds zero, one, or many options depending on the picker's
//! multi-select mode. An optional [`AttributeBinding`] mirrors it into an
//! external attribute map: the stored value seeds the selection on mount, and
//! every change afterwards is pushed to the binding's [`AttributeSink`] as
//! `{ key: [options...] }`.

use crate::error::ConfigError;
use crate::types::SelectOption;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    multi: bool,
    chosen: Vec<SelectOption>,
}

fn same(a: &SelectOption, b: &SelectOption) -> bool {
    match (a.id(), b.id()) {
        (Some(x), Some(y)) => x == y,
        _ => a.label == b.label,
    }
}

impl Selection {
    pub fn new(multi: bool) -> Self {
        Self {
            multi,
            chosen: Vec::new(),
        }
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Replace the whole selection. In single mode only the first option is kept.
    pub fn set(&mut self, options: Vec<SelectOption>) {
        self.chosen = options;
        if !self.multi {
            self.chosen.truncate(1);
        }
    }

    /// Select `option`. Single mode replaces; multi mode appends unless the
    /// option is already selected.
    pub fn select(&mut self, option: SelectOption) {
        if !self.multi {
            self.chosen = vec![option];
        } else if !self.contains(&option) {
            self.chosen.push(option);
        }
    }

    /// Select `option` if it is not selected, deselect it otherwise.
    pub fn toggle(&mut self, option: SelectOption) {
        if let Some(pos) = self.chosen.iter().position(|c| same(c, &option)) {
            self.chosen.remove(pos);
        } else {
            self.select(option);
        }
    }

    /// Drop the most recently selected option. Returns it, if any.
    pub fn remove_last(&mut self) -> Option<SelectOption> {
        self.chosen.pop()
    }

    pub fn clear(&mut self) {
        self.chosen.clear();
    }

    pub fn contains(&self, option: &SelectOption) -> bool {
        self.chosen.iter().any(|c| same(c, option))
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn as_slice(&self) -> &[SelectOption] {
        &self.chosen
    }

    /// The attribute representation: always an array, `[]` when empty and a
    /// one-element array in single mode.
    pub fn to_attribute_value(&self) -> Value {
        Value::Array(
            self.chosen
                .iter()
                .map(|o| serde_json::json!({ "label": o.label, "value": o.value }))
                .collect(),
        )
    }
}

// ---------------------------------------------------------------------------
// Attribute binding
// ---------------------------------------------------------------------------

/// Receiver of attribute updates, e.g. a block editor's `setAttributes`.
pub trait AttributeSink: Send {
    fn set_attributes(&mut self, update: Map<String, Value>);
}

impl<F> AttributeSink for F
where
    F: FnMut(Map<String, Value>) + Send,
{
    fn set_attributes(&mut self, update: Map<String, Value>) {
        self(update)
    }
}

/// Binds a selection to one key of an external attribute map.
pub struct AttributeBinding {
    key: String,
    stored: Map<String, Value>,
    sink: Box<dyn AttributeSink>,
}

impl std::fmt::Debug for AttributeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeBinding")
            .field("key", &self.key)
            .field("stored", &self.stored)
            .finish_non_exhaustive()
    }
}

impl AttributeBinding {
    pub fn new(
        key: impl Into<String>,
        stored: Map<String, Value>,
        sink: impl AttributeSink + 'static,
    ) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::EmptyAttributeKey);
        }
        Ok(Self {
            key,
            stored,
            sink: Box::new(sink),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Options previously stored under the bound key.
    ///
    /// A missing key, `null`, or an empty array all mean "nothing stored".
    /// So does any value that is not an array of `{label, value}` options;
    /// that case is logged and otherwise ignored.
    pub fn stored_selection(&self) -> Vec<SelectOption> {
        let items = match self.stored.get(&self.key) {
            None | Some(Value::Null) => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                tracing::warn!(key = %self.key, value = %other, "stored attribute is not an array; ignored");
                return Vec::new();
            }
        };
        match items
            .iter()
            .map(|v| serde_json::from_value(v.clone()))
            .collect::<Result<Vec<SelectOption>, _>>()
        {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "stored attribute holds malformed options; ignored");
                Vec::new()
            }
        }
    }

    /// Push the current selection to the sink and remember it as stored.
    pub fn sync(&mut self, selection: &Selection) {
        let value = selection.to_attribute_value();
        tracing::debug!(key = %self.key, count = selection.len(), "attribute sync");
        self.stored.insert(self.key.clone(), value.clone());
        let mut update = Map::new();
        update.insert(self.key.clone(), value);
        self.sink.set_attributes(update);
    }

    /// The attribute map as last synced.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.stored
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn opt(id: u64) -> SelectOption {
        SelectOption {
            label: format!("post {id}"),
            value: json!({ "id": id }),
        }
    }

    fn recording_sink() -> (Arc<Mutex<Vec<Map<String, Value>>>>, impl AttributeSink) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink_log = log.clone();
        (log, move |update: Map<String, Value>| {
            sink_log.lock().unwrap().push(update)
        })
    }

    #[test]
    fn single_mode_replaces() {
        let mut s = Selection::new(false);
        s.select(opt(1));
        s.select(opt(2));
        assert_eq!(s.as_slice(), &[opt(2)]);
    }

    #[test]
    fn multi_mode_toggles() {
        let mut s = Selection::new(true);
        s.toggle(opt(1));
        s.toggle(opt(2));
        s.toggle(opt(1));
        assert_eq!(s.as_slice(), &[opt(2)]);
    }

    #[test]
    fn set_truncates_in_single_mode() {
        let mut s = Selection::new(false);
        s.set(vec![opt(1), opt(2)]);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn empty_key_rejected() {
        let (_, sink) = recording_sink();
        let err = AttributeBinding::new("  ", Map::new(), sink).unwrap_err();
        assert_eq!(err, ConfigError::EmptyAttributeKey);
    }

    #[test]
    fn sync_wraps_selection_in_array() {
        let (log, sink) = recording_sink();
        let mut binding = AttributeBinding::new("selectedOption", Map::new(), sink).unwrap();

        let mut s = Selection::new(false);
        binding.sync(&s);
        s.select(opt(4));
        binding.sync(&s);

        let log = log.lock().unwrap();
        assert_eq!(log[0]["selectedOption"], json!([]));
        assert_eq!(
            log[1]["selectedOption"],
            json!([{ "label": "post 4", "value": { "id": 4 } }])
        );
    }

    #[test]
    fn stored_selection_seeds_from_array() {
        let (_, sink) = recording_sink();
        let mut stored = Map::new();
        stored.insert(
            "picked".to_string(),
            json!([{ "label": "post 9", "value": { "id": 9 } }]),
        );
        let binding = AttributeBinding::new("picked", stored, sink).unwrap();
        assert_eq!(binding.stored_selection(), vec![opt(9)]);
    }

    #[test]
    fn unusable_stored_value_means_nothing_stored() {
        let cases = [
            json!("nope"),
            json!({ "label": "x", "value": 1 }),
            json!([{ "title": "missing label and value" }]),
            json!([]),
            Value::Null,
        ];
        for value in cases {
            let (_, sink) = recording_sink();
            let mut stored = Map::new();
            stored.insert("picked".to_string(), value.clone());
            let binding = AttributeBinding::new("picked", stored, sink).unwrap();
            assert_eq!(binding.stored_selection(), Vec::new(), "stored value {value}");
        }
    }
}
