//! Option set: the ordered, identifier-unique list of selectable options.
//!
//! # Collision policy
//!
//! When two options share an identifier the **first** one wins, on every
//! path: building a set from a fresh response and merging a response into
//! the current set both keep the earliest occurrence and drop later ones.
//! Options without a readable identifier are keyed by label instead.

use crate::types::SelectOption;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a new batch of options is combined with the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The new batch becomes the set (post/page picker).
    Replace,
    /// The new batch is appended after the current set, skipping options
    /// whose identifier is already present (term picker).
    KeepFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Key {
    Id(u64),
    Label(String),
}

fn key_of(option: &SelectOption) -> Key {
    option
        .id()
        .map(Key::Id)
        .unwrap_or_else(|| Key::Label(option.label.clone()))
}

/// Ordered sequence of [`SelectOption`]s, unique by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    options: Vec<SelectOption>,
    seen: HashSet<Key>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a batch, keeping the first option per identifier.
    pub fn from_options(options: impl IntoIterator<Item = SelectOption>) -> Self {
        let mut set = Self::new();
        set.extend_unique(options);
        set
    }

    /// Combine `incoming` with the current contents under `policy`.
    pub fn merge(&mut self, incoming: Vec<SelectOption>, policy: MergePolicy) {
        match policy {
            MergePolicy::Replace => *self = Self::from_options(incoming),
            MergePolicy::KeepFirst => self.extend_unique(incoming),
        }
    }

    fn extend_unique(&mut self, options: impl IntoIterator<Item = SelectOption>) {
        for option in options {
            if self.seen.insert(key_of(&option)) {
                self.options.push(option);
            }
        }
    }

    pub fn contains_id(&self, id: u64) -> bool {
        self.seen.contains(&Key::Id(id))
    }

    pub fn get(&self, index: usize) -> Option<&SelectOption> {
        self.options.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SelectOption> {
        self.options.iter()
    }

    pub fn as_slice(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn clear(&mut self) {
        self.options.clear();
        self.seen.clear();
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a SelectOption;
    type IntoIter = std::slice::Iter<'a, SelectOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
