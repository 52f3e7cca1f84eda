//! Picker: headless state of one post, page, or term picker.
//!
//! A [`Picker`] owns everything a picker widget instance needs: its
//! [`OptionLoader`] (and therefore its debounce timer and sequence counter),
//! the current [`OptionSet`], the [`Selection`], and an optional
//! [`AttributeBinding`]. Front-ends feed it queries and selection gestures
//! and render from its accessors; they never talk to the loader directly.
//!
//! Deliveries are applied in sequence order only. A delivery whose id is not
//! newer than the last one applied is ignored, which backs up the loader's
//! own staleness check.

use crate::config::PickerConfig;
use crate::error::{ConfigError, LoadError};
use crate::loader::{Delivery, LoaderSettings, OptionLoader, Outcome, SearchSource};
use crate::options::OptionSet;
use crate::selection::{AttributeBinding, Selection};
use crate::types::SelectOption;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

pub struct Picker {
    config: PickerConfig,
    loader: OptionLoader,
    deliveries: mpsc::UnboundedReceiver<Delivery>,
    options: OptionSet,
    selection: Selection,
    binding: Option<AttributeBinding>,
    query: String,
    applied_seq: u64,
    loading: bool,
    last_outcome: Option<Outcome>,
}

impl std::fmt::Debug for Picker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Picker")
            .field("query", &self.query)
            .field("options", &self.options.len())
            .field("selected", &self.selection.len())
            .field("applied_seq", &self.applied_seq)
            .field("loading", &self.loading)
            .finish_non_exhaustive()
    }
}

impl Picker {
    /// Build a picker that spawns its requests onto `handle`.
    pub fn new(
        config: PickerConfig,
        source: Arc<dyn SearchSource>,
        handle: Handle,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (loader, deliveries) =
            OptionLoader::with_handle(source, LoaderSettings::from(&config), handle);
        Ok(Self {
            selection: Selection::new(config.multi),
            config,
            loader,
            deliveries,
            options: OptionSet::new(),
            binding: None,
            query: String::new(),
            applied_seq: 0,
            loading: false,
            last_outcome: None,
        })
    }

    /// Report soft failures to `hook`.
    ///
    /// The hook can only be installed before the first request goes out;
    /// afterwards this returns [`ConfigError::LateErrorHook`].
    pub fn with_error_hook(
        mut self,
        hook: impl Fn(&LoadError) + Send + Sync + 'static,
    ) -> Result<Self, ConfigError> {
        if self.loader.set_error_hook(hook) {
            Ok(self)
        } else {
            Err(ConfigError::LateErrorHook)
        }
    }

    /// Bind the selection to an external attribute. A non-empty stored value
    /// becomes the initial selection.
    pub fn with_binding(mut self, binding: AttributeBinding) -> Self {
        let stored = binding.stored_selection();
        if !stored.is_empty() {
            tracing::debug!(key = binding.key(), count = stored.len(), "selection seeded");
            self.selection.set(stored);
        }
        self.binding = Some(binding);
        self
    }

    /// Issue the initial, unfiltered load and publish the initial selection.
    pub fn mount(&mut self) {
        self.loading = true;
        self.loader.request_now("");
        self.sync();
    }

    // -----------------------------------------------------------------------
    // Query
    // -----------------------------------------------------------------------

    /// Record new input text and schedule a debounced load. Ignored when the
    /// picker is disabled or not searchable.
    pub fn set_query(&mut self, query: impl Into<String>) {
        if self.config.disabled || !self.config.searchable {
            return;
        }
        let query = query.into();
        if query == self.query {
            return;
        }
        self.query = query.clone();
        self.loading = true;
        self.loader.request(query);
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Load `query` right away, without the quiet window. Unlike
    /// [`Picker::set_query`] this ignores the searchable and disabled flags,
    /// so one-shot callers always get a delivery. Returns the sequence id.
    pub fn search_now(&mut self, query: impl Into<String>) -> u64 {
        let query = query.into();
        self.query = query.clone();
        self.loading = true;
        self.loader.request_now(query)
    }

    // -----------------------------------------------------------------------
    // Deliveries
    // -----------------------------------------------------------------------

    /// Apply a delivery under the configured merge policy. Returns `false`
    /// when it was older than one already applied.
    pub fn apply(&mut self, delivery: Delivery) -> bool {
        if delivery.seq <= self.applied_seq {
            tracing::debug!(seq = delivery.seq, applied = self.applied_seq, "out-of-order delivery ignored");
            return false;
        }
        self.applied_seq = delivery.seq;
        self.options
            .merge(delivery.options, self.config.merge_policy());
        self.loading = self.loader.has_pending() || self.loader.latest_seq() > delivery.seq;
        self.last_outcome = Some(delivery.outcome);
        true
    }

    /// Apply every delivery that has already arrived. Returns how many were
    /// applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(delivery) = self.deliveries.try_recv() {
            if self.apply(delivery) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next delivery and apply it. Returns `None` once the
    /// loader is gone.
    pub async fn next_delivery(&mut self) -> Option<Outcome> {
        loop {
            let delivery = self.deliveries.recv().await?;
            let outcome = delivery.outcome.clone();
            if self.apply(delivery) {
                return Some(outcome);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select the option at `index` (single mode) or toggle it (multi mode).
    pub fn choose(&mut self, index: usize) -> bool {
        if self.config.disabled {
            return false;
        }
        let Some(option) = self.options.get(index).cloned() else {
            return false;
        };
        if self.selection.is_multi() {
            self.selection.toggle(option);
        } else {
            self.selection.select(option);
        }
        self.sync();
        true
    }

    /// Select a specific option, whether or not it is in the current set.
    pub fn select(&mut self, option: SelectOption) {
        if self.config.disabled {
            return;
        }
        self.selection.select(option);
        self.sync();
    }

    pub fn clear(&mut self) -> bool {
        if self.config.disabled || !self.config.clearable || self.selection.is_empty() {
            return false;
        }
        self.selection.clear();
        self.sync();
        true
    }

    pub fn remove_last(&mut self) -> Option<SelectOption> {
        if self.config.disabled {
            return None;
        }
        let removed = self.selection.remove_last();
        if removed.is_some() {
            self.sync();
        }
        removed
    }

    fn sync(&mut self) {
        if let Some(binding) = &mut self.binding {
            binding.sync(&self.selection);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, option: &SelectOption) -> bool {
        self.selection.contains(option)
    }

    /// Whether a load is waiting in the quiet window or in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    pub fn placeholder(&self) -> String {
        self.config.placeholder()
    }

    /// The external attribute map as last synced, when bound.
    pub fn attributes(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.binding.as_ref().map(AttributeBinding::attributes)
    }

    /// The selection in attribute form (`[]`, `[opt]`, or `[opt, ...]`).
    pub fn selection_value(&self) -> serde_json::Value {
        self.selection.to_attribute_value()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
