//! Test builders: picker and loader constructors pointed at a fake site.
//!
//! These favour readability in tests over flexibility and panic on invalid
//! input rather than returning `Result`.

use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use wpick_core::config::{PickerConfig, SourceConfig};
use wpick_core::{
    AttributeBinding, Delivery, LoaderSettings, OptionLoader, Outcome, Picker, SelectOption,
};
use wpick_rest::RestSource;

/// Upper bound on any single wait in the harnesses.
pub const WAIT: Duration = Duration::from_secs(5);

pub fn rest_source(site: &str, source: &SourceConfig) -> RestSource {
    RestSource::new(site, source, Duration::from_secs(2)).expect("valid test site")
}

// ---------------------------------------------------------------------------
// PickerBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for a [`Picker`] backed by a real [`RestSource`].
pub struct PickerBuilder {
    site: String,
    config: PickerConfig,
    binding: Option<AttributeBinding>,
}

impl PickerBuilder {
    pub fn new(site: impl Into<String>, source: SourceConfig) -> Self {
        Self {
            site: site.into(),
            config: PickerConfig::new(source),
            binding: None,
        }
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    pub fn multi(mut self) -> Self {
        self.config.multi = true;
        self
    }

    pub fn per_page(mut self, n: u32) -> Self {
        self.config.per_page = n;
        self
    }

    pub fn bind(mut self, binding: AttributeBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn build(self) -> Picker {
        let source = rest_source(&self.site, &self.config.source);
        let picker = Picker::new(self.config, Arc::new(source), Handle::current()).unwrap();
        match self.binding {
            Some(binding) => picker.with_binding(binding),
            None => picker,
        }
    }
}

/// Build a loader straight over a [`RestSource`].
pub fn rest_loader(
    site: &str,
    source: SourceConfig,
    settings: LoaderSettings,
) -> (OptionLoader, UnboundedReceiver<Delivery>) {
    OptionLoader::new(Arc::new(rest_source(site, &source)), settings)
}

pub fn settings(quiet_ms: u64) -> LoaderSettings {
    LoaderSettings {
        quiet_window: Duration::from_millis(quiet_ms),
        ..LoaderSettings::default()
    }
}

/// Wait for the picker's next applied delivery, failing the test after [`WAIT`].
pub async fn next(picker: &mut Picker) -> Outcome {
    tokio::time::timeout(WAIT, picker.next_delivery())
        .await
        .expect("delivery within timeout")
        .expect("loader alive")
}

pub async fn recv(rx: &mut UnboundedReceiver<Delivery>) -> Delivery {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("delivery within timeout")
        .expect("loader alive")
}

/// An attribute binding whose sink records every update.
pub fn recording_binding(
    key: &str,
    stored: Map<String, Value>,
) -> (AttributeBinding, Arc<Mutex<Vec<Map<String, Value>>>>) {
    let log: Arc<Mutex<Vec<Map<String, Value>>>> = Arc::default();
    let sink_log = log.clone();
    let binding = AttributeBinding::new(key, stored, move |update: Map<String, Value>| {
        sink_log.lock().unwrap().push(update);
    })
    .unwrap();
    (binding, log)
}

pub fn option_ids<'a>(options: impl IntoIterator<Item = &'a SelectOption>) -> Vec<u64> {
    options.into_iter().filter_map(SelectOption::id).collect()
}
