//! Incremental option loader: debounced, sequence-guarded search.
//!
//! [`OptionLoader`] turns a stream of keystroke-level queries into a much
//! smaller stream of search requests, and turns their responses into
//! [`Delivery`] values on a `tokio` channel.
//!
//! # Debounce
//!
//! [`OptionLoader::request`] (re)arms a single quiet-window timer. Only the
//! query passed to the last call before the window elapses is sent. The timer
//! belongs to the loader instance; dropping the loader disarms it.
//!
//! # Ordering
//!
//! Each request is stamped with a sequence id when it is *issued* (when the
//! timer fires, not when `request` is called). A response is delivered only
//! if its id is still the latest issued, so a slow early response can never
//! overwrite a faster later one. In-flight requests are not aborted.
//!
//! # Failure
//!
//! Loads never fail outwardly. Network errors, non-2xx statuses, malformed
//! payloads, timeouts, and too-short queries all deliver an empty option list
//! with the cause recorded in [`Delivery::outcome`].

use crate::error::LoadError;
use crate::types::{Item, SelectOption};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A remote search endpoint. Implemented over HTTP by `wpick-rest`, and by
/// in-memory fakes in tests.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Fetch at most `per_page` items matching `query`. An empty query lists
    /// the most relevant items without filtering.
    async fn search(&self, query: &str, per_page: u32) -> Result<Vec<Item>, LoadError>;
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// How a load finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded,
    Failed(LoadError),
}

/// The result of one issued request, sent on the loader's channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Sequence id assigned at issuance. Strictly increasing per loader.
    pub seq: u64,
    pub query: String,
    /// Empty whenever `outcome` is [`Outcome::Failed`].
    pub options: Vec<SelectOption>,
    pub outcome: Outcome,
}

impl Delivery {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Observer for soft failures.
pub type ErrorHook = Arc<dyn Fn(&LoadError) + Send + Sync>;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    pub quiet_window: Duration,
    pub per_page: u32,
    pub min_query_chars: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            quiet_window: Duration::from_millis(500),
            per_page: 20,
            min_query_chars: 0,
        }
    }
}

impl From<&crate::config::PickerConfig> for LoaderSettings {
    fn from(cfg: &crate::config::PickerConfig) -> Self {
        Self {
            quiet_window: cfg.quiet_window(),
            per_page: cfg.per_page,
            min_query_chars: cfg.min_query_chars(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Everything an issued request needs, shared between the loader and its
/// spawned tasks.
struct Shared {
    source: Arc<dyn SearchSource>,
    settings: LoaderSettings,
    latest: AtomicU64,
    tx: mpsc::UnboundedSender<Delivery>,
    on_error: Option<ErrorHook>,
}

pub struct OptionLoader {
    shared: Arc<Shared>,
    handle: Handle,
    timer: Option<JoinHandle<()>>,
}

impl OptionLoader {
    /// Create a loader that spawns onto the current `tokio` runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a runtime; use [`OptionLoader::with_handle`]
    /// from synchronous code.
    pub fn new(
        source: Arc<dyn SearchSource>,
        settings: LoaderSettings,
    ) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        Self::with_handle(source, settings, Handle::current())
    }

    pub fn with_handle(
        source: Arc<dyn SearchSource>,
        settings: LoaderSettings,
        handle: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            source,
            settings,
            latest: AtomicU64::new(0),
            tx,
            on_error: None,
        });
        (
            Self {
                shared,
                handle,
                timer: None,
            },
            rx,
        )
    }

    /// Install a hook that observes every soft failure.
    pub fn with_error_hook(mut self, hook: impl Fn(&LoadError) + Send + Sync + 'static) -> Self {
        self.set_error_hook(hook);
        self
    }

    /// Install a hook that observes every soft failure. Only possible before
    /// the first request is issued; returns `false` (and leaves the loader
    /// unchanged) afterwards.
    pub fn set_error_hook(&mut self, hook: impl Fn(&LoadError) + Send + Sync + 'static) -> bool {
        let issued = self.latest_seq() > 0;
        match Arc::get_mut(&mut self.shared) {
            Some(shared) if !issued => {
                shared.on_error = Some(Arc::new(hook));
                true
            }
            _ => {
                tracing::warn!("error hook installed after requests were issued; ignored");
                false
            }
        }
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.shared.settings
    }

    /// Debounced load. Re-arms the quiet-window timer with `query`, dropping
    /// any query still waiting in the window.
    pub fn request(&mut self, query: impl Into<String>) {
        let query = query.into();
        let window = self.shared.settings.quiet_window;
        if window.is_zero() {
            self.request_now(query);
            return;
        }
        self.cancel_pending();
        tracing::debug!(query = %query, ?window, "load armed");
        let shared = self.shared.clone();
        self.timer = Some(self.handle.spawn(async move {
            tokio::time::sleep(window).await;
            issue(shared, query);
        }));
    }

    /// Issue a load immediately, bypassing the quiet window. Any query still
    /// waiting in the window is dropped. Returns the issued sequence id.
    pub fn request_now(&mut self, query: impl Into<String>) -> u64 {
        self.cancel_pending();
        let _guard = self.handle.enter();
        issue(self.shared.clone(), query.into())
    }

    /// Disarm the quiet-window timer. Requests already issued still complete.
    pub fn cancel_pending(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Whether a query is waiting in the quiet window.
    pub fn has_pending(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Sequence id of the most recently issued request (0 before the first).
    pub fn latest_seq(&self) -> u64 {
        self.shared.latest.load(Ordering::SeqCst)
    }
}

impl Drop for OptionLoader {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

/// Stamp a new sequence id and spawn the fetch. Must run inside a runtime.
fn issue(shared: Arc<Shared>, query: String) -> u64 {
    let seq = shared.latest.fetch_add(1, Ordering::SeqCst) + 1;
    tracing::debug!(seq, query = %query, "load issued");
    tokio::spawn(async move {
        let result = fetch(&shared, &query).await;
        let (options, outcome) = match result {
            Ok(items) => (
                items.into_iter().map(SelectOption::from).collect(),
                Outcome::Loaded,
            ),
            Err(err) => {
                tracing::warn!(seq, query = %query, error = %err, "load failed; delivering empty set");
                if let Some(hook) = &shared.on_error {
                    hook(&err);
                }
                (Vec::new(), Outcome::Failed(err))
            }
        };

        let latest = shared.latest.load(Ordering::SeqCst);
        if seq != latest {
            tracing::debug!(seq, latest, "stale response dropped");
            return;
        }
        tracing::debug!(seq, count = options.len(), "load delivered");
        // The receiver being gone just means nobody is listening any more.
        let _ = shared.tx.send(Delivery {
            seq,
            query,
            options,
            outcome,
        });
    });
    seq
}

/// The empty query is the unfiltered browse listing and is exempt from the
/// minimum length.
async fn fetch(shared: &Shared, query: &str) -> Result<Vec<Item>, LoadError> {
    let min = shared.settings.min_query_chars;
    if !query.is_empty() && query.chars().count() < min {
        return Err(LoadError::EmptyQuery { min });
    }
    shared.source.search(query, shared.settings.per_page).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
