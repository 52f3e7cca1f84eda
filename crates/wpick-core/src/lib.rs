//! wpick-core: content picker core library.
//!
//! This crate holds everything a picker needs that is not transport or
//! rendering: the shared types, the option set and its collision policy,
//! selection with external attribute sync, configuration, and the debounced
//! [`OptionLoader`].
//!
//! # Architecture
//!
//! ```text
//! keystrokes ──► Picker ──► OptionLoader ──► SearchSource (wpick-rest)
//!                  ▲              │
//!                  └── Delivery ◄─┘   (tokio mpsc)
//! ```
//!
//! The front-end drives the picker from its own thread; requests run on
//! background `tokio` tasks and come back over an unbounded channel.

pub mod config;
pub mod error;
pub mod loader;
pub mod options;
pub mod picker;
pub mod selection;
pub mod types;

pub use error::{ConfigError, LoadError};
pub use loader::{Delivery, LoaderSettings, OptionLoader, Outcome, SearchSource};
pub use options::{MergePolicy, OptionSet};
pub use picker::Picker;
pub use selection::{AttributeBinding, AttributeSink, Selection};
pub use types::{Item, ItemShape, SelectOption};
