//! wpick TUI: ratatui front-end for a [`Picker`].

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod widgets;

pub use app::App;

use wpick_core::{config::Config, Picker};

/// Run the interactive picker. Returns the picker when the user confirmed a
/// selection, `None` when they cancelled.
pub fn run(picker: Picker, config: &Config) -> anyhow::Result<Option<Picker>> {
    let keys = event::KeyMap::from_config(&config.keybindings);
    App::new(picker, &config.ui, keys).run()
}
