//! Semantic application events: crossterm key events mapped to a
//! widget-agnostic vocabulary so widgets never touch crossterm directly.
//!
//! # Keybindings
//!
//! The characters for query focus, clear, remove-last, and help come from
//! `[keybindings]` in the config; everything else is fixed.
//!
//! | Key(s)                  | Event                      |
//! |-------------------------|----------------------------|
//! | `q`, `Ctrl+c`           | `Quit`                     |
//! | `Tab`                   | `FocusNext`                |
//! | `/` (configurable)      | `QueryFocus`               |
//! | `:`                     | `CommandFocus`             |
//! | `↑` / `k`               | `Nav(Up)`                  |
//! | `↓` / `j`               | `Nav(Down)`                |
//! | `PageUp` / `PageDown`   | `PageUp` / `PageDown`      |
//! | `Space`                 | `Toggle`                   |
//! | `x` (configurable)      | `Clear`                    |
//! | `d` (configurable)      | `RemoveLast`               |
//! | `?` (configurable)      | `Help`                     |
//! | `Enter`                 | `Enter`                    |
//! | `Esc`                   | `Escape`                   |
//! | terminal resize         | `Resize(w, h)`             |
//!
//! ## Insert mode
//!
//! While the query bar or command bar is focused, [`KeyMap::to_app_event_insert`]
//! is used instead: every printable character becomes `Char`, arrow keys
//! become `Nav` so `←`/`→` move the text cursor, and only `Ctrl+c`, `Esc`,
//! `Enter`, `Tab`, and `Backspace` keep their special meaning.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use wpick_core::config::KeybindingsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A semantic application event derived from a raw crossterm [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Leave without confirming a selection.
    Quit,
    /// Cycle focus between the query bar and the option list.
    FocusNext,
    QueryFocus,
    CommandFocus,
    Nav(Direction),
    PageUp,
    PageDown,
    /// Select / deselect the option under the cursor.
    Toggle,
    /// Empty the selection.
    Clear,
    /// Drop the most recently selected option.
    RemoveLast,
    Help,
    /// A printable character forwarded to the active text input.
    Char(char),
    Backspace,
    Enter,
    Escape,
    Resize(u16, u16),
}

/// Resolved key bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    pub query_focus: char,
    pub clear: char,
    pub remove_last: char,
    pub help: char,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_config(&KeybindingsConfig::default())
    }
}

impl KeyMap {
    /// Take the first character of each configured binding, falling back to
    /// the default for empty strings.
    pub fn from_config(cfg: &KeybindingsConfig) -> Self {
        let first = |s: &str, fallback: char| s.chars().next().unwrap_or(fallback);
        Self {
            query_focus: first(&cfg.query_focus, '/'),
            clear: first(&cfg.clear, 'x'),
            remove_last: first(&cfg.remove_last, 'd'),
            help: first(&cfg.help, '?'),
        }
    }

    /// Map a raw crossterm [`Event`] to an [`AppEvent`] (navigation mode).
    ///
    /// Returns `None` for mouse events, key releases and unbound keys.
    pub fn to_app_event(&self, event: Event) -> Option<AppEvent> {
        match event {
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            Event::Key(key) => self.map_key(key),
            _ => None,
        }
    }

    /// Map a raw crossterm [`Event`] to an [`AppEvent`] for text-input mode.
    pub fn to_app_event_insert(&self, event: Event) -> Option<AppEvent> {
        match event {
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            Event::Key(key) => map_key_insert(key),
            _ => None,
        }
    }

    fn map_key(&self, key: KeyEvent) -> Option<AppEvent> {
        use KeyCode::*;
        use KeyModifiers as Mod;

        let plain = key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT;

        match key.code {
            Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),
            Char('q') if key.modifiers == Mod::NONE => Some(AppEvent::Quit),

            Tab if key.modifiers == Mod::NONE => Some(AppEvent::FocusNext),
            Char(':') if plain => Some(AppEvent::CommandFocus),

            Char(c) if plain && c == self.query_focus => Some(AppEvent::QueryFocus),
            Char(c) if plain && c == self.clear => Some(AppEvent::Clear),
            Char(c) if plain && c == self.remove_last => Some(AppEvent::RemoveLast),
            Char(c) if plain && c == self.help => Some(AppEvent::Help),
            Char(' ') if key.modifiers == Mod::NONE => Some(AppEvent::Toggle),

            Up | Char('k') if key.modifiers == Mod::NONE => Some(AppEvent::Nav(Direction::Up)),
            Down | Char('j') if key.modifiers == Mod::NONE => {
                Some(AppEvent::Nav(Direction::Down))
            }
            Left | Char('h') if key.modifiers == Mod::NONE => {
                Some(AppEvent::Nav(Direction::Left))
            }
            Right | Char('l') if key.modifiers == Mod::NONE => {
                Some(AppEvent::Nav(Direction::Right))
            }
            PageUp => Some(AppEvent::PageUp),
            PageDown => Some(AppEvent::PageDown),

            Char(c) if plain => Some(AppEvent::Char(c)),
            Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
            Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
            Esc => Some(AppEvent::Escape),

            _ => None,
        }
    }
}

fn map_key_insert(key: KeyEvent) -> Option<AppEvent> {
    use KeyCode::*;
    use KeyModifiers as Mod;

    match key.code {
        Char('c') if key.modifiers == Mod::CONTROL => Some(AppEvent::Quit),

        Up => Some(AppEvent::Nav(Direction::Up)),
        Down => Some(AppEvent::Nav(Direction::Down)),
        Left => Some(AppEvent::Nav(Direction::Left)),
        Right => Some(AppEvent::Nav(Direction::Right)),

        Tab if key.modifiers == Mod::NONE => Some(AppEvent::FocusNext),

        Char(c) if key.modifiers == Mod::NONE || key.modifiers == Mod::SHIFT => {
            Some(AppEvent::Char(c))
        }

        Backspace if key.modifiers == Mod::NONE => Some(AppEvent::Backspace),
        Enter if key.modifiers == Mod::NONE => Some(AppEvent::Enter),
        Esc => Some(AppEvent::Escape),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
