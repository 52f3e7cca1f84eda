//! Query bar widget: the search input at the top of the picker.
//!
//! # Editing
//!
//! - `Char(c)` inserts at the cursor.
//! - `Backspace` deletes the character before the cursor.
//! - `Nav(Left)` / `Nav(Right)` move the cursor.
//!
//! The bar shows the picker's placeholder while empty and a spinner-like
//! `searching…` tag while a load is pending.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Single-line editable text with a byte-offset cursor. Shared by the query
/// bar and the command bar.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub text: String,
    /// Byte offset of the cursor within `text`.
    pub cursor: usize,
}

impl TextInput {
    /// Apply an editing event. Returns `true` when the text changed.
    pub fn handle(&mut self, event: &AppEvent) -> bool {
        match event {
            AppEvent::Char(c) => {
                self.text.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                true
            }
            AppEvent::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                let prev = self.prev_boundary();
                self.text.remove(prev);
                self.cursor = prev;
                true
            }
            AppEvent::Nav(Direction::Left) => {
                self.cursor = self.prev_boundary();
                false
            }
            AppEvent::Nav(Direction::Right) => {
                if self.cursor < self.text.len() {
                    self.cursor = self.text[self.cursor..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor + i)
                        .unwrap_or(self.text.len());
                }
                false
            }
            _ => false,
        }
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Number of characters before the cursor (its display column).
    pub fn cursor_chars(&self) -> u16 {
        self.text[..self.cursor].chars().count() as u16
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct QueryBar<'a> {
    input: &'a TextInput,
    placeholder: &'a str,
    loading: bool,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> QueryBar<'a> {
    pub fn new(
        input: &'a TextInput,
        placeholder: &'a str,
        loading: bool,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            input,
            placeholder,
            loading,
            focused,
            theme,
        }
    }

    /// Absolute terminal position of the text cursor within `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let x = (area.x + 1 + self.input.cursor_chars()).min(area.right().saturating_sub(1));
        (x, area.y + 1)
    }
}

impl Widget for QueryBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title("Search")
            .border_style(self.theme.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(LayoutDir::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(12)])
            .split(inner);

        let line = if self.input.text.is_empty() && !self.focused {
            Line::from(Span::styled(self.placeholder, self.theme.placeholder))
        } else {
            Line::from(self.input.text.as_str())
        };
        Paragraph::new(line).render(chunks[0], buf);

        if self.loading {
            Paragraph::new(Line::from(Span::styled(
                "searching…",
                self.theme.status_loading,
            )))
            .render(chunks[1], buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace() {
        let mut input = TextInput::default();
        for c in "cats".chars() {
            assert!(input.handle(&AppEvent::Char(c)));
        }
        assert!(input.handle(&AppEvent::Backspace));
        assert_eq!(input.text, "cat");
        assert_eq!(input.cursor, 3);
    }

    #[test]
    fn cursor_moves_over_multibyte_chars() {
        let mut input = TextInput::default();
        input.handle(&AppEvent::Char('é'));
        input.handle(&AppEvent::Char('t'));
        input.handle(&AppEvent::Nav(Direction::Left));
        input.handle(&AppEvent::Nav(Direction::Left));
        assert_eq!(input.cursor, 0);
        input.handle(&AppEvent::Nav(Direction::Right));
        assert_eq!(input.cursor, 'é'.len_utf8());
        assert_eq!(input.cursor_chars(), 1);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut input = TextInput::default();
        assert!(!input.handle(&AppEvent::Backspace));
    }
}
