//! Option list widget: the scrollable list of loaded options.
//!
//! # Navigation (when the list is focused)
//!
//! | Key | Action |
//! |-----|--------|
//! | `↑` / `k` | Cursor up |
//! | `↓` / `j` | Cursor down |
//! | `PageUp` / `PageDown` | Move one page |
//! | `Space` | Select / deselect the option under the cursor |
//!
//! `cursor` indexes into the picker's option set. The view scrolls so the
//! cursor is always visible; the first visible row is `offset`.

use std::cell::Cell;

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};
use wpick_core::{Outcome, Picker};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct OptionListState {
    pub cursor: usize,
    pub offset: usize,
    pub show_ids: bool,
    /// Cached from the last render so `handle()` can page by screenfuls.
    pub(crate) last_height: Cell<usize>,
}

impl Default for OptionListState {
    fn default() -> Self {
        Self {
            cursor: 0,
            offset: 0,
            show_ids: true,
            last_height: Cell::new(10),
        }
    }
}

impl OptionListState {
    fn height(&self) -> usize {
        self.last_height.get().max(1)
    }

    /// Move the cursor in a list of `len` options.
    pub fn handle(&mut self, event: &AppEvent, len: usize) {
        if len == 0 {
            self.cursor = 0;
            self.offset = 0;
            return;
        }
        let page = self.height();
        self.cursor = match event {
            AppEvent::Nav(Direction::Up) => self.cursor.saturating_sub(1),
            AppEvent::Nav(Direction::Down) => (self.cursor + 1).min(len - 1),
            AppEvent::PageUp => self.cursor.saturating_sub(page),
            AppEvent::PageDown => (self.cursor + page).min(len - 1),
            _ => return,
        };
        self.scroll_to_cursor();
        tracing::trace!(cursor = self.cursor, offset = self.offset, "list: cursor moved");
    }

    /// Clamp the cursor after the option set changed size.
    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
        self.scroll_to_cursor();
    }

    fn scroll_to_cursor(&mut self) {
        let height = self.height();
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct OptionList<'a> {
    picker: &'a Picker,
    state: &'a OptionListState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> OptionList<'a> {
    pub fn new(
        picker: &'a Picker,
        state: &'a OptionListState,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            picker,
            state,
            focused,
            theme,
        }
    }

    fn title(&self) -> Line<'static> {
        let count = self.picker.options().len();
        let status = match self.picker.last_outcome() {
            _ if self.picker.is_loading() => {
                Span::styled(" loading ", self.theme.status_loading)
            }
            Some(Outcome::Failed(err)) => {
                Span::styled(format!(" {err} "), self.theme.status_error)
            }
            Some(Outcome::Loaded) => Span::styled(format!(" {count} "), self.theme.status_ok),
            None => Span::raw(""),
        };
        Line::from(vec![Span::raw("Options"), status])
    }
}

impl Widget for OptionList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(self.title())
            .border_style(self.theme.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;
        self.state.last_height.set(height);

        let options = self.picker.options();
        if options.is_empty() {
            let msg = if self.picker.is_loading() { "Loading…" } else { "No options" };
            Paragraph::new(Line::from(Span::styled(msg, self.theme.placeholder)))
                .render(inner, buf);
            return;
        }

        let total = options.len();
        let start = self.state.offset.min(total.saturating_sub(1));
        let end = (start + height).min(total);

        let lines: Vec<Line> = options.as_slice()[start..end]
            .iter()
            .enumerate()
            .map(|(row, option)| {
                let index = start + row;
                let selected = self.picker.is_selected(option);
                let marker = match (self.picker.selection().is_multi(), selected) {
                    (true, true) => "[x] ",
                    (true, false) => "[ ] ",
                    (false, true) => "● ",
                    (false, false) => "  ",
                };
                let mut spans = vec![Span::raw(marker)];
                if self.state.show_ids {
                    if let Some(id) = option.id() {
                        spans.push(Span::styled(format!("#{id:<6} "), self.theme.list_id));
                    }
                }
                let label_style = if selected {
                    self.theme.list_selected
                } else {
                    Default::default()
                };
                spans.push(Span::styled(option.label.clone(), label_style));

                let mut line = Line::from(spans);
                if index == self.state.cursor {
                    let cursor = if self.focused {
                        self.theme.list_cursor
                    } else {
                        self.theme.list_cursor.add_modifier(Modifier::DIM)
                    };
                    line = line.patch_style(cursor);
                }
                line
            })
            .collect();

        let text_area = Rect {
            width: inner.width.saturating_sub(1),
            ..inner
        };
        let sb_area = Rect {
            x: inner.right().saturating_sub(1),
            width: 1,
            ..inner
        };
        Paragraph::new(lines).render(text_area, buf);

        let mut sb_state = ScrollbarState::new(total)
            .position(start)
            .viewport_content_length(height);
        StatefulWidget::render(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            sb_area,
            buf,
            &mut sb_state,
        );
    }
}
