//! Selection bar: the chosen options rendered as coloured chips.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
};
use wpick_core::Selection;

pub struct SelectionBar<'a> {
    selection: &'a Selection,
    placeholder: &'a str,
    theme: &'a Theme,
}

impl<'a> SelectionBar<'a> {
    pub fn new(selection: &'a Selection, placeholder: &'a str, theme: &'a Theme) -> Self {
        Self {
            selection,
            placeholder,
            theme,
        }
    }

    fn line(&self) -> Line<'a> {
        if self.selection.is_empty() {
            return Line::from(Span::styled(self.placeholder, self.theme.placeholder));
        }
        let mut spans = Vec::with_capacity(self.selection.len() * 2);
        for option in self.selection.as_slice() {
            spans.push(Span::styled(
                format!(" {} ", option.label),
                self.theme.chip_style(&option.label),
            ));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }
}

impl Widget for SelectionBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.selection.is_multi() {
            format!("Selected ({})", self.selection.len())
        } else {
            "Selected".to_string()
        };
        let block = Block::bordered()
            .title(title)
            .border_style(self.theme.border(false));
        Paragraph::new(self.line())
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }
}
