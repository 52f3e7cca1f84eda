//! Help popup: centred floating overlay listing the keybindings.
//!
//! Toggle with `?`; close with `?` or `Escape`.

use crate::event::KeyMap;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Widget},
};

pub struct HelpPopup<'a> {
    keys: &'a KeyMap,
    theme: &'a Theme,
}

impl<'a> HelpPopup<'a> {
    pub fn new(keys: &'a KeyMap, theme: &'a Theme) -> Self {
        Self { keys, theme }
    }

    fn bindings(&self) -> Vec<(String, &'static str)> {
        vec![
            ("q  /  Ctrl+c".into(), "Quit without confirming"),
            ("Tab".into(), "Cycle focus: search ↔ options"),
            (self.keys.query_focus.to_string(), "Focus search"),
            ("Escape".into(), "Leave search"),
            ("↑ k  /  ↓ j".into(), "Move cursor"),
            ("PageUp / PageDown".into(), "Move one page"),
            ("Space".into(), "Select / deselect option"),
            ("Enter".into(), "Confirm selection"),
            (self.keys.clear.to_string(), "Clear selection"),
            (self.keys.remove_last.to_string(), "Remove last selected"),
            (":".into(), "Command line (:w, :q, :theme, :ids)"),
            (self.keys.help.to_string(), "Toggle this help popup"),
        ]
    }
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bindings = self.bindings();
        let popup = centered_rect(64, bindings.len() as u16 + 2, area);
        Clear.render(popup, buf);

        let block = Block::bordered()
            .title(" wpick — keybindings (? to close) ")
            .border_style(self.theme.border_focused);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let lines: Vec<Line> = bindings
            .into_iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(
                        format!("  {key:<20}"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(desc),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
