//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. The picker's requests run
//! on the tokio runtime it was built with; every tick the loop drains its
//! deliveries with [`Picker::poll`] before drawing.

use crate::{
    commands::{execute_command, Command},
    event::{AppEvent, Direction, KeyMap},
    theme::Theme,
    widgets::{
        command_bar::{CommandBar, CommandBarState},
        help::HelpPopup,
        option_list::{OptionList, OptionListState},
        query_bar::{QueryBar, TextInput},
        selection_bar::SelectionBar,
    },
};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    Frame, Terminal,
};
use std::{io, time::Duration};
use wpick_core::{config::UiConfig, Picker};

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Query,
    List,
    /// Vim-style `:` command line is active.
    Command,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub picker: Picker,
    pub query: TextInput,
    pub list: OptionListState,
    pub command_bar: CommandBarState,
    pub focus: Focus,
    /// Focus before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub keys: KeyMap,
    pub show_help: bool,
    pub quit: bool,
    /// Set when the user left by confirming rather than cancelling.
    pub confirmed: bool,
}

impl AppState {
    pub fn confirm(&mut self) {
        tracing::debug!(selected = self.picker.selection().len(), "selection confirmed");
        self.confirmed = true;
        self.quit = true;
    }

    fn can_search(&self) -> bool {
        let cfg = self.picker.config();
        cfg.searchable && !cfg.disabled
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
}

impl App {
    /// Wrap a picker. Mounts it (issuing the initial load) if it has not
    /// been mounted yet.
    pub fn new(mut picker: Picker, ui: &UiConfig, keys: KeyMap) -> Self {
        if picker.last_outcome().is_none() && !picker.is_loading() {
            picker.mount();
        }
        let searchable = picker.config().searchable && !picker.config().disabled;
        let focus = if searchable { Focus::Query } else { Focus::List };
        let list = OptionListState {
            show_ids: ui.show_ids,
            ..OptionListState::default()
        };

        App {
            state: AppState {
                picker,
                query: TextInput::default(),
                list,
                command_bar: CommandBarState::default(),
                focus,
                prev_focus: focus,
                theme: Theme::by_name(&ui.theme),
                keys,
                show_help: false,
                quit: false,
                confirmed: false,
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Set up the terminal, run the event loop, and restore the terminal on
    /// exit. Returns the picker when the selection was confirmed, `None`
    /// when the user cancelled.
    pub fn run(mut self) -> anyhow::Result<Option<Picker>> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result?;
        Ok(self.state.confirmed.then_some(self.state.picker))
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.tick();
            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                let raw = ct_event::read()?;
                if matches!(&raw, Event::Key(key) if key.kind != KeyEventKind::Press) {
                    continue;
                }
                // Use insert-mode mapping when a text widget is focused
                let app_event = if is_insert_mode(self.state.focus) {
                    self.state.keys.to_app_event_insert(raw)
                } else {
                    self.state.keys.to_app_event(raw)
                };
                if let Some(ev) = app_event {
                    tracing::trace!(focus = ?self.state.focus, event = ?ev, "key event");
                    self.handle(ev);
                }
            }
        }
        Ok(())
    }

    /// Apply any deliveries that arrived since the last frame.
    pub fn tick(&mut self) {
        let s = &mut self.state;
        if s.picker.poll() > 0 {
            s.list.clamp(s.picker.options().len());
        }
    }

    pub fn handle(&mut self, event: AppEvent) {
        let s = &mut self.state;

        // Help popup intercepts all events; only close keys pass through.
        if s.show_help {
            match event {
                AppEvent::Help | AppEvent::Escape | AppEvent::Quit => {
                    tracing::debug!("help popup closed");
                    s.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match s.focus {
            Focus::Command => handle_command(s, event),
            Focus::Query => handle_query(s, event),
            Focus::List => handle_list(s, event),
        }
    }
}

/// Returns true when the current focus is on a text-input widget, meaning
/// alphabetic keys should produce characters rather than trigger shortcuts.
fn is_insert_mode(focus: Focus) -> bool {
    matches!(focus, Focus::Query | Focus::Command)
}

fn handle_command(s: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::Escape => {
            tracing::debug!("command bar cancelled");
            s.command_bar.clear();
            s.focus = s.prev_focus;
        }
        AppEvent::Quit => s.quit = true,
        AppEvent::Enter => match Command::parse(s.command_bar.text()) {
            Ok(cmd) => {
                tracing::debug!(command = ?cmd, "executing command");
                s.command_bar.clear();
                s.focus = s.prev_focus;
                execute_command(s, cmd);
            }
            Err(msg) if msg.is_empty() => {
                s.command_bar.clear();
                s.focus = s.prev_focus;
            }
            Err(msg) => s.command_bar.error = Some(msg),
        },
        other => s.command_bar.handle(&other),
    }
}

fn handle_query(s: &mut AppState, event: AppEvent) {
    match event {
        AppEvent::Quit => s.quit = true,
        AppEvent::Escape | AppEvent::Enter | AppEvent::FocusNext => {
            tracing::debug!("focus: Query -> List");
            s.focus = Focus::List;
        }
        // Vertical keys move the list cursor without leaving the search
        AppEvent::Nav(d @ (Direction::Up | Direction::Down)) => {
            let len = s.picker.options().len();
            s.list.handle(&AppEvent::Nav(d), len);
        }
        other => {
            if s.query.handle(&other) {
                s.picker.set_query(s.query.text.clone());
            }
        }
    }
}

fn handle_list(s: &mut AppState, event: AppEvent) {
    let len = s.picker.options().len();
    match event {
        AppEvent::Quit => {
            tracing::debug!("quit");
            s.quit = true;
        }
        AppEvent::Help => {
            tracing::debug!("help popup opened");
            s.show_help = true;
        }
        AppEvent::CommandFocus => {
            tracing::debug!(prev_focus = ?s.focus, "entering command mode");
            s.prev_focus = s.focus;
            s.command_bar.clear();
            s.focus = Focus::Command;
        }
        AppEvent::QueryFocus | AppEvent::FocusNext if s.can_search() => {
            tracing::debug!("focus: List -> Query");
            s.focus = Focus::Query;
        }
        AppEvent::Toggle => {
            s.picker.choose(s.list.cursor);
        }
        AppEvent::Enter => {
            // Single mode: Enter picks the option under the cursor.
            if !s.picker.selection().is_multi() && len > 0 {
                s.picker.choose(s.list.cursor);
            }
            s.confirm();
        }
        AppEvent::Clear => {
            s.picker.clear();
        }
        AppEvent::RemoveLast => {
            s.picker.remove_last();
        }
        AppEvent::Nav(_) | AppEvent::PageUp | AppEvent::PageDown => s.list.handle(&event, len),
        // Terminal resize is handled automatically by ratatui
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: 3-line query bar | option list | 3-line selection bar
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .split(area);

    let placeholder = state.picker.placeholder();
    let query_bar = QueryBar::new(
        &state.query,
        &placeholder,
        state.picker.is_loading(),
        state.focus == Focus::Query,
        &state.theme,
    );
    let cursor = query_bar.cursor_position(vert[0]);
    frame.render_widget(query_bar, vert[0]);
    frame.render_widget(
        OptionList::new(&state.picker, &state.list, state.focus == Focus::List, &state.theme),
        vert[1],
    );
    frame.render_widget(
        SelectionBar::new(state.picker.selection(), &placeholder, &state.theme),
        vert[2],
    );

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.keys, &state.theme), area);
    }

    // Command bar overlays the bottom row of the screen
    if state.focus == Focus::Command {
        let cmd_area = Rect {
            y: area.bottom().saturating_sub(1),
            height: 1,
            ..area
        };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        frame.set_cursor_position((state.command_bar.cursor_col(cmd_area), cmd_area.y));
        return;
    }

    if state.focus == Focus::Query {
        frame.set_cursor_position(cursor);
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
