//! `:` commands: parsed from the command bar and run against [`AppState`].
//!
//! | Command | Action |
//! |---------|--------|
//! | `q`, `quit` | Leave without confirming |
//! | `w`, `done`, `confirm` | Confirm the selection and leave |
//! | `help` | Toggle the help popup |
//! | `theme <name>` | Switch theme (`default`, `gruvbox`) |
//! | `clear` | Empty the selection |
//! | `ids` | Toggle the `#id` column |

use crate::{app::AppState, theme::Theme};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Confirm,
    Help,
    Theme(String),
    Clear,
    Ids,
}

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// An empty string returns `Err("")` as a sentinel meaning "close
    /// without acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" | "q!" => Ok(Command::Quit),
            "w" | "wq" | "done" | "confirm" => Ok(Command::Confirm),
            "help" => Ok(Command::Help),
            "clear" => Ok(Command::Clear),
            "ids" => Ok(Command::Ids),
            "theme" => {
                if rest.is_empty() {
                    Err("usage: theme <default|gruvbox>".to_string())
                } else {
                    Ok(Command::Theme(rest.to_string()))
                }
            }
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Execute a parsed [`Command`] against the application state.
pub fn execute_command(s: &mut AppState, cmd: Command) {
    match cmd {
        Command::Quit => s.quit = true,
        Command::Confirm => s.confirm(),
        Command::Help => s.show_help = !s.show_help,
        Command::Theme(name) => s.theme = Theme::by_name(&name),
        Command::Clear => {
            s.picker.clear();
        }
        Command::Ids => s.list.show_ids = !s.list.show_ids,
    }
}
