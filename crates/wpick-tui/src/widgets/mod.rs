//! Ratatui widgets for the wpick TUI.

pub mod command_bar;
pub mod help;
pub mod option_list;
pub mod query_bar;
pub mod selection_bar;
