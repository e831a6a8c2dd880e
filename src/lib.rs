//! creator-desk library: list editing, crawler supervision, and the TUI.

pub mod cli;
pub mod core;
pub mod process;
pub mod tui;

#[cfg(test)]
pub mod test_support;
