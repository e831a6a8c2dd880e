//! # Process Monitor
//!
//! Runs the external crawler and streams its output back to whoever is
//! watching. One `RunHandle` per launch; starting another run does not stop
//! the previous one, it only stops anyone from listening to it.

pub mod monitor;
pub mod types;

pub use monitor::{ProcessMonitor, RunHandle, decode_line};
pub use types::{CRAWL_FLAGS, CommandSpec, RunEvent, RunStatus, crawl_command};
