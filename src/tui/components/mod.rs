//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Simple display components that receive all data as struct fields:
//! - `TitleBar`: platform tabs
//! - `StatusBar`: latest notice and key help
//!
//! ### Stateful Components (Persistent State + Transient Wrapper)
//!
//! The state lives in `TuiState`; a wrapper borrowing it is built each frame:
//! - `CreatorList` / `CreatorListState`: numbered creator IDs with selection
//! - `RunLog` / `RunLogState`: crawler output with scrollback
//!
//! `InputBox` owns its buffer directly and implements `EventHandler`.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Platform tabs)
//! ├── creator_list.rs  (Creator IDs of the selected platform)
//! ├── run_log.rs       (Crawler output)
//! ├── input_box.rs     (Single-line entry)
//! └── status_bar.rs    (Notice + key help)
//! ```

pub mod creator_list;
pub mod input_box;
pub mod run_log;
mod status_bar;
mod title_bar;

pub use creator_list::{CreatorList, CreatorListState};
pub use input_box::{InputBox, InputEvent};
pub use run_log::{RunLog, RunLogState};
pub use status_bar::StatusBar;
pub use title_bar::TitleBar;
