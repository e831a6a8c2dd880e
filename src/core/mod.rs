//! # Core Application Logic
//!
//! Everything that edits creator lists and tracks crawler runs.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Registry (platforms) │
//!                    │  • ListStore (files)    │
//!                    │  • State + Action       │
//!                    │  • update() (reducer)   │
//!                    └───────────┬─────────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!             ┌────────────┐          ┌────────────┐
//!             │    TUI     │          │    CLI     │
//!             │  Adapter   │          │ subcommands│
//!             │ (ratatui)  │          │            │
//!             └────────────┘          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`anchor`]: locate and rewrite `NAME = [...]` inside a text file
//! - [`identifiers`]: the ordered, duplicate-free `IdentifierList`
//! - [`list_store`]: `ListStore`, write-through persistence for one platform
//! - [`platform`]: `PlatformBinding` and the immutable `PlatformRegistry`
//! - [`config`]: config file, env and CLI resolution
//! - [`state`]: the `App` struct, all application state in one place
//! - [`action`]: the `Action` enum and `update()`

pub mod action;
pub mod anchor;
pub mod config;
pub mod identifiers;
pub mod list_store;
pub mod platform;
pub mod state;
