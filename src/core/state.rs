//! # Application State
//!
//! Core business state for the desk. Domain data only; presentation state
//! (selection, input buffer, scroll) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── registry: PlatformRegistry    // immutable platform table
//! ├── project_root: PathBuf         // crawler checkout, cwd for runs
//! ├── crawler: CrawlerConfig        // program + leading args
//! ├── current: usize                // index of the selected platform
//! ├── store: ListStore              // creator list of the selected platform
//! ├── notice: Notice                // status bar text + level
//! ├── run: Option<ActiveRun>        // the run currently observed
//! └── run_log: VecDeque<String>     // its output, capped at max_log_lines
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::core::config::{CrawlerConfig, ResolvedConfig};
use crate::core::list_store::ListStore;
use crate::core::platform::{PlatformBinding, PlatformRegistry};
use crate::process::RunStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// One status bar message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

/// The run whose output is on screen. Older runs are not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRun {
    pub run_id: u64,
    pub platform_key: String,
    pub command_line: String,
    pub pid: Option<u32>,
    pub started_at: DateTime<Local>,
    pub status: RunStatus,
}

pub struct App {
    pub registry: PlatformRegistry,
    pub project_root: PathBuf,
    pub crawler: CrawlerConfig,
    pub current: usize,
    pub store: ListStore,
    pub notice: Notice,
    pub run: Option<ActiveRun>,
    pub run_log: VecDeque<String>,
    pub max_log_lines: usize,
}

impl App {
    pub fn new(config: &ResolvedConfig) -> Self {
        let registry = config.registry.clone();
        let current = registry.index_of(&config.default_platform).unwrap_or(0);
        let binding = registry
            .by_index(current)
            .cloned()
            .unwrap_or_else(|| PlatformBinding::new("", "", "", ""));
        let store = ListStore::open(&binding, &config.project_root);

        Self {
            notice: Notice::info(format!(
                "{}: {} creators",
                binding.display_name,
                store.len()
            )),
            registry,
            project_root: config.project_root.clone(),
            crawler: config.crawler.clone(),
            current,
            store,
            run: None,
            run_log: VecDeque::new(),
            max_log_lines: config.max_log_lines,
        }
    }

    pub fn binding(&self) -> &PlatformBinding {
        self.store.binding()
    }

    /// Append a line to the run log, evicting the oldest past the cap.
    pub fn push_log(&mut self, line: String) {
        self.run_log.push_back(line);
        while self.run_log.len() > self.max_log_lines {
            self.run_log.pop_front();
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|r| r.status.is_running())
    }
}
