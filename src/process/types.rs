use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::config::CrawlerConfig;

/// Fixed crawler flags following `--platform <key>`.
pub const CRAWL_FLAGS: &[&str] = &[
    "--lt",
    "qrcode",
    "--type",
    "creator",
    "--save_data_option",
    "postgres",
];

/// A fully specified process invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Extra environment, layered over the parent's.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Program and args as a shell-like string, for display only.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| {
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("'{part}'")
                } else {
                    part.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Build the crawler invocation for `platform_key`.
pub fn crawl_command(
    crawler: &CrawlerConfig,
    platform_key: &str,
    project_root: &Path,
) -> CommandSpec {
    let mut args = crawler.args.clone();
    args.push("--platform".to_string());
    args.push(platform_key.to_string());
    args.extend(CRAWL_FLAGS.iter().map(|s| s.to_string()));

    // Python block-buffers piped stdout; without this nothing arrives until exit.
    CommandSpec::new(crawler.program.clone(), args, project_root)
        .with_env("PYTHONUNBUFFERED", "1")
}

/// What an observer of a run sees, in order:
/// `Started`, zero or more `Line`s, then `Exited`. A spawn failure yields
/// only `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Started { pid: Option<u32> },
    Line(String),
    Failed { reason: String, command_line: String },
    /// `None` when the process was terminated by a signal.
    Exited { code: Option<i32> },
}

impl RunEvent {
    /// True for the last event a run produces.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Exited { .. } | RunEvent::Failed { .. })
    }
}

/// Point-in-time state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Exited(Option<i32>),
    Failed,
}

impl RunStatus {
    pub fn is_running(self) -> bool {
        matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Exited(Some(code)) => write!(f, "exited({code})"),
            RunStatus::Exited(None) => write!(f, "terminated by signal"),
            RunStatus::Failed => write!(f, "failed to start"),
        }
    }
}
