//! # Actions
//!
//! Everything that can happen in the desk becomes an `Action`.
//! User presses Enter with text typed? That's `Action::AddIdentifier(text)`.
//! The crawler prints a line? That's `Action::Run { run_id, event: Line(..) }`.
//!
//! The `update()` function applies an action to the state and returns an
//! `Effect` for the adapter to carry out. File writes happen inside
//! `ListStore`; process spawning is left to the adapter via `Effect::Launch`.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use chrono::{DateTime, Local};
use log::{debug, info};

use crate::core::list_store::{Edit, ListStore};
use crate::core::state::{ActiveRun, App, Notice};
use crate::process::{CommandSpec, RunEvent, RunStatus, crawl_command};

#[derive(Debug, Clone)]
pub enum Action {
    SelectPlatform(usize),
    NextPlatform,
    PrevPlatform,
    AddIdentifier(String),
    /// 0-based index into the current list.
    RemoveIdentifier(usize),
    RunCrawler,
    /// The adapter launched the command from `Effect::Launch`.
    RunLaunched {
        run_id: u64,
        platform_key: String,
        command_line: String,
        started_at: DateTime<Local>,
    },
    Run {
        run_id: u64,
        event: RunEvent,
    },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Launch(CommandSpec),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::SelectPlatform(index) => {
            select_platform(app, index);
            Effect::None
        }
        Action::NextPlatform => {
            let count = app.registry.len().max(1);
            select_platform(app, (app.current + 1) % count);
            Effect::None
        }
        Action::PrevPlatform => {
            let count = app.registry.len().max(1);
            select_platform(app, (app.current + count - 1) % count);
            Effect::None
        }
        Action::AddIdentifier(text) => {
            let value = text.trim().to_string();
            app.notice = match app.store.add(&value) {
                Ok(Edit::Added(v)) => Notice::info(format!("Added {v}")),
                Ok(Edit::Rejected { value, reason }) => {
                    Notice::warning(format!("Cannot add {value:?}: {reason}"))
                }
                Ok(_) if value.is_empty() => Notice::warning("Nothing to add"),
                Ok(_) => Notice::info(format!("{value} is already in the list")),
                Err(e) => Notice::error(format!("Save failed: {e}")),
            };
            Effect::None
        }
        Action::RemoveIdentifier(index) => {
            match app.store.remove_at(index) {
                Ok(Edit::Removed { value, .. }) => {
                    app.notice = Notice::info(format!("Removed {value}"));
                }
                Ok(_) => debug!("No entry at index {}", index),
                Err(e) => app.notice = Notice::error(format!("Save failed: {e}")),
            }
            Effect::None
        }
        Action::RunCrawler => {
            let spec = crawl_command(&app.crawler, &app.binding().key, &app.project_root);
            if app.is_running() {
                info!("Starting a new run; the previous one keeps running unobserved");
            }
            Effect::Launch(spec)
        }
        Action::RunLaunched {
            run_id,
            platform_key,
            command_line,
            started_at,
        } => {
            app.run_log.clear();
            app.push_log(format!("$ {command_line}"));
            app.notice = Notice::info(format!("Running: {command_line}"));
            app.run = Some(ActiveRun {
                run_id,
                platform_key,
                command_line,
                pid: None,
                started_at,
                status: RunStatus::Running,
            });
            Effect::None
        }
        Action::Run { run_id, event } => {
            apply_run_event(app, run_id, event);
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn select_platform(app: &mut App, index: usize) {
    if index == app.current {
        return;
    }
    let Some(binding) = app.registry.by_index(index).cloned() else {
        debug!("No platform at index {}", index);
        return;
    };

    app.current = index;
    app.store = ListStore::open(&binding, &app.project_root);
    app.notice = match app.store.load_issue() {
        Some(issue) => Notice::warning(format!("{}: {issue}", binding.display_name)),
        None => Notice::info(format!(
            "Switched to {} ({} creators)",
            binding.display_name,
            app.store.len()
        )),
    };
}

fn apply_run_event(app: &mut App, run_id: u64, event: RunEvent) {
    let Some(run) = app.run.as_mut().filter(|r| r.run_id == run_id) else {
        debug!("Dropping event from abandoned run {}: {:?}", run_id, event);
        return;
    };

    match event {
        RunEvent::Started { pid } => {
            run.pid = pid;
            let pid = pid.map_or_else(|| "?".to_string(), |p| p.to_string());
            app.notice =
                Notice::info(format!("Crawler started for {} (PID {pid})", run.platform_key));
        }
        RunEvent::Line(line) => app.push_log(line),
        RunEvent::Failed {
            reason,
            command_line,
        } => {
            run.status = RunStatus::Failed;
            app.notice = Notice::error(format!("Failed to start `{command_line}`: {reason}"));
            app.push_log(format!("[failed: {reason}]"));
        }
        RunEvent::Exited { code } => {
            run.status = RunStatus::Exited(code);
            app.notice = match code {
                Some(0) => Notice::info("Crawler finished (exit code 0)"),
                Some(code) => Notice::warning(format!("Crawler exited with code {code}")),
                None => Notice::warning("Crawler was terminated by a signal"),
            };
            app.push_log(format!("[{}]", RunStatus::Exited(code)));
        }
    }
}
