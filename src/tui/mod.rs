//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values, and carries out
//! the `Effect`s that `update()` returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop only redraws when something changed:
//!
//! - **Running** (a crawl is being observed): polls input every 100ms so
//!   output lines forwarded from the run show up promptly.
//! - **Idle**: sleeps up to 500ms between polls.
//!
//! Run output reaches the loop as `Action::Run` values on a std mpsc channel,
//! fed by one forwarder task per run. The loop drains it with `try_recv`
//! after handling input, so neither side ever blocks the other.

mod component;
mod components;
mod event;
mod ui;

use std::io::stdout;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};
use ratatui::DefaultTerminal;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::process::{CommandSpec, ProcessMonitor, RunHandle};
use crate::tui::component::EventHandler;
use crate::tui::components::{CreatorListState, InputBox, InputEvent, RunLogState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const RUNNING_POLL: Duration = Duration::from_millis(100);
const IDLE_POLL: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub creator_list: CreatorListState,
    pub run_log: RunLogState,
    pub input_box: InputBox,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            creator_list: CreatorListState::new(),
            run_log: RunLogState::new(),
            input_box: InputBox::new(),
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is ignored by terminals that don't support it
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady cursor, key enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Run the interactive desk until the user quits. Must be called from
/// within a tokio runtime (runs are observed on spawned tasks).
pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::new(&config);
    let mut tui = TuiState::new();
    if let Some(issue) = app.store.load_issue() {
        warn!("Initial load of {}: {}", app.binding().key, issue);
    }

    let mut terminal = ratatui::init();
    let guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to enable terminal modes: {}", e))
        .ok();

    let result = event_loop(&mut terminal, &mut app, &mut tui);

    drop(guard);
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    tui: &mut TuiState,
) -> std::io::Result<()> {
    let monitor = ProcessMonitor::new();
    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let mut needs_redraw = true;

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, app, tui))?;
            needs_redraw = false;
        }

        let timeout = if app.is_running() { RUNNING_POLL } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(app, tui, event, &monitor, &tx) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if dispatch(app, action, &monitor, &tx) {
                return Ok(());
            }
        }
    }

    info!("Quitting");
    Ok(())
}

/// Route one input event. Returns true when the desk should quit.
fn handle_event(
    app: &mut App,
    tui: &mut TuiState,
    event: TuiEvent,
    monitor: &ProcessMonitor,
    tx: &mpsc::Sender<Action>,
) -> bool {
    let action = match event {
        TuiEvent::Resize => return false,
        TuiEvent::ForceQuit => Action::Quit,
        TuiEvent::RunCrawler => Action::RunCrawler,
        TuiEvent::NextPlatform => Action::NextPlatform,
        TuiEvent::PrevPlatform => Action::PrevPlatform,
        TuiEvent::SelectPlatform(index) => Action::SelectPlatform(index),
        TuiEvent::ScrollLogUp | TuiEvent::ScrollLogDown => {
            tui.run_log.handle_event(&event, app.run_log.len());
            return false;
        }
        TuiEvent::CursorUp | TuiEvent::CursorDown => {
            tui.creator_list.handle_event(&event, app.store.len());
            return false;
        }
        TuiEvent::Escape if tui.input_box.buffer.is_empty() => Action::Quit,
        TuiEvent::Escape => {
            tui.input_box.clear();
            return false;
        }
        TuiEvent::RemoveEntry => match tui.creator_list.selection(app.store.len()) {
            Some(index) => Action::RemoveIdentifier(index),
            None => return false,
        },
        TuiEvent::Delete if tui.input_box.buffer.is_empty() => {
            match tui.creator_list.selection(app.store.len()) {
                Some(index) => Action::RemoveIdentifier(index),
                None => return false,
            }
        }
        other => match tui.input_box.handle_event(&other) {
            Some(InputEvent::Submit(text)) => Action::AddIdentifier(text),
            Some(InputEvent::ContentChanged) | None => return false,
        },
    };

    let switching = matches!(
        action,
        Action::NextPlatform | Action::PrevPlatform | Action::SelectPlatform(_)
    );
    let previous = app.current;
    let quit = dispatch(app, action, monitor, tx);
    if switching && app.current != previous {
        tui.creator_list = CreatorListState::new();
    }
    tui.creator_list.clamp(app.store.len());
    quit
}

/// Apply an action and carry out its effect. Returns true on quit.
fn dispatch(
    app: &mut App,
    action: Action,
    monitor: &ProcessMonitor,
    tx: &mpsc::Sender<Action>,
) -> bool {
    debug!("Dispatching: {:?}", action);
    match update(app, action) {
        Effect::None => false,
        Effect::Quit => true,
        Effect::Launch(spec) => {
            launch_run(app, spec, monitor, tx);
            false
        }
    }
}

fn launch_run(
    app: &mut App,
    spec: CommandSpec,
    monitor: &ProcessMonitor,
    tx: &mpsc::Sender<Action>,
) {
    info!("Launching crawler: {} (cwd {})", spec.command_line(), spec.cwd.display());
    let platform_key = app.binding().key.clone();
    let handle = monitor.launch(spec);
    let launched = Action::RunLaunched {
        run_id: handle.run_id,
        platform_key,
        command_line: handle.command.command_line(),
        started_at: handle.started_at,
    };
    update(app, launched);
    spawn_run_forwarder(handle, tx.clone());
}

/// Forward a run's events into the action channel until the run is over.
fn spawn_run_forwarder(mut handle: RunHandle, tx: mpsc::Sender<Action>) {
    let run_id = handle.run_id;
    tokio::spawn(async move {
        let mut forwarded = 0usize;
        while let Some(event) = handle.next_event().await {
            forwarded += 1;
            if tx.send(Action::Run { run_id, event }).is_err() {
                warn!("Run {}: receiver dropped, stopping forwarder", run_id);
                return;
            }
        }
        debug!("Run {}: forwarder done after {} events", run_id, forwarded);
    });
}
