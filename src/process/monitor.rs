//! Process launch and live output capture.
//!
//! `launch()` returns immediately. Reading happens on tokio tasks, one per
//! pipe, which push `RunEvent`s into an unbounded channel owned by the
//! `RunHandle`. A supervisor task waits for the child and publishes its exit
//! status at once. It then gives the readers up to `DRAIN_GRACE` to flush
//! what the child wrote before sending `Exited`. A grandchild that inherited
//! the pipes can hold them open long after the child is gone; its output is
//! read and discarded once `Exited` has been delivered.
//!
//! Dropping the handle stops observation only: the child keeps running and
//! the readers keep draining its pipes so it never stalls on a full buffer.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use futures::Stream;
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, timeout_at};

use super::types::{CommandSpec, RunEvent, RunStatus};

/// How long buffered output may trail the child's exit.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Launches processes and hands out a `RunHandle` per run.
#[derive(Debug, Default)]
pub struct ProcessMonitor {
    next_run_id: AtomicU64,
}

/// One launched (or failed-to-launch) process.
#[derive(Debug)]
pub struct RunHandle {
    pub run_id: u64,
    pub pid: Option<u32>,
    pub command: CommandSpec,
    pub started_at: DateTime<Local>,
    status: watch::Receiver<RunStatus>,
    events: mpsc::UnboundedReceiver<RunEvent>,
    /// Set once `Exited` or `Failed` has been handed out.
    finished: bool,
}

impl ProcessMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `spec` and start capturing its output. Must be called from
    /// within a tokio runtime.
    ///
    /// Spawn failures do not error: the handle's only event is `Failed`.
    pub fn launch(&self, spec: CommandSpec) -> RunHandle {
        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, events) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(RunStatus::Running);
        let started_at = Local::now();
        let command_line = spec.command_line();

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(
                    "Run {}: failed to spawn `{}` in {}: {}",
                    run_id,
                    command_line,
                    spec.cwd.display(),
                    e
                );
                status_tx.send_replace(RunStatus::Failed);
                let _ = tx.send(RunEvent::Failed {
                    reason: e.to_string(),
                    command_line,
                });
                return RunHandle {
                    run_id,
                    pid: None,
                    command: spec,
                    started_at,
                    status,
                    events,
                    finished: false,
                };
            }
        };

        let pid = child.id();
        info!("Run {}: started `{}` (pid {:?})", run_id, command_line, pid);
        let _ = tx.send(RunEvent::Started { pid });

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        tokio::spawn(async move {
            let readers = [
                stdout.map(|s| tokio::spawn(pump(s, tx.clone(), run_id, "stdout"))),
                stderr.map(|s| tokio::spawn(pump(s, tx.clone(), run_id, "stderr"))),
            ];

            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!("Run {}: wait failed: {}", run_id, e);
                    None
                }
            };

            status_tx.send_replace(RunStatus::Exited(code));

            let deadline = Instant::now() + DRAIN_GRACE;
            let mut lines = 0usize;
            let mut lingering = 0usize;
            for reader in readers.into_iter().flatten() {
                match timeout_at(deadline, reader).await {
                    Ok(count) => lines += count.unwrap_or(0),
                    Err(_) => lingering += 1,
                }
            }
            if lingering > 0 {
                warn!(
                    "Run {}: {} pipe(s) still open {:?} after exit, not waiting for them",
                    run_id, lingering, DRAIN_GRACE
                );
            }

            match code {
                Some(0) => info!("Run {}: exited cleanly after {} lines", run_id, lines),
                Some(code) => {
                    warn!("Run {}: exited with code {} after {} lines", run_id, code, lines)
                }
                None => warn!("Run {}: terminated by signal after {} lines", run_id, lines),
            }
            if tx.send(RunEvent::Exited { code }).is_err() {
                debug!("Run {}: exit not delivered, observer gone", run_id);
            }
        });

        RunHandle {
            run_id,
            pid,
            command: spec,
            started_at,
            status,
            events,
            finished: false,
        }
    }
}

/// Forward each line of `reader` as `RunEvent::Line`. Keeps reading after
/// the receiver is gone so the child can finish. Returns the line count.
async fn pump<R>(reader: R, tx: mpsc::UnboundedSender<RunEvent>, run_id: u64, name: &str) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut observed = true;
    let mut count = 0usize;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                count += 1;
                if observed && tx.send(RunEvent::Line(decode_line(&buf))).is_err() {
                    debug!("Run {}: observer gone, draining {} silently", run_id, name);
                    observed = false;
                }
            }
            Err(e) => {
                warn!("Run {}: {} read error: {}", run_id, name, e);
                break;
            }
        }
    }
    count
}

/// Lossy UTF-8 with the line terminator (`\n` or `\r\n`) removed.
pub fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

impl RunHandle {
    pub fn status(&self) -> RunStatus {
        *self.status.borrow()
    }

    /// Next event, or `None` once `Exited` or `Failed` has been returned.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.recv().await?;
        self.note(&event);
        Some(event)
    }

    /// Non-blocking poll for the next event.
    pub fn try_next_event(&mut self) -> Option<RunEvent> {
        if self.finished {
            return None;
        }
        let event = self.events.try_recv().ok()?;
        self.note(&event);
        Some(event)
    }

    fn note(&mut self, event: &RunEvent) {
        if event.is_terminal() {
            self.finished = true;
            self.events.close();
        }
    }

    /// Consume the handle as a stream of events, ending after `Exited` or `Failed`.
    pub fn into_stream(self) -> impl Stream<Item = RunEvent> + Send + 'static {
        let events = (!self.finished).then_some(self.events);
        futures::stream::unfold(events, |events| async move {
            let mut rx = events?;
            let event = rx.recv().await?;
            let rest = (!event.is_terminal()).then_some(rx);
            Some((event, rest))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_line_strips_terminators() {
        assert_eq!(decode_line(b"hello\n"), "hello");
        assert_eq!(decode_line(b"hello\r\n"), "hello");
        assert_eq!(decode_line(b"partial"), "partial");
        assert_eq!(decode_line(b"\n"), "");
    }

    #[test]
    fn test_decode_line_is_lossy() {
        assert_eq!(decode_line(b"ok \xff\n"), "ok \u{fffd}");
    }

    #[tokio::test]
    async fn test_run_ids_increment() {
        let monitor = ProcessMonitor::new();
        let spec = CommandSpec::new("definitely-not-a-real-binary-4242", vec![], ".");
        let first = monitor.launch(spec.clone());
        let second = monitor.launch(spec);
        assert_eq!(first.run_id + 1, second.run_id);
        assert_eq!(first.status(), RunStatus::Failed);
    }
}
