//! Command-line surface.
//!
//! Without a subcommand the binary opens the TUI. The subcommands cover the
//! same operations for scripting: list, add and remove creator IDs, or run a
//! crawl with its output streamed to stdout.

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use crate::core::config::ResolvedConfig;
use crate::core::list_store::{Edit, ListStore, StoreError};
use crate::core::platform::PlatformBinding;
use crate::process::{ProcessMonitor, RunEvent, crawl_command};

#[derive(Parser, Debug)]
#[command(
    name = "creator-desk",
    version,
    about = "Edit crawler creator lists and launch creator crawls"
)]
pub struct Cli {
    /// Crawler project root (the directory holding config/ and main.py)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file to use instead of ~/.creator-desk/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Platform selected when the TUI opens
    #[arg(short, long)]
    pub platform: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Show the configured platforms
    Platforms,
    /// Print a platform's creator IDs
    List {
        platform: String,
        /// Print a JSON array instead of a numbered list
        #[arg(long)]
        json: bool,
    },
    /// Append creator IDs (duplicates and blanks are skipped)
    Add {
        platform: String,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Remove the entry at a 1-based position, as shown by `list`
    Remove { platform: String, index: usize },
    /// Run the crawler for a platform and stream its output
    Run { platform: String },
}

#[derive(Debug)]
pub enum CliError {
    UnknownPlatform { key: String, known: Vec<String> },
    /// The list could not be read; the message comes from the store.
    Load(String),
    Store(StoreError),
    BadIndex { index: usize, len: usize },
    Launch { command_line: String, reason: String },
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::UnknownPlatform { key, known } => {
                write!(f, "unknown platform '{key}' (expected one of: {})", known.join(", "))
            }
            CliError::Load(msg) => write!(f, "{msg}"),
            CliError::Store(e) => write!(f, "{e}"),
            CliError::BadIndex { index, len } => {
                write!(f, "no entry at position {index} (list has {len})")
            }
            CliError::Launch {
                command_line,
                reason,
            } => write!(f, "failed to start `{command_line}`: {reason}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
            CliError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Store(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

/// Run one subcommand, writing its output to `out`. Returns the process exit code.
pub async fn execute(
    command: Command,
    config: &ResolvedConfig,
    out: &mut dyn Write,
) -> Result<i32, CliError> {
    match command {
        Command::Platforms => {
            for binding in config.registry.iter() {
                let marker = if binding.key == config.default_platform { "*" } else { " " };
                writeln!(
                    out,
                    "{marker} {:<8} {:<12} {:<28} {}",
                    binding.key,
                    binding.display_name,
                    binding.attribute_name,
                    binding.file_path.display()
                )?;
            }
            Ok(0)
        }
        Command::List { platform, json } => {
            let store = open_store(config, &platform)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(store.ids())?)?;
            } else {
                for (i, id) in store.ids().iter().enumerate() {
                    writeln!(out, "{:>3}. {}", i + 1, id)?;
                }
            }
            Ok(0)
        }
        Command::Add { platform, ids } => {
            let mut store = open_store(config, &platform)?;
            for id in ids {
                match store.add(&id)? {
                    Edit::Added(value) => writeln!(out, "added {value}")?,
                    Edit::Rejected { value, reason } => {
                        writeln!(out, "skipped {value:?}: {reason}")?
                    }
                    _ if id.trim().is_empty() => {}
                    _ => writeln!(out, "{} already listed", id.trim())?,
                }
            }
            Ok(0)
        }
        Command::Remove { platform, index } => {
            let mut store = open_store(config, &platform)?;
            let len = store.len();
            if index == 0 || index > len {
                return Err(CliError::BadIndex { index, len });
            }
            if let Edit::Removed { value, .. } = store.remove_at(index - 1)? {
                writeln!(out, "removed {value}")?;
            }
            Ok(0)
        }
        Command::Run { platform } => {
            let binding = find_binding(config, &platform)?;
            run_crawler(config, binding, out).await
        }
    }
}

fn find_binding<'a>(
    config: &'a ResolvedConfig,
    key: &str,
) -> Result<&'a PlatformBinding, CliError> {
    config
        .registry
        .get(key)
        .ok_or_else(|| CliError::UnknownPlatform {
            key: key.to_string(),
            known: config.registry.keys().iter().map(|k| k.to_string()).collect(),
        })
}

/// Open a platform's list, refusing to continue if it could not be read.
fn open_store(config: &ResolvedConfig, key: &str) -> Result<ListStore, CliError> {
    let binding = find_binding(config, key)?;
    let store = ListStore::open(binding, &config.project_root);
    match store.load_issue() {
        Some(issue) => Err(CliError::Load(issue.to_string())),
        None => Ok(store),
    }
}

async fn run_crawler(
    config: &ResolvedConfig,
    binding: &PlatformBinding,
    out: &mut dyn Write,
) -> Result<i32, CliError> {
    let spec = crawl_command(&config.crawler, &binding.key, &config.project_root);
    let monitor = ProcessMonitor::new();
    let mut handle = monitor.launch(spec);

    while let Some(event) = handle.next_event().await {
        match event {
            RunEvent::Started { pid } => {
                info!("Crawl for {} started (pid {:?})", binding.key, pid);
            }
            RunEvent::Line(line) => {
                writeln!(out, "{line}")?;
                out.flush()?;
            }
            RunEvent::Failed {
                reason,
                command_line,
            } => {
                return Err(CliError::Launch {
                    command_line,
                    reason,
                });
            }
            RunEvent::Exited { code } => {
                info!("Crawl for {} finished: {}", binding.key, handle.status());
                // Signals have no code; report them as a generic failure
                return Ok(code.unwrap_or(1));
            }
        }
    }
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_config, write_platform_file};
    use std::fs;

    async fn exec(command: Command, config: &ResolvedConfig) -> (Result<i32, CliError>, String) {
        let mut out = Vec::new();
        let result = execute(command, config, &mut out).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_subcommands() {
        let cli =
            Cli::try_parse_from(["creator-desk", "--root", "/tmp/x", "list", "dy", "--json"])
                .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/x")));
        assert_eq!(
            cli.command,
            Some(Command::List {
                platform: "dy".into(),
                json: true
            })
        );

        let cli = Cli::try_parse_from(["creator-desk"]).unwrap();
        assert!(cli.command.is_none());

        assert!(Cli::try_parse_from(["creator-desk", "add", "dy"]).is_err());
        assert!(Cli::try_parse_from(["creator-desk", "remove", "dy", "first"]).is_err());
    }

    #[tokio::test]
    async fn test_list_numbers_from_one() {
        let dir = tempfile::tempdir().unwrap();
        write_platform_file(dir.path(), "foo", "FOO_LIST = ['a', 'b']\n");
        let config = test_config(dir.path());

        let (result, out) = exec(
            Command::List {
                platform: "foo".into(),
                json: false,
            },
            &config,
        )
        .await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out, "  1. a\n  2. b\n");
    }

    #[tokio::test]
    async fn test_list_json() {
        let dir = tempfile::tempdir().unwrap();
        write_platform_file(dir.path(), "foo", "FOO_LIST = ['a']\n");
        let config = test_config(dir.path());

        let (_, out) = exec(
            Command::List {
                platform: "foo".into(),
                json: true,
            },
            &config,
        )
        .await;
        let parsed: Vec<String> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, vec!["a"]);
    }

    #[tokio::test]
    async fn test_add_reports_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_platform_file(dir.path(), "foo", "FOO_LIST = ['a']\n");
        let config = test_config(dir.path());

        let (result, out) = exec(
            Command::Add {
                platform: "foo".into(),
                ids: vec!["a".into(), "b".into()],
            },
            &config,
        )
        .await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out, "a already listed\nadded b\n");
        assert!(fs::read_to_string(path).unwrap().contains("\"b\""));
    }

    #[tokio::test]
    async fn test_add_skips_unstorable_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_platform_file(dir.path(), "foo", "FOO_LIST = []\n");
        let config = test_config(dir.path());

        let (result, out) = exec(
            Command::Add {
                platform: "foo".into(),
                ids: vec!["say \"it's\"".into(), "ok".into()],
            },
            &config,
        )
        .await;
        assert_eq!(result.unwrap(), 0);
        assert!(out.starts_with("skipped "));
        assert!(out.ends_with("added ok\n"));
        assert_eq!(fs::read_to_string(path).unwrap(), "FOO_LIST = [\n    \"ok\"\n]\n");
    }

    #[tokio::test]
    async fn test_remove_is_one_based_and_checked() {
        let dir = tempfile::tempdir().unwrap();
        write_platform_file(dir.path(), "foo", "FOO_LIST = ['a', 'b']\n");
        let config = test_config(dir.path());

        let (result, out) = exec(
            Command::Remove {
                platform: "foo".into(),
                index: 2,
            },
            &config,
        )
        .await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(out, "removed b\n");

        let (result, _) = exec(
            Command::Remove {
                platform: "foo".into(),
                index: 0,
            },
            &config,
        )
        .await;
        assert!(matches!(result, Err(CliError::BadIndex { index: 0, len: 1 })));
    }

    #[tokio::test]
    async fn test_unknown_platform_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let (result, _) = exec(Command::Run { platform: "nope".into() }, &config).await;
        assert!(matches!(result, Err(CliError::UnknownPlatform { .. })));

        let (result, _) = exec(
            Command::List {
                platform: "bar".into(),
                json: false,
            },
            &config,
        )
        .await;
        assert!(matches!(result, Err(CliError::Load(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_streams_output_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.crawler.program = "sh".into();
        // $1 is --platform, $2 the key
        config.crawler.args = vec!["-c".into(), "echo crawl-$2; exit 3".into(), "sh".into()];

        let (result, out) = exec(Command::Run { platform: "foo".into() }, &config).await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(out, "crawl-foo\n");
    }

    #[tokio::test]
    async fn test_run_missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.crawler.program = "definitely-not-a-real-binary-4242".into();

        let (result, out) = exec(Command::Run { platform: "foo".into() }, &config).await;
        assert!(matches!(result, Err(CliError::Launch { .. })));
        assert!(out.is_empty());
    }
}
