//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.creator-desk/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::platform::{PlatformBinding, PlatformRegistry, builtin_bindings};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DeskConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub crawler: CrawlerSection,
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub project_root: Option<PathBuf>,
    pub default_platform: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub max_log_lines: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CrawlerSection {
    pub program: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformEntry {
    pub key: String,
    pub name: String,
    pub file: String,
    pub attribute: String,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_CRAWLER_PROGRAM: &str = "uv";
pub const DEFAULT_CRAWLER_ARGS: &[&str] = &["run", "main.py"];
pub const DEFAULT_MAX_LOG_LINES: usize = 2000;
pub const DEFAULT_LOG_LEVEL: &str = "debug";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// How the crawler is started: `program args... --platform <key> ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_CRAWLER_PROGRAM.to_string(),
            args: DEFAULT_CRAWLER_ARGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub project_root: PathBuf,
    pub registry: PlatformRegistry,
    pub default_platform: String,
    pub crawler: CrawlerConfig,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub max_log_lines: usize,
}

impl ResolvedConfig {
    /// One-line description of the effective settings, for the log.
    pub fn summary(&self) -> String {
        format!(
            "root {}, {} platforms ({}), default {}, crawler `{} {}`, log level {}",
            self.project_root.display(),
            self.registry.len(),
            self.registry.keys().join(", "),
            self.default_platform,
            self.crawler.program,
            self.crawler.args.join(" "),
            self.log_level
        )
    }
}

/// Values from CLI flags (None = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub project_root: Option<PathBuf>,
    pub platform: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns `~/.creator-desk/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".creator-desk"))
}

/// Returns the path to `~/.creator-desk/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `path`, or from `~/.creator-desk/config.toml` when `None`.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `DeskConfig::default()`. An explicit path that doesn't exist is
/// an I/O error. A malformed file returns `ConfigError::Parse`.
pub fn load_config(path: Option<&Path>) -> Result<DeskConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => {
                if !p.exists() {
                    info!("No config file found, generating default at {}", p.display());
                    generate_default_config(&p);
                    return Ok(DeskConfig::default());
                }
                p
            }
            None => {
                warn!("Could not determine home directory, using default config");
                return Ok(DeskConfig::default());
            }
        },
    };

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<DeskConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# creator-desk configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# project_root = "/path/to/crawler"   # Or set CREATOR_DESK_ROOT, or pass --root
# default_platform = "xhs"            # Or set CREATOR_DESK_PLATFORM
# log_level = "debug"                 # Or set CREATOR_DESK_LOG
# log_file = "/tmp/creator-desk.log"  # Default: ~/.creator-desk/creator-desk.log
# max_log_lines = 2000                # Run output lines kept on screen

# [crawler]
# program = "uv"
# args = ["run", "main.py"]

# Replaces the built-in platform table when present.
# [[platforms]]
# key = "xhs"
# name = "Xiaohongshu"
# file = "config/xhs_config.py"       # Relative to project_root
# attribute = "XHS_CREATOR_ID_LIST"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &DeskConfig, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    resolve_with(config, cli, |name| std::env::var(name).ok())
}

/// `resolve` with an injectable environment lookup.
pub fn resolve_with(
    config: &DeskConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig, ConfigError> {
    let registry = if config.platforms.is_empty() {
        PlatformRegistry::builtin()
    } else {
        validate_platforms(&config.platforms)?
    };

    // Project root: CLI → env → config → cwd
    let project_root = cli
        .project_root
        .clone()
        .or_else(|| env("CREATOR_DESK_ROOT").map(PathBuf::from))
        .or_else(|| config.general.project_root.clone())
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    // Platform: CLI → env → config → first in table
    let default_platform = cli
        .platform
        .clone()
        .or_else(|| env("CREATOR_DESK_PLATFORM"))
        .or_else(|| config.general.default_platform.clone());
    let default_platform = match default_platform {
        Some(key) if registry.get(&key).is_some() => key,
        Some(key) => {
            return Err(ConfigError::Invalid(format!(
                "unknown platform '{key}' (expected one of: {})",
                registry.keys().join(", ")
            )));
        }
        None => registry
            .by_index(0)
            .map(|b| b.key.clone())
            .unwrap_or_default(),
    };

    let log_level = env("CREATOR_DESK_LOG")
        .or_else(|| config.general.log_level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    let defaults = CrawlerConfig::default();
    let crawler = CrawlerConfig {
        program: config.crawler.program.clone().unwrap_or(defaults.program),
        args: config.crawler.args.clone().unwrap_or(defaults.args),
    };

    Ok(ResolvedConfig {
        project_root,
        registry,
        default_platform,
        crawler,
        log_level,
        log_file: config.general.log_file.clone(),
        max_log_lines: config
            .general
            .max_log_lines
            .unwrap_or(DEFAULT_MAX_LOG_LINES)
            .max(1),
    })
}

/// Turn `[[platforms]]` entries into a registry: non-empty, unique keys,
/// identifier-shaped attribute names.
pub fn validate_platforms(entries: &[PlatformEntry]) -> Result<PlatformRegistry, ConfigError> {
    let mut seen = HashSet::new();
    let mut bindings = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.key.trim().is_empty() {
            return Err(ConfigError::Invalid("platform key must not be empty".into()));
        }
        if !seen.insert(entry.key.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate platform key '{}'",
                entry.key
            )));
        }
        if !is_identifier(&entry.attribute) {
            return Err(ConfigError::Invalid(format!(
                "attribute '{}' for platform '{}' is not an identifier",
                entry.attribute, entry.key
            )));
        }
        bindings.push(PlatformBinding::new(
            &entry.key,
            &entry.name,
            &entry.file,
            &entry.attribute,
        ));
    }

    Ok(PlatformRegistry::new(bindings))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Where the log file goes when the config doesn't say.
pub fn default_log_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("creator-desk.log"))
}

/// The built-in platform table as `[[platforms]]` entries.
pub fn builtin_entries() -> Vec<PlatformEntry> {
    builtin_bindings()
        .into_iter()
        .map(|b| PlatformEntry {
            key: b.key,
            name: b.display_name,
            file: b.file_path.to_string_lossy().into_owned(),
            attribute: b.attribute_name,
        })
        .collect()
}
