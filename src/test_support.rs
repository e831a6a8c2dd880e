//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::{CrawlerConfig, DEFAULT_MAX_LOG_LINES, ResolvedConfig};
use crate::core::platform::{PlatformBinding, PlatformRegistry};
use crate::core::state::App;

const TEST_CONFIG_FILE: &str = "config/test_config.py";

/// A binding for `attribute` backed by `config/test_config.py`.
pub fn binding_in(attribute: &str) -> PlatformBinding {
    PlatformBinding::new("test", "Test", TEST_CONFIG_FILE, attribute)
}

/// Write the file behind `binding_in` under `root`.
pub fn write_config(root: &Path, content: &str) -> PathBuf {
    write_file(&root.join(TEST_CONFIG_FILE), content)
}

/// Write `config/<key>.py` under `root` (the files behind `test_registry`).
pub fn write_platform_file(root: &Path, key: &str, content: &str) -> PathBuf {
    write_file(&root.join("config").join(format!("{key}.py")), content)
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}

/// Two platforms: `foo` (FOO_LIST) and `bar` (BAR_LIST).
pub fn test_registry() -> PlatformRegistry {
    PlatformRegistry::new(vec![
        PlatformBinding::new("foo", "Foo", "config/foo.py", "FOO_LIST"),
        PlatformBinding::new("bar", "Bar", "config/bar.py", "BAR_LIST"),
    ])
}

pub fn test_config(root: &Path) -> ResolvedConfig {
    ResolvedConfig {
        project_root: root.to_path_buf(),
        registry: test_registry(),
        default_platform: "foo".to_string(),
        crawler: CrawlerConfig::default(),
        log_level: "debug".to_string(),
        log_file: None,
        max_log_lines: DEFAULT_MAX_LOG_LINES,
    }
}

/// Creates a test App rooted at `root`, starting on `foo`.
pub fn test_app(root: &Path) -> App {
    App::new(&test_config(root))
}
