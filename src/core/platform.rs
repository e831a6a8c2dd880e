//! # Platform Registry
//!
//! Static table mapping a platform code to the config file and attribute
//! that hold its creator list. Built once at startup from the resolved
//! config and handed to whoever needs it; nothing reads it as a global.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// One supported platform and the list literal it edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformBinding {
    /// Short code passed to the crawler as `--platform` (e.g. "xhs").
    pub key: String,
    pub display_name: String,
    /// Backing file, relative paths resolve against the project root.
    pub file_path: PathBuf,
    /// Identifier that introduces the list literal, e.g. `XHS_CREATOR_ID_LIST`.
    pub attribute_name: String,
}

impl PlatformBinding {
    pub fn new(key: &str, display_name: &str, file_path: &str, attribute_name: &str) -> Self {
        Self {
            key: key.to_string(),
            display_name: display_name.to_string(),
            file_path: PathBuf::from(file_path),
            attribute_name: attribute_name.to_string(),
        }
    }

    /// Absolute location of the backing file under `project_root`.
    pub fn resolve_path(&self, project_root: &Path) -> PathBuf {
        if self.file_path.is_absolute() {
            self.file_path.clone()
        } else {
            project_root.join(&self.file_path)
        }
    }
}

/// Immutable, ordered set of bindings. Order is the tab order in the TUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRegistry {
    bindings: Vec<PlatformBinding>,
}

impl PlatformRegistry {
    /// Build a registry. Callers are expected to have validated key
    /// uniqueness (see `config::validate_platforms`).
    pub fn new(bindings: Vec<PlatformBinding>) -> Self {
        Self { bindings }
    }

    /// The seven platforms the crawler ships configs for.
    pub fn builtin() -> Self {
        Self::new(builtin_bindings())
    }

    pub fn get(&self, key: &str) -> Option<&PlatformBinding> {
        self.bindings.iter().find(|b| b.key == key)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.bindings.iter().position(|b| b.key == key)
    }

    pub fn by_index(&self, index: usize) -> Option<&PlatformBinding> {
        self.bindings.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.key.as_str()).collect()
    }
}

pub fn builtin_bindings() -> Vec<PlatformBinding> {
    vec![
        PlatformBinding::new("xhs", "Xiaohongshu", "config/xhs_config.py", "XHS_CREATOR_ID_LIST"),
        PlatformBinding::new("dy", "Douyin", "config/dy_config.py", "DY_CREATOR_ID_LIST"),
        PlatformBinding::new("ks", "Kuaishou", "config/ks_config.py", "KS_CREATOR_ID_LIST"),
        PlatformBinding::new(
            "bili",
            "Bilibili",
            "config/bilibili_config.py",
            "BILIBILI_CREATOR_ID_LIST",
        ),
        PlatformBinding::new("wb", "Weibo", "config/weibo_config.py", "WEIBO_CREATOR_ID_LIST"),
        PlatformBinding::new("tieba", "Tieba", "config/tieba_config.py", "TIEBA_CREATOR_ID_LIST"),
        PlatformBinding::new("zhihu", "Zhihu", "config/zhihu_config.py", "ZHIHU_CREATOR_ID_LIST"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_has_seven_unique_keys() {
        let registry = PlatformRegistry::builtin();
        assert_eq!(registry.len(), 7);
        let mut keys = registry.keys();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn test_lookup_by_key_and_index() {
        let registry = PlatformRegistry::builtin();
        let bili = registry.get("bili").unwrap();
        assert_eq!(bili.attribute_name, "BILIBILI_CREATOR_ID_LIST");
        assert_eq!(registry.index_of("bili"), Some(3));
        assert_eq!(registry.by_index(0).map(|b| b.key.as_str()), Some("xhs"));
        assert!(registry.get("nope").is_none());
    }

    #[test]
    fn test_resolve_path_relative_and_absolute() {
        let rel = PlatformBinding::new("x", "X", "config/x.py", "X_LIST");
        assert_eq!(
            rel.resolve_path(Path::new("/srv/crawler")),
            PathBuf::from("/srv/crawler/config/x.py")
        );

        let abs = PlatformBinding::new("y", "Y", "/etc/y.py", "Y_LIST");
        assert_eq!(abs.resolve_path(Path::new("/srv/crawler")), PathBuf::from("/etc/y.py"));
    }
}
