//! # List Store
//!
//! Owns the creator list for one platform binding and keeps it in sync with
//! the backing file. Every mutation that changes membership is written
//! through immediately; there is no dirty state.
//!
//! ```text
//! open()  ──▶ read file ──▶ Anchor::find ──▶ IdentifierList
//! add()/remove_at() ──▶ mutate list ──▶ save() ──▶ Anchor::replace ──▶ write file
//! ```
//!
//! A missing file or a missing literal loads as an empty list. Saving into
//! either fails with a `StoreError` for the caller to surface; the literal is
//! never created. Writes go through a temp file in the same directory and
//! `rename()`, landing on the symlink target when the path is a link.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::core::anchor::{Anchor, unstorable_reason};
use crate::core::identifiers::IdentifierList;
use crate::core::platform::PlatformBinding;

#[derive(Debug)]
pub enum StoreError {
    /// The backing file does not exist.
    FileMissing(PathBuf),
    /// The file exists but holds no `NAME = [...]` literal.
    AnchorMissing { attribute: String, path: PathBuf },
    /// `NAME = [` is present but never closed.
    Unterminated { attribute: String, path: PathBuf },
    /// The attribute name could not be compiled into a matcher.
    BadAttribute(String),
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::FileMissing(path) => write!(f, "{} does not exist", path.display()),
            StoreError::AnchorMissing { attribute, path } => {
                write!(f, "{attribute} not found in {}", path.display())
            }
            StoreError::Unterminated { attribute, path } => {
                write!(f, "{attribute} in {} has no closing ]", path.display())
            }
            StoreError::BadAttribute(name) => write!(f, "unusable attribute name: {name}"),
            StoreError::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Outcome of a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Added(String),
    Removed { index: usize, value: String },
    /// The value cannot be written into the literal; nothing changed.
    Rejected { value: String, reason: &'static str },
    /// Duplicate, blank, or out-of-range: nothing changed and nothing was written.
    Unchanged,
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_existing(path: &Path) -> Result<String, StoreError> {
    if !path.exists() {
        return Err(StoreError::FileMissing(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|e| io_error(path, e))
}

/// Read the list literal for `anchor` out of `path`.
pub fn load_entries(path: &Path, anchor: &Anchor) -> Result<IdentifierList, StoreError> {
    let content = read_existing(path)?;
    match anchor.find(&content) {
        Some(literal) => Ok(IdentifierList::from_entries(literal.entries())),
        None if anchor.is_unterminated(&content) => Err(StoreError::Unterminated {
            attribute: anchor.attribute().to_string(),
            path: path.to_path_buf(),
        }),
        None => Err(StoreError::AnchorMissing {
            attribute: anchor.attribute().to_string(),
            path: path.to_path_buf(),
        }),
    }
}

/// Rewrite the list literal for `anchor` in `path`, leaving everything else as is.
pub fn save_entries(path: &Path, anchor: &Anchor, list: &IdentifierList) -> Result<(), StoreError> {
    let content = read_existing(path)?;
    let updated =
        anchor
            .replace(&content, list.as_slice())
            .ok_or_else(|| StoreError::AnchorMissing {
                attribute: anchor.attribute().to_string(),
                path: path.to_path_buf(),
            })?;

    if updated == content {
        debug!("{} already up to date", path.display());
        return Ok(());
    }

    atomic_write(path, &updated).map_err(|e| io_error(path, e))?;
    info!(
        "Saved {} entries for {} to {}",
        list.len(),
        anchor.attribute(),
        path.display()
    );
    Ok(())
}

/// Write via a fresh temp file beside the real file, then rename over it.
///
/// Symlinks are followed so the link itself survives; original permissions
/// are kept.
fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    if let Ok(meta) = fs::metadata(&target) {
        let _ = fs::set_permissions(tmp.path(), meta.permissions());
    }
    tmp.persist(&target).map_err(|e| e.error)?;
    Ok(())
}

/// The creator list for one platform, bound to its file.
#[derive(Debug)]
pub struct ListStore {
    binding: PlatformBinding,
    path: PathBuf,
    anchor: Option<Anchor>,
    ids: IdentifierList,
    load_issue: Option<StoreError>,
}

impl ListStore {
    /// Load the list for `binding`. Never fails: problems leave the list
    /// empty and are kept in `load_issue()`.
    pub fn open(binding: &PlatformBinding, project_root: &Path) -> Self {
        let path = binding.resolve_path(project_root);
        let anchor = match Anchor::new(&binding.attribute_name) {
            Ok(anchor) => Some(anchor),
            Err(e) => {
                warn!("Cannot build matcher for {}: {}", binding.attribute_name, e);
                None
            }
        };
        let mut store = Self {
            binding: binding.clone(),
            path,
            anchor,
            ids: IdentifierList::new(),
            load_issue: None,
        };
        store.reload();
        store
    }

    /// Re-read the backing file, discarding the in-memory list.
    pub fn reload(&mut self) {
        let result = match &self.anchor {
            Some(anchor) => load_entries(&self.path, anchor),
            None => Err(StoreError::BadAttribute(self.binding.attribute_name.clone())),
        };

        match result {
            Ok(ids) => {
                debug!(
                    "Loaded {} entries for {} from {}",
                    ids.len(),
                    self.binding.key,
                    self.path.display()
                );
                self.ids = ids;
                self.load_issue = None;
            }
            Err(e) => {
                match &e {
                    StoreError::Unterminated { .. } | StoreError::Io { .. } => {
                        warn!("Loading {} as empty: {}", self.binding.key, e)
                    }
                    _ => info!("Loading {} as empty: {}", self.binding.key, e),
                }
                self.ids = IdentifierList::new();
                self.load_issue = Some(e);
            }
        }
    }

    /// Persist the current list.
    pub fn save(&self) -> Result<(), StoreError> {
        let anchor = self
            .anchor
            .as_ref()
            .ok_or_else(|| StoreError::BadAttribute(self.binding.attribute_name.clone()))?;
        save_entries(&self.path, anchor, &self.ids).inspect_err(|e| {
            warn!("Save failed for {}: {}", self.binding.key, e);
        })
    }

    /// Append `value` unless blank, already present, or unstorable, then persist.
    ///
    /// On a failed write the entry stays in memory and the error is returned.
    pub fn add(&mut self, value: &str) -> Result<Edit, StoreError> {
        if let Some(reason) = unstorable_reason(value.trim()) {
            warn!("Rejecting {:?} for {}: {}", value, self.binding.key, reason);
            return Ok(Edit::Rejected {
                value: value.trim().to_string(),
                reason,
            });
        }
        if !self.ids.insert(value) {
            debug!("Ignoring add of {:?} to {}", value, self.binding.key);
            return Ok(Edit::Unchanged);
        }
        let added = value.trim().to_string();
        self.save()?;
        Ok(Edit::Added(added))
    }

    /// Remove the entry at `index` (0-based) and persist; out-of-range is a no-op.
    pub fn remove_at(&mut self, index: usize) -> Result<Edit, StoreError> {
        let Some(value) = self.ids.remove_at(index) else {
            debug!(
                "Ignoring remove of index {} from {} ({} entries)",
                index,
                self.binding.key,
                self.ids.len()
            );
            return Ok(Edit::Unchanged);
        };
        self.save()?;
        Ok(Edit::Removed { index, value })
    }

    pub fn ids(&self) -> &IdentifierList {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn binding(&self) -> &PlatformBinding {
        &self.binding
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Why the last load came back empty, if it did not find a literal.
    pub fn load_issue(&self) -> Option<&StoreError> {
        self.load_issue.as_ref()
    }
}
