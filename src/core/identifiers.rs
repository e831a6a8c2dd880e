//! Ordered, duplicate-free list of creator identifiers.
//!
//! Entries are bare IDs or full URLs; this type does not care which.
//! It only guarantees: no duplicates, no blank entries, insertion order kept.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentifierList {
    entries: Vec<String>,
}

impl IdentifierList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw entries (e.g. freshly extracted from a file), dropping
    /// blanks and later duplicates.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::new();
        for entry in entries {
            list.insert(entry.as_ref());
        }
        list
    }

    /// Append `value` (trimmed). Returns false when blank or already present.
    pub fn insert(&mut self, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() || self.contains(value) {
            return false;
        }
        self.entries.push(value.to_string());
        true
    }

    /// Remove the entry at `index`; out-of-range is a no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|e| e == value)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
