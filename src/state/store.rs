//! Append-only versioned field store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value returned by `latest` for a field that was never written
pub const EMPTY: &str = "";

/// Well-known field names shared by the loop participants
pub mod fields {
    /// The caller's initial request
    pub const PROMPT: &str = "PROMPT";
    /// Every complete draft the producer has written
    pub const CODE_DRAFT: &str = "CODE_DRAFT";
    /// Every piece of feedback the reviewer has handed back
    pub const CRITICAL_FEEDBACK: &str = "CRITICAL_FEEDBACK";
}

/// One version of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub value: String,
    /// Round that appended this version (0 = seeded before the loop)
    pub round: u32,
}

/// Mapping from field name to its ordered versions.
///
/// Sequences only grow. There is no remove or overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStore {
    fields: BTreeMap<String, Vec<Entry>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new version, creating the field if absent.
    ///
    /// Returns the 1-based version number of the new entry.
    pub fn append(&mut self, field: &str, value: impl Into<String>, round: u32) -> usize {
        let entries = self.fields.entry(field.to_string()).or_default();
        entries.push(Entry {
            value: value.into(),
            round,
        });
        log::debug!("[state] appended {} v{} (round {})", field, entries.len(), round);
        entries.len()
    }

    /// Latest value of `field`, or `EMPTY` if it was never written
    pub fn latest(&self, field: &str) -> &str {
        self.latest_entry(field).map(|e| e.value.as_str()).unwrap_or(EMPTY)
    }

    pub fn latest_entry(&self, field: &str) -> Option<&Entry> {
        self.fields.get(field).and_then(|entries| entries.last())
    }

    /// Latest values of two fields in a single read
    pub fn latest_pair(&self, a: &str, b: &str) -> (&str, &str) {
        (self.latest(a), self.latest(b))
    }

    /// Every version of `field`, oldest first
    pub fn history(&self, field: &str) -> &[Entry] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of versions written to `field`
    pub fn len(&self, field: &str) -> usize {
        self.history(field).len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Latest value of every field
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter_map(|(name, entries)| entries.last().map(|e| (name.clone(), e.value.clone())))
            .collect()
    }
}
