//! Live mapped-region provenance
//!
//! One table shared across every traced pid: the pid field of a trace line
//! labels a thread of control, and threads share an address space, so a
//! region mapped under one label may legitimately be moved or released
//! under another.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Live mapped regions keyed by base address, each carrying the log lines
/// that created and subsequently moved it.
///
/// Whatever survives to the end of a run was never observed to be
/// released.
#[derive(Debug, Default)]
pub struct LiveMappings {
    regions: BTreeMap<i64, Vec<String>>,
}

impl LiveMappings {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh mapping at `addr`.
    pub fn record(&mut self, addr: i64, line: &str) {
        self.regions.entry(addr).or_default().push(line.to_string());
    }

    /// Remove and return the history for `addr`, if tracked.
    pub fn remove(&mut self, addr: i64) -> Option<Vec<String>> {
        self.regions.remove(&addr)
    }

    /// Re-key a moved mapping to `addr`, carrying its history forward.
    pub fn transfer(&mut self, addr: i64, mut history: Vec<String>, line: &str) {
        history.push(line.to_string());
        match self.regions.entry(addr) {
            Entry::Occupied(mut entry) => entry.get_mut().append(&mut history),
            Entry::Vacant(entry) => {
                entry.insert(history);
            }
        }
    }

    /// Whether `addr` is currently tracked.
    pub fn contains(&self, addr: i64) -> bool {
        self.regions.contains_key(&addr)
    }

    /// Number of surviving regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when every mapping was balanced by a release.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Surviving regions in address order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &[String])> + '_ {
        self.regions
            .iter()
            .map(|(addr, history)| (*addr, history.as_slice()))
    }
}
