//! Target host normalization and reconciliation.
//!
//! Pure functions only. A host is identified by its normalized address:
//! trimmed and lowercased. Host lists are split on commas and whitespace,
//! deduplicated, and kept sorted so that input order never influences which
//! hosts are treated as changed.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A single normalized appliance address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HostEntry {
    address: String,
}

impl HostEntry {
    /// Normalize one token. Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let address = raw.trim().to_lowercase();
        if address.is_empty() {
            None
        } else {
            Some(Self { address })
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Stable store identifier for this host's API key.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        certpush_common::host_fingerprint(&self.address)
    }
}

impl fmt::Display for HostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Sorted, deduplicated set of hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet(BTreeSet<HostEntry>);

impl HostSet {
    /// Parse a free-form host list: comma or whitespace separated, any case.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(HostEntry::parse)
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, host: &HostEntry) -> bool {
        self.0.contains(host)
    }

    /// Hosts in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &HostEntry> {
        self.0.iter()
    }

    /// Hosts in `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &HostSet) -> HostSet {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Canonical persisted form: comma-joined, sorted.
    #[must_use]
    pub fn to_persisted(&self) -> String {
        self.0
            .iter()
            .map(HostEntry::address)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<HostEntry> for HostSet {
    fn from_iter<I: IntoIterator<Item = HostEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a HostSet {
    type Item = &'a HostEntry;
    type IntoIter = std::collections::btree_set::Iter<'a, HostEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Normalize a free-form host list into its canonical persisted form.
#[must_use]
pub fn normalize(input: &str) -> String {
    HostSet::parse(input).to_persisted()
}

/// Outcome of comparing the declared host set with the remembered one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Hosts to deploy to this run.
    pub effective: HostSet,
    /// Remembered hosts that are no longer declared.
    pub orphans: HostSet,
    /// Whether the effective set must be persisted.
    pub changed: bool,
}

/// Diff the remembered host set against the declared one.
///
/// An empty declared set means "nothing declared this run" and keeps the
/// remembered set unchanged.
#[must_use]
pub fn reconcile(remembered: &HostSet, declared: &HostSet) -> Reconciliation {
    if declared.is_empty() || declared == remembered {
        return Reconciliation {
            effective: remembered.clone(),
            orphans: HostSet::default(),
            changed: false,
        };
    }
    Reconciliation {
        effective: declared.clone(),
        orphans: remembered.difference(declared),
        changed: true,
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
