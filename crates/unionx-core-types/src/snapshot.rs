//! Snapshot keys
//!
//! A `Snapshot` is the ordered list of member names a namespace declared at the
//! moment it was observed. Two observations that produce equal snapshots may
//! share derived data; any difference means the derived data is stale.

use serde::{Deserialize, Serialize};

/// One declared member as seen at observation time
///
/// `revision` is the namespace-local declaration counter for this name, so a
/// member that was removed and declared again under the same name produces a
/// different entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub name: String,
    pub revision: u64,
}

/// Ordered view of a namespace's declared member names
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snapshot {
    entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Build a snapshot from entries already in declaration order
    pub fn new(entries: Vec<SnapshotEntry>) -> Self {
        Self { entries }
    }

    /// Entries in declaration order
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    /// Member names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<SnapshotEntry> for Snapshot {
    fn from_iter<I: IntoIterator<Item = SnapshotEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, revision: u64) -> SnapshotEntry {
        SnapshotEntry {
            name: name.to_string(),
            revision,
        }
    }

    #[test]
    fn test_names_preserve_declaration_order() {
        let snapshot: Snapshot = vec![entry("Pluto", 1), entry("Earth", 2), entry("Mars", 3)]
            .into_iter()
            .collect();

        let names: Vec<&str> = snapshot.names().collect();
        assert_eq!(names, vec!["Pluto", "Earth", "Mars"]);
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_order_is_significant() {
        let a = Snapshot::new(vec![entry("A", 1), entry("B", 2)]);
        let b = Snapshot::new(vec![entry("B", 2), entry("A", 1)]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_revision_is_significant() {
        let before = Snapshot::new(vec![entry("A", 1)]);
        let after = Snapshot::new(vec![entry("A", 4)]);
        assert_ne!(before, after);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.names().count(), 0);
    }

    #[test]
    fn test_serialization() {
        let snapshot = Snapshot::new(vec![entry("Warm", 7)]);
        let json = serde_json::to_string(&snapshot).unwrap();
        let deserialized: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, deserialized);
    }
}
