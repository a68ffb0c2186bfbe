//! Extent store: the file-record arena plus a global extent index.
//!
//! Records live in a `Vec` and are addressed by their position (the record
//! id). The extent index is a flat array of `(end, owner, start)` entries plus
//! a parallel array of start blocks. Commits append; [`ExtentStore::freeze`]
//! sorts both once the scan is done, after which every count is two binary
//! searches and a rescan simply drops the arrays together.

mod query;
mod top_k;

use crate::error::LookupError;
use crate::models::file_record::{FileRecord, FragmentationSummary};
use std::collections::HashMap;

/// One extent in the global index. Ordered by `end`, then `owner`, then `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtentEntry {
    pub end:   u64,
    pub owner: usize,
    pub start: u64,
}

#[derive(Debug)]
pub struct ExtentStore {
    records:      Vec<FileRecord>,
    path_index:   HashMap<String, usize>,
    /// Sorted by entry order once frozen.
    extent_index: Vec<ExtentEntry>,
    /// Start block of every entry, ascending once frozen.
    starts:       Vec<u64>,
    frozen:       bool,
}

impl Default for ExtentStore {
    fn default() -> Self {
        Self {
            records:      Vec::new(),
            path_index:   HashMap::new(),
            extent_index: Vec::new(),
            starts:       Vec::new(),
            frozen:       true,
        }
    }
}

impl ExtentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every record and index entry.
    pub fn clear(&mut self) {
        self.records = Vec::new();
        self.path_index.clear();
        self.extent_index = Vec::new();
        self.starts = Vec::new();
        self.frozen = true;
    }

    /// Appends `record` and its extents. Returns the new record id, or `None`
    /// when the path is already indexed (the store is left untouched).
    pub fn commit(&mut self, record: FileRecord) -> Option<usize> {
        if self.path_index.contains_key(&record.path) {
            return None;
        }

        let id = self.records.len();
        for ext in &record.extents {
            self.extent_index.push(ExtentEntry { end: ext.end, owner: id, start: ext.start });
            self.starts.push(ext.start);
        }
        self.frozen = false;
        self.path_index.insert(record.path.clone(), id);
        self.records.push(record);
        Some(id)
    }

    /// Sorts the index after the last commit. Range queries need this.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        self.extent_index.sort_unstable();
        self.starts.sort_unstable();
        self.frozen = true;
    }

    pub fn lookup_by_path(&self, path: &str) -> Result<FileRecord, LookupError> {
        self.path_index
            .get(path)
            .map(|&id| self.records[id].clone())
            .ok_or_else(|| LookupError::NotFound(path.to_string()))
    }

    pub fn lookup_by_id(&self, id: usize) -> Result<FileRecord, LookupError> {
        self.records
            .get(id)
            .cloned()
            .ok_or(LookupError::OutOfRange { id, len: self.records.len() })
    }

    #[cfg(test)]
    pub fn records(&self) -> &[FileRecord] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn total_extents(&self) -> usize { self.extent_index.len() }

    /// One past the highest indexed block, or 0 for an empty store.
    pub fn block_limit(&self) -> u64 {
        self.extent_index.iter().map(|e| e.end).max().unwrap_or(0)
    }

    pub fn summary(&self) -> FragmentationSummary {
        let files   = self.len();
        let extents = self.total_extents();
        FragmentationSummary {
            files,
            extents,
            fragmented_files: self.records.iter().filter(|r| r.is_fragmented()).count(),
            total_bytes:      self.records.iter().map(|r| r.size).sum(),
            avg_extents:      if self.is_empty() { 0.0 } else { extents as f64 / files as f64 },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::extent::Extent;

    pub(crate) fn record(path: &str, size: u64, extents: &[(u64, u64)]) -> FileRecord {
        let extents = extents.iter().map(|&(s, e)| Extent::new(s, e)).collect();
        FileRecord::new(path.to_string(), size, extents).unwrap()
    }

    pub(crate) fn store_of(records: Vec<FileRecord>) -> ExtentStore {
        let mut store = ExtentStore::new();
        for r in records {
            store.commit(r);
        }
        store.freeze();
        store
    }

    #[test]
    fn commit_assigns_sequential_ids() {
        let mut store = ExtentStore::new();
        assert_eq!(store.commit(record("/a", 10, &[(0, 1)])), Some(0));
        assert_eq!(store.commit(record("/b", 10, &[(4, 6), (9, 10)])), Some(1));
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_extents(), 3);
        assert_eq!(store.block_limit(), 10);
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut store = ExtentStore::new();
        store.commit(record("/a", 10, &[(0, 1)]));
        assert_eq!(store.commit(record("/a", 10, &[(7, 8)])), None);
        store.freeze();
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_extents(), 1);
        assert_eq!(store.count_overlapping(7, 8), 0);
    }

    #[test]
    fn freeze_sorts_out_of_order_commits() {
        let mut store = ExtentStore::new();
        store.commit(record("/late", 1, &[(900, 950)]));
        store.commit(record("/early", 1, &[(10, 20), (500, 510)]));
        store.freeze();
        assert_eq!(store.count_overlapping(0, 1000), 3);
        assert_eq!(store.count_overlapping(15, 505), 2);
        assert_eq!(store.block_limit(), 950);
    }

    #[test]
    fn lookups() {
        let store = store_of(vec![record("/a", 10, &[(0, 1)]), record("/b", 20, &[(3, 4)])]);
        assert_eq!(store.lookup_by_path("/b").unwrap().size, 20);
        assert_eq!(store.lookup_by_id(0).unwrap().path, "/a");
        assert_eq!(
            store.lookup_by_path("/nonexistent"),
            Err(LookupError::NotFound("/nonexistent".into()))
        );
        assert_eq!(store.lookup_by_id(2), Err(LookupError::OutOfRange { id: 2, len: 2 }));
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = store_of(vec![record("/a", 10, &[(0, 100)])]);
        let snapshot = store.lookup_by_path("/a").unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.total_extents(), 0);
        assert_eq!(store.count_overlapping(0, u64::MAX), 0);
        assert!(store.lookup_by_path("/a").is_err());
        // The snapshot is an owned copy and outlives the clear.
        assert_eq!(snapshot.extents, vec![Extent::new(0, 100)]);
    }

    #[test]
    fn summary_counts_fragmented_files() {
        let store = store_of(vec![
            record("/a", 100, &[(0, 1)]),
            record("/b", 300, &[(2, 3), (5, 6), (8, 9)]),
        ]);
        let s = store.summary();
        assert_eq!(s.files, 2);
        assert_eq!(s.extents, 4);
        assert_eq!(s.fragmented_files, 1);
        assert_eq!(s.total_bytes, 400);
        assert_eq!(s.avg_extents, 2.0);
    }
}
