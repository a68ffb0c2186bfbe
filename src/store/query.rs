use super::{ExtentEntry, ExtentStore};
use crate::models::file_record::FileRecord;
use std::collections::HashSet;

impl ExtentStore {
    /// Number of extents intersecting `[start, end)`. Empty or inverted
    /// ranges count zero.
    ///
    /// Every extent that starts before `end` either intersects the range or
    /// ends at or before `start`, never both, so the count is the difference
    /// of two binary searches.
    pub fn count_overlapping(&self, start: u64, end: u64) -> usize {
        debug_assert!(self.frozen, "range query before freeze");
        if start >= end {
            return 0;
        }
        let begun = self.starts.partition_point(|&s| s < end);
        let ended = self.first_ending_after(start);
        begun.saturating_sub(ended)
    }

    /// Position of the first index entry with `end > block`.
    fn first_ending_after(&self, block: u64) -> usize {
        self.extent_index.partition_point(|e| e.end <= block)
    }

    /// Index entries intersecting `[start, end)`, in index order. The walk
    /// stops as soon as the counted number of entries has been seen.
    fn overlapping(&self, start: u64, end: u64) -> impl Iterator<Item = &ExtentEntry> + '_ {
        let wanted = self.count_overlapping(start, end);
        let from = if wanted == 0 { self.extent_index.len() } else { self.first_ending_after(start) };
        self.extent_index[from..]
            .iter()
            .filter(move |e| e.start < end)
            .take(wanted)
    }

    /// Owning record of every extent intersecting `[start, end)`, once per
    /// extent (a file with two extents in range appears twice).
    pub fn list_overlapping(&self, start: u64, end: u64) -> Vec<FileRecord> {
        self.overlapping(start, end)
            .map(|e| self.records[e.owner].clone())
            .collect()
    }

    /// Like [`list_overlapping`](Self::list_overlapping), but each file once,
    /// in order of first appearance.
    pub fn distinct_overlapping(&self, start: u64, end: u64) -> Vec<FileRecord> {
        let mut seen = HashSet::new();
        self.overlapping(start, end)
            .filter(|e| seen.insert(e.owner))
            .map(|e| self.records[e.owner].clone())
            .collect()
    }
}
