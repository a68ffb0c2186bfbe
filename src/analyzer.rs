use crate::collectors::fiemap::{ExtentSource, Fiemap};
use crate::collectors::filesystem;
use crate::collectors::walk::{self, WalkOptions};
use crate::error::LookupError;
use crate::models::extent::BlockSize;
use crate::models::file_record::{FileRecord, FragmentationSummary, ScanStats};
use crate::store::ExtentStore;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Scan entry point and query surface over one extent store.
///
/// Every `scan` rebuilds the store from nothing. Queries take `&self`, so a
/// scan (which needs `&mut self`) can never interleave with one.
pub struct Analyzer {
    source:     Box<dyn ExtentSource>,
    block_size: BlockSize,
    walk:       WalkOptions,
    store:      ExtentStore,
    root:       Option<PathBuf>,
    last_scan:  ScanStats,
}

impl Analyzer {
    pub fn new(block_size: BlockSize, sync: bool, walk: WalkOptions) -> Self {
        Self::with_source(Box::new(Fiemap::new(block_size, sync)), block_size, walk)
    }

    pub fn with_source(source: Box<dyn ExtentSource>, block_size: BlockSize, walk: WalkOptions) -> Self {
        Self {
            source,
            block_size,
            walk,
            store:     ExtentStore::new(),
            root:      None,
            last_scan: ScanStats::default(),
        }
    }

    // ── Scan ──────────────────────────────────────────────────────────

    pub fn scan(&mut self, root: &Path) -> &ScanStats {
        self.last_scan = walk::scan_tree(root, self.source.as_ref(), self.walk, &mut self.store);
        self.root = Some(root.to_path_buf());
        &self.last_scan
    }

    /// Re-runs the last scan; a no-op before the first one.
    pub fn rescan(&mut self) -> Option<&ScanStats> {
        let root = self.root.clone()?;
        Some(self.scan(&root))
    }

    pub fn root(&self) -> Option<&Path> { self.root.as_deref() }
    pub fn last_scan(&self) -> &ScanStats { &self.last_scan }
    pub fn block_size(&self) -> BlockSize { self.block_size }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn count_overlapping(&self, start: u64, end: u64) -> usize {
        self.store.count_overlapping(start, end)
    }

    pub fn list_overlapping(&self, start: u64, end: u64) -> Vec<FileRecord> {
        self.store.list_overlapping(start, end)
    }

    pub fn distinct_overlapping(&self, start: u64, end: u64) -> Vec<FileRecord> {
        self.store.distinct_overlapping(start, end)
    }

    pub fn top_by_extent_count(&self, k: usize) -> Vec<FileRecord> {
        self.store.top_by_extent_count(k)
    }

    pub fn top_by_size(&self, k: usize) -> Vec<FileRecord> {
        self.store.top_by_size(k)
    }

    pub fn lookup_by_path(&self, path: &str) -> Result<FileRecord, LookupError> {
        self.store.lookup_by_path(path)
    }

    pub fn lookup_by_id(&self, id: usize) -> Result<FileRecord, LookupError> {
        self.store.lookup_by_id(id)
    }

    pub fn file_count(&self) -> usize { self.store.len() }
    pub fn total_extents(&self) -> usize { self.store.total_extents() }
    pub fn summary(&self) -> FragmentationSummary { self.store.summary() }

    /// Blocks the map should cover: the device capacity in this analyzer's
    /// block unit, or the highest indexed block when statvfs fails.
    pub fn device_blocks(&self) -> Result<u64> {
        let root = self
            .root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("no scan has run yet"))?;
        filesystem::device_blocks(root, self.block_size)
    }

    pub fn map_extent(&self) -> u64 {
        match self.device_blocks() {
            Ok(n) if n > 0 => n.max(self.store.block_limit()),
            _              => self.store.block_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::walk::tests::three_file_tree;

    fn analyzer() -> (tempfile::TempDir, Analyzer) {
        let (dir, source) = three_file_tree();
        let mut an = Analyzer::with_source(Box::new(source), BlockSize::DEFAULT, WalkOptions::default());
        an.scan(dir.path());
        (dir, an)
    }

    #[test]
    fn queries_after_scan() {
        let (_dir, an) = analyzer();
        assert_eq!(an.file_count(), 2);
        assert_eq!(an.count_overlapping(0, u64::MAX), an.total_extents());
        assert_eq!(an.count_overlapping(15, 55), 2);
        assert!(an.distinct_overlapping(40, 45).is_empty());
        assert_eq!(an.top_by_size(1)[0].size, 1000);
        assert!(matches!(an.lookup_by_path("/nonexistent"), Err(LookupError::NotFound(_))));
        assert!(matches!(an.lookup_by_id(7), Err(LookupError::OutOfRange { id: 7, len: 2 })));
    }

    #[test]
    fn selected_snapshot_survives_rescan() {
        let (dir, mut an) = analyzer();
        let selected = an.lookup_by_id(0).unwrap();
        std::fs::remove_file(dir.path().join("a")).unwrap();
        an.rescan();
        assert_eq!(an.file_count(), 1);
        assert!(an.lookup_by_path(&selected.path).is_err());
        assert_eq!(selected.extent_count, 1);
    }

    #[test]
    fn map_covers_every_indexed_block() {
        let (_dir, an) = analyzer();
        assert!(an.map_extent() >= 61);
    }

    #[test]
    fn device_blocks_needs_a_scan() {
        let an = Analyzer::new(BlockSize::DEFAULT, false, WalkOptions::default());
        assert!(an.device_blocks().is_err());
        assert_eq!(an.map_extent(), 0);
    }
}
