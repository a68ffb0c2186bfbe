use crate::models::extent::Extent;
use serde::Serialize;
use std::time::Duration;

/// One mapped regular file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path:         String,
    pub size:         u64,
    pub extent_count: usize,
    /// Coalesced, ascending, never empty once stored.
    pub extents:      Vec<Extent>,
}

impl FileRecord {
    /// `None` when there is nothing to index.
    pub fn new(path: String, size: u64, extents: Vec<Extent>) -> Option<Self> {
        if extents.is_empty() {
            return None;
        }
        Some(Self { path, size, extent_count: extents.len(), extents })
    }

    pub fn is_fragmented(&self) -> bool { self.extent_count > 1 }

    /// Whether any extent intersects `[start, end)`. Extents are sorted and
    /// disjoint, so only the first one ending after `start` can qualify.
    pub fn touches(&self, start: u64, end: u64) -> bool {
        let i = self.extents.partition_point(|e| e.end <= start);
        self.extents.get(i).is_some_and(|e| e.overlaps(start, end))
    }

    /// Blocks actually allocated (sum of extent lengths).
    pub fn allocated_blocks(&self) -> u64 {
        self.extents.iter().map(Extent::len).sum()
    }
}

/// Counters from one directory scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanStats {
    pub files_seen:   usize,
    pub files_mapped: usize,
    /// Regular files FIEMAP could not map (or mapped to nothing).
    pub files_skipped: usize,
    pub dirs_seen:    usize,
    pub dirs_skipped: usize,
    pub extents:      usize,
    #[serde(serialize_with = "ser_millis")]
    pub elapsed:      Duration,
}

fn ser_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Store-wide fragmentation figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FragmentationSummary {
    pub files:            usize,
    pub extents:          usize,
    pub fragmented_files: usize,
    pub total_bytes:      u64,
    pub avg_extents:      f64,
}

impl FragmentationSummary {
    pub fn fragmented_pct(&self) -> f64 {
        if self.files == 0 { return 0.0; }
        self.fragmented_files as f64 / self.files as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_extent_list_yields_no_record() {
        assert!(FileRecord::new("/a".into(), 0, Vec::new()).is_none());
    }

    #[test]
    fn extent_count_tracks_extents() {
        let rec = FileRecord::new(
            "/a".into(),
            9000,
            vec![Extent::new(1, 2), Extent::new(5, 7)],
        ).unwrap();
        assert_eq!(rec.extent_count, 2);
        assert!(rec.is_fragmented());
        assert_eq!(rec.allocated_blocks(), 3);
        assert!(rec.touches(6, 100));
        assert!(!rec.touches(2, 5));
    }

    #[test]
    fn fragmented_pct_handles_empty() {
        assert_eq!(FragmentationSummary::default().fragmented_pct(), 0.0);
        let s = FragmentationSummary { files: 4, fragmented_files: 1, ..Default::default() };
        assert_eq!(s.fragmented_pct(), 25.0);
    }
}
