//! Physical extent maps via the Linux `FS_IOC_FIEMAP` ioctl.

use crate::models::extent::{coalesce, BlockSize, Extent};
use blkmap::{ExtentFlags, Fiemap as _, FiemapExtent};
use std::fs::File;
use std::io;
use std::path::Path;

/// Size and coalesced physical extents of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMap {
    pub size:    u64,
    pub extents: Vec<Extent>,
}

/// Anything that can produce a physical extent map for a path.
pub trait ExtentSource {
    /// Errors and empty maps both mean "nothing to index" to the scanner;
    /// the error is only kept for diagnostics.
    fn map_file(&self, path: &Path) -> io::Result<FileMap>;
}

// fe_physical is not a device address for these.
const NO_PHYSICAL: ExtentFlags = ExtentFlags::UNKNOWN
    .union(ExtentFlags::DELALLOC)
    .union(ExtentFlags::DATA_INLINE);

/// Turns raw FIEMAP records (in the order the kernel returned them, possibly
/// over several batches) into block ranges.
///
/// Records with no physical address (unknown, delalloc, inline) are
/// dropped. Nothing after the first `LAST` record is used. A record that
/// does not start past the logical end of the previous one is a repeat from
/// a batch that made no progress and is skipped.
pub fn decode_extents(raw: &[FiemapExtent], block_size: BlockSize) -> Vec<Extent> {
    let mut out = Vec::with_capacity(raw.len());
    let mut logical_end: Option<u64> = None;

    for ext in raw {
        if logical_end.is_some_and(|end| ext.logical < end) {
            continue;
        }
        logical_end = Some(ext.logical.saturating_add(ext.length));

        if !ext.flags.intersects(NO_PHYSICAL) {
            out.push(block_size.span(ext.physical, ext.length));
        }
        if ext.flags.contains(ExtentFlags::LAST) {
            break;
        }
    }
    out
}

// ── Production source ─────────────────────────────────────────────────

/// FIEMAP-backed [`ExtentSource`]. `blkmap` issues the batched ioctl calls.
#[derive(Debug, Clone, Copy)]
pub struct Fiemap {
    pub block_size: BlockSize,
    /// Flush dirty data first so delayed allocations get real addresses.
    pub sync:       bool,
}

impl Fiemap {
    pub fn new(block_size: BlockSize, sync: bool) -> Self {
        Self { block_size, sync }
    }
}

impl Default for Fiemap {
    fn default() -> Self {
        Self::new(BlockSize::DEFAULT, false)
    }
}

impl ExtentSource for Fiemap {
    fn map_file(&self, path: &Path) -> io::Result<FileMap> {
        let file = File::open(path)?;
        let meta = file.metadata()?;
        if !meta.is_file() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
        }
        if self.sync {
            file.sync_data()?;
        }
        let raw = file.fiemap()?;
        let extents = coalesce(decode_extents(&raw, self.block_size));
        Ok(FileMap { size: meta.len(), extents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BS: u64 = 4096;

    fn ext(logical: u64, physical: u64, length: u64, flags: ExtentFlags) -> FiemapExtent {
        FiemapExtent { logical, physical, length, flags }
    }

    /// `n` one-block records, each two blocks apart on disk, the last flagged.
    fn scattered(n: u64) -> Vec<FiemapExtent> {
        (0..n)
            .map(|i| {
                let flags = if i + 1 == n { ExtentFlags::LAST } else { ExtentFlags::empty() };
                ext(i * BS, 2 * i * BS, BS, flags)
            })
            .collect()
    }

    #[test]
    fn more_records_than_one_batch_are_all_kept() {
        // Several kernel batches of 256 back to back.
        let raw = scattered(700);
        let blocks = decode_extents(&raw, BlockSize::DEFAULT);
        assert_eq!(blocks.len(), 700);
        assert_eq!(blocks[0], Extent::new(0, 1));
        assert_eq!(blocks[699], Extent::new(1398, 1399));
        assert_eq!(coalesce(blocks).len(), 700);
    }

    #[test]
    fn nothing_after_the_last_record() {
        let mut raw = scattered(3);
        raw.push(ext(3 * BS, 100 * BS, BS, ExtentFlags::empty()));
        let blocks = decode_extents(&raw, BlockSize::DEFAULT);
        assert_eq!(blocks.len(), 3);
        assert!(!blocks.contains(&Extent::new(100, 101)));
    }

    #[test]
    fn records_without_a_physical_address_are_dropped() {
        let raw = vec![
            ext(0, 10 * BS, BS, ExtentFlags::empty()),
            ext(BS, 0, BS, ExtentFlags::DELALLOC | ExtentFlags::UNKNOWN),
            ext(2 * BS, 0, BS, ExtentFlags::UNKNOWN),
            ext(3 * BS, 77, 60, ExtentFlags::DATA_INLINE | ExtentFlags::NOT_ALIGNED),
            ext(4 * BS, 20 * BS, BS, ExtentFlags::SHARED | ExtentFlags::LAST),
        ];
        let blocks = decode_extents(&raw, BlockSize::DEFAULT);
        assert_eq!(blocks, vec![Extent::new(10, 11), Extent::new(20, 21)]);
    }

    #[test]
    fn repeated_batch_without_progress_is_skipped() {
        // The second batch restarts at an offset already covered.
        let mut raw = scattered(4);
        raw[3].flags = ExtentFlags::empty();
        raw.extend(scattered(4));
        let blocks = decode_extents(&raw, BlockSize::DEFAULT);
        assert_eq!(blocks.len(), 4);
    }

    #[test]
    fn unflagged_tail_is_still_used() {
        let mut raw = scattered(2);
        raw[1].flags = ExtentFlags::empty();
        assert_eq!(decode_extents(&raw, BlockSize::DEFAULT).len(), 2);
        assert!(decode_extents(&[], BlockSize::DEFAULT).is_empty());
    }

    fn unsupported(e: &io::Error) -> bool {
        // tmpfs, overlayfs and friends have no FIEMAP.
        e.kind() == io::ErrorKind::Unsupported
    }

    #[test]
    fn empty_file_has_no_extents() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        match Fiemap::default().map_file(tmp.path()) {
            Ok(map) => {
                assert_eq!(map.size, 0);
                assert!(map.extents.is_empty());
            }
            Err(e) if unsupported(&e) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn written_file_maps_to_coalesced_extents() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&vec![0xa5u8; 64 * 1024]).unwrap();

        let map = match Fiemap::new(BlockSize::DEFAULT, true).map_file(tmp.path()) {
            Ok(map) => map,
            Err(e) if unsupported(&e) => return,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(map.size, 64 * 1024);
        assert!(!map.extents.is_empty());
        for pair in map.extents.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn directories_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Fiemap::default().map_file(dir.path()).is_err());
    }
}
