use serde::{Deserialize, Serialize};
use std::fmt;

/// Addressing unit for every block number in the index.
///
/// One value is threaded through both the FIEMAP conversion and the
/// filesystem block-count lookup so the two always agree on scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSize(u64);

impl BlockSize {
    pub const DEFAULT: BlockSize = BlockSize(4096);

    /// Returns `None` for zero.
    pub fn new(bytes: u64) -> Option<Self> {
        if bytes == 0 { None } else { Some(Self(bytes)) }
    }

    pub fn bytes(self) -> u64 { self.0 }

    /// Block containing byte `offset`.
    pub fn block_of(self, offset: u64) -> u64 {
        offset / self.0
    }

    /// Converts a physical byte run into a half-open block range.
    /// `len == 0` yields an empty range at the start block.
    pub fn span(self, physical: u64, len: u64) -> Extent {
        let start = self.block_of(physical);
        if len == 0 {
            return Extent { start, end: start };
        }
        let last = self.block_of(physical.saturating_add(len - 1));
        Extent { start, end: last + 1 }
    }
}

impl Default for BlockSize {
    fn default() -> Self { Self::DEFAULT }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} B", self.0)
    }
}

/// A run of physical blocks, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub start: u64,
    pub end:   u64,
}

impl Extent {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 { self.end.saturating_sub(self.start) }
    pub fn is_empty(&self) -> bool { self.end <= self.start }

    /// Last block covered (inclusive); meaningless for an empty extent.
    pub fn last_block(&self) -> u64 { self.end.saturating_sub(1) }

    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start < end && start < self.end
    }
}

/// Sorts `raw` by start block and merges every pair that touches or overlaps.
///
/// Empty ranges are dropped. The result is strictly increasing with a gap of
/// at least one block between neighbours.
pub fn coalesce(mut raw: Vec<Extent>) -> Vec<Extent> {
    raw.retain(|e| !e.is_empty());
    raw.sort_unstable();

    let mut out: Vec<Extent> = Vec::with_capacity(raw.len());
    for ext in raw {
        match out.last_mut() {
            Some(prev) if ext.start <= prev.end => {
                prev.end = prev.end.max(ext.end);
            }
            _ => out.push(ext),
        }
    }
    out
}
