//! Physical, single-device directory traversal feeding the extent store.

use crate::collectors::fiemap::ExtentSource;
use crate::models::file_record::{FileRecord, ScanStats};
use crate::store::ExtentStore;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Do not descend into directories on another device than the root.
    pub one_file_system: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self { one_file_system: true }
    }
}

/// Clears `store` and refills it from every regular file under `root`.
///
/// Symlinks are never followed. Entries are visited depth-first in
/// byte-wise name order, so an unchanged tree always yields the same ids.
/// Per-entry failures only bump the skip counters; an unreadable root
/// leaves the store empty.
pub fn scan_tree<S: ExtentSource + ?Sized>(
    root:    &Path,
    source:  &S,
    opts:    WalkOptions,
    store:   &mut ExtentStore,
) -> ScanStats {
    let started = Instant::now();
    let mut stats = ScanStats::default();
    store.clear();

    let root = absolute(root);
    let root_dev = match fs::symlink_metadata(&root) {
        Ok(meta) => meta.dev(),
        Err(e) => {
            warn!(path = %root.display(), error = %e, "cannot open scan root");
            stats.elapsed = started.elapsed();
            store.freeze();
            return stats;
        }
    };

    let mut stack: Vec<PathBuf> = vec![root];
    while let Some(path) = stack.pop() {
        let meta = match fs::symlink_metadata(&path) {
            Ok(m)  => m,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "entry vanished");
                continue;
            }
        };
        let ft = meta.file_type();

        if ft.is_dir() {
            if opts.one_file_system && meta.dev() != root_dev {
                debug!(path = %path.display(), "mount point, not crossing");
                stats.dirs_skipped += 1;
                continue;
            }
            match sorted_children(&path) {
                Ok(children) => {
                    stats.dirs_seen += 1;
                    stack.extend(children.into_iter().rev());
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "cannot read directory");
                    stats.dirs_skipped += 1;
                }
            }
        } else if ft.is_file() {
            stats.files_seen += 1;
            let committed = map_one(&path, source).and_then(|record| {
                let extents = record.extent_count;
                store.commit(record).map(|_| extents)
            });
            match committed {
                Some(extents) => {
                    stats.extents += extents;
                    stats.files_mapped += 1;
                }
                None => stats.files_skipped += 1,
            }
        }
    }
    store.freeze();

    stats.elapsed = started.elapsed();
    info!(
        files      = stats.files_mapped,
        skipped    = stats.files_skipped,
        dirs       = stats.dirs_seen,
        extents    = stats.extents,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "scan complete"
    );
    stats
}

/// Maps one file. Paths that are not valid UTF-8 are skipped: they cannot be
/// used as lookup keys without aliasing another name.
fn map_one<S: ExtentSource + ?Sized>(path: &Path, source: &S) -> Option<FileRecord> {
    let Some(key) = path.to_str() else {
        debug!(path = %path.display(), "non-UTF-8 path, skipped");
        return None;
    };
    match source.map_file(path) {
        Ok(map) => FileRecord::new(key.to_string(), map.size, map.extents),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no extent map");
            None
        }
    }
}

fn sorted_children(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut names: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name())
        .collect();
    names.sort();
    Ok(names.into_iter().map(|n| dir.join(n)).collect())
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_)  => path.to_path_buf(),
    }
}
