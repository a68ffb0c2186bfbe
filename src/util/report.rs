use crate::analyzer::Analyzer;
use crate::collectors::filesystem;
use crate::models::file_record::FileRecord;
use crate::util::human::{fmt_block_range, fmt_bytes, fmt_count};

/// Human-readable fragmentation report for the last scan.
pub fn generate(an: &Analyzer, top_k: usize) -> String {
    let now   = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let sum   = an.summary();
    let stats = an.last_scan();
    let root  = an.root().map(|p| p.display().to_string()).unwrap_or_else(|| "—".into());
    let mut out = String::new();

    out.push_str("═══════════════════════════════════════════════\n");
    out.push_str(&format!("  fragmap report — {}\n", now));
    out.push_str(&format!("  root: {}\n", root));
    if let Some((dev, mount, fstype)) = an.root().and_then(filesystem::mount_of) {
        out.push_str(&format!("  on:   {} at {} ({})\n", dev, mount, fstype));
    }
    out.push_str("═══════════════════════════════════════════════\n\n");

    // ── Totals ─────────────────────────────────────────────────────────
    out.push_str("── Totals ─────────────────────────────────────\n");
    out.push_str(&format!("  Files mapped      {:>14}\n", fmt_count(sum.files as u64)));
    out.push_str(&format!("  Files skipped     {:>14}\n", fmt_count(stats.files_skipped as u64)));
    out.push_str(&format!("  Extents           {:>14}\n", fmt_count(sum.extents as u64)));
    out.push_str(&format!(
        "  Fragmented files  {:>14}  ({:.1}%)\n",
        fmt_count(sum.fragmented_files as u64), sum.fragmented_pct()
    ));
    out.push_str(&format!("  Avg extents/file  {:>14.2}\n", sum.avg_extents));
    out.push_str(&format!("  Data              {:>14}\n", fmt_bytes(sum.total_bytes)));
    out.push_str(&format!("  Block unit        {:>14}\n", an.block_size().to_string()));
    if let Ok(blocks) = an.device_blocks() {
        out.push_str(&format!("  Device blocks     {:>14}\n", fmt_count(blocks)));
    }
    out.push_str(&format!("  Scan time         {:>12}ms\n", stats.elapsed.as_millis()));
    out.push('\n');

    // ── Top lists ──────────────────────────────────────────────────────
    out.push_str(&format!("── Most fragmented (top {}) ────────────────────\n", top_k));
    push_table(&mut out, &an.top_by_extent_count(top_k));
    out.push('\n');

    out.push_str(&format!("── Largest (top {}) ────────────────────────────\n", top_k));
    push_table(&mut out, &an.top_by_size(top_k));
    out.push('\n');

    out.push_str("═══════════════════════════════════════════════\n");
    out
}

/// Files overlapping one block range. With `per_extent` a file is listed
/// once for every extent in range, otherwise once.
pub fn range_listing(an: &Analyzer, start: u64, end: u64, per_extent: bool) -> String {
    let files = if per_extent {
        an.list_overlapping(start, end)
    } else {
        an.distinct_overlapping(start, end)
    };
    let label = if per_extent { "rows" } else { "files" };
    let mut out = format!(
        "blocks {}  extents {}  {} {}\n",
        fmt_block_range(start, end),
        an.count_overlapping(start, end),
        label,
        files.len(),
    );
    push_table(&mut out, &files);
    out
}

/// Every indexed record, in id order.
pub fn all_files(an: &Analyzer) -> Vec<FileRecord> {
    (0..an.file_count()).filter_map(|id| an.lookup_by_id(id).ok()).collect()
}

fn push_table(out: &mut String, files: &[FileRecord]) {
    if files.is_empty() {
        out.push_str("  (none)\n");
        return;
    }
    out.push_str(&format!("  {:>8}  {:>10}  {}\n", "Extents", "Size", "Path"));
    out.push_str(&format!("  {}\n", "─".repeat(60)));
    for f in files {
        out.push_str(&format!("  {:>8}  {:>10}  {}\n", f.extent_count, fmt_bytes(f.size), f.path));
    }
}
