use crate::models::extent::BlockSize;
use anyhow::{Context, Result};
use nix::sys::statvfs::statvfs;
use std::path::Path;

/// Capacity of the filesystem holding `path`, in `block_size` units.
///
/// Uses the fragment size statvfs reports, so the figure lines up with
/// the block numbers FIEMAP-derived extents are expressed in.
pub fn device_blocks(path: &Path, block_size: BlockSize) -> Result<u64> {
    let stat = statvfs(path)
        .with_context(|| format!("statvfs {}", path.display()))?;
    let frsize = stat.fragment_size() as u64;
    let bytes  = (stat.blocks() as u64).saturating_mul(frsize);
    Ok(bytes / block_size.bytes())
}

/// Short description of the mount holding `path`, from /proc/mounts.
/// Longest matching mount point wins.
pub fn mount_of(path: &Path) -> Option<(String, String, String)> {
    let content = std::fs::read_to_string("/proc/mounts").ok()?;
    parse_mounts(&content)
        .into_iter()
        .filter(|(_, mount, _)| path.starts_with(mount))
        .max_by_key(|(_, mount, _)| mount.len())
}

fn parse_mounts(content: &str) -> Vec<(String, String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mount  = fields.next()?;
            let fstype = fields.next()?;
            Some((device.to_string(), unescape_octal(mount), fstype.to_string()))
        })
        .collect()
}

// /proc/mounts encodes space, tab, newline and backslash as \ooo.
fn unescape_octal(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|d| (b'0'..=b'7').contains(d)) {
                let v = digits.iter().fold(0u32, |acc, d| acc * 8 + (d - b'0') as u32);
                out.push(v as u8);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
