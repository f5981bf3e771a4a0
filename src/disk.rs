use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

/// Free space available to unprivileged users on a filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskSample {
    pub available: u64,
}

impl DiskSample {
    /// Sample the filesystem containing `path`.
    pub fn take(path: &Path) -> Result<Self> {
        let stat = nix::sys::statvfs::statvfs(path)
            .with_context(|| format!("Failed to statvfs {}", path.display()))?;
        let available = stat.blocks_available() as u64 * stat.fragment_size() as u64;
        Ok(DiskSample { available })
    }
}

/// Signed change in available space; positive means space was freed.
pub fn compute_freed(before: DiskSample, after: DiskSample) -> i64 {
    after.available as i64 - before.available as i64
}

/// How a space delta is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freed {
    Bytes(u64),
    Nothing,
}

impl Freed {
    pub fn from_delta(delta: i64) -> Self {
        if delta > 0 {
            Freed::Bytes(delta as u64)
        } else {
            Freed::Nothing
        }
    }
}

impl fmt::Display for Freed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freed::Bytes(bytes) => write!(f, "Freed {}", format_size(*bytes)),
            Freed::Nothing => write!(f, "No noticeable space freed"),
        }
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1000;
    const MB: u64 = KB * 1000;
    const GB: u64 = MB * 1000;

    match bytes {
        b if b >= GB => format!("{:.1} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.1} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.1} KB", b as f64 / KB as f64),
        _ => format!("{} B", bytes),
    }
}
