//! # Audit log
//!
//! One timestamped line per event, appended to a system-wide file. When that
//! file is not writable (usually because we are not root) the log quietly
//! moves to a per-user file for the rest of the session.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct AuditLog {
    primary: PathBuf,
    fallback: Option<PathBuf>,
    using_fallback: bool,
}

impl AuditLog {
    pub fn new(primary: PathBuf, fallback: Option<PathBuf>) -> Self {
        AuditLog {
            primary,
            fallback,
            using_fallback: false,
        }
    }

    /// Append `message` as `<timestamp> - <message>`.
    ///
    /// Never fails and never prints: write errors only show up in the
    /// debug log.
    pub fn append(&mut self, message: &str) {
        let line = format!("{} - {}", Local::now().format("%Y-%m-%d %H:%M:%S"), message);

        if !self.using_fallback {
            match write_line(&self.primary, &line) {
                Ok(()) => return,
                Err(e) => {
                    log::debug!("audit log falling back: {e:#}");
                    self.using_fallback = true;
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            if let Err(e) = write_line(fallback, &line) {
                log::debug!("audit line dropped: {e:#}");
            }
        }
    }

    /// The file currently receiving lines.
    pub fn current_path(&self) -> Option<&Path> {
        if self.using_fallback {
            self.fallback.as_deref()
        } else {
            Some(self.primary.as_path())
        }
    }
}

fn write_line(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    writeln!(file, "{line}").with_context(|| format!("Failed to write to {}", path.display()))?;
    Ok(())
}
