//! # Configuration for sys-clean
//!
//! Two layers of configuration exist. [`RunConfig`] is resolved once from
//! the command line and never changes afterwards. [`Settings`] is an
//! optional `config.toml` describing where things live on disk (log file,
//! temp directory, cache directories), so the defaults can be moved for
//! unusual layouts.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::operation::Action;

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV: &str = "SYS_CLEAN_CONFIG";

/// Directory under `/tmp` holding display-server sockets. Never removed.
pub const X11_SOCKET_DIR: &str = ".X11-unix";

/// What the user asked for on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Run a single operation.
    Single(Action),
    /// Run every operation in the fixed order.
    All,
}

/// Process-wide options resolved from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub dry_run: bool,
    pub quiet: bool,
    pub no_color: bool,
    pub selection: Option<Selection>,
}

/// On-disk settings (`config.toml`). Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Primary audit log path.
    pub log_file: PathBuf,
    /// Used when `log_file` is not writable.
    pub fallback_log_file: Option<PathBuf>,
    /// Directory cleared by the temp-files operation.
    pub tmp_dir: PathBuf,
    /// Entry names inside `tmp_dir` that are never removed.
    pub reserved_tmp_entries: Vec<String>,
    /// The invoking user's cache directory.
    pub user_cache_dir: Option<PathBuf>,
    /// System-wide cache directories cleared with elevated privileges.
    pub global_cache_dirs: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_file: PathBuf::from("/var/log/sys-clean.log"),
            fallback_log_file: dirs::home_dir().map(|home| home.join(".sys-clean.log")),
            tmp_dir: PathBuf::from("/tmp"),
            reserved_tmp_entries: vec![X11_SOCKET_DIR.to_string()],
            user_cache_dir: dirs::cache_dir(),
            global_cache_dirs: vec![PathBuf::from("/root/.cache")],
        }
    }
}

impl Settings {
    /// Load settings from `$SYS_CLEAN_CONFIG` or the default location.
    ///
    /// A missing file yields the defaults. A file that exists but cannot be
    /// parsed is an error.
    pub fn discover() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::config_dir().map(|dir| dir.join("sys-clean").join("config.toml")),
        };

        match path {
            Some(path) if path.exists() => Settings::load(&path),
            _ => {
                log::debug!("no settings file found, using defaults");
                Ok(Settings::default())
            }
        }
    }

    /// Load a `Settings` from a TOML file.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read.
    /// - TOML parsing fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.as_ref().display()))?;

        let mut parsed: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML from {}", path.as_ref().display()))?;

        // The socket directory stays reserved even if the user list omits it
        if !parsed.reserved_tmp_entries.iter().any(|e| e == X11_SOCKET_DIR) {
            parsed.reserved_tmp_entries.push(X11_SOCKET_DIR.to_string());
        }

        log::debug!("loaded settings from {}", path.as_ref().display());
        Ok(parsed)
    }

    /// Whether an entry directly under `tmp_dir` must be left alone.
    pub fn is_reserved_tmp_entry(&self, name: &str) -> bool {
        self.reserved_tmp_entries.iter().any(|e| e == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tmp_dir = \"/scratch\"\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.tmp_dir, PathBuf::from("/scratch"));
        assert_eq!(settings.log_file, PathBuf::from("/var/log/sys-clean.log"));
        assert_eq!(settings.global_cache_dirs, vec![PathBuf::from("/root/.cache")]);
    }

    #[test]
    fn socket_dir_is_always_reserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "reserved_tmp_entries = [\"keep-me\"]\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.is_reserved_tmp_entry("keep-me"));
        assert!(settings.is_reserved_tmp_entry(X11_SOCKET_DIR));
        assert!(!settings.is_reserved_tmp_entry("junk"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tmp_dir = [not toml").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }
}
