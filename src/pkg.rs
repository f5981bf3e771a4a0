//! # Package manager detection and command tables
//!
//! Exactly one package manager is used per run. It is probed once at
//! startup, in a fixed priority order, and the per-manager cleanup commands
//! live in a table so supporting another manager means adding a row.

use std::env;
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use crate::executor::CommandSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Pacman,
    Zypper,
    Unknown,
}

struct ManagerEntry {
    kind: PackageManager,
    binary: &'static str,
    cache_commands: &'static [&'static [&'static str]],
}

/// Probe order and cache-cleaning commands, one row per manager.
const MANAGERS: &[ManagerEntry] = &[
    ManagerEntry {
        kind: PackageManager::Apt,
        binary: "apt-get",
        cache_commands: &[&["autoremove", "-y"], &["clean"]],
    },
    ManagerEntry {
        kind: PackageManager::Dnf,
        binary: "dnf",
        cache_commands: &[&["autoremove", "-y"], &["clean", "all"]],
    },
    ManagerEntry {
        kind: PackageManager::Pacman,
        binary: "pacman",
        cache_commands: &[&["-Sc", "--noconfirm"]],
    },
    ManagerEntry {
        kind: PackageManager::Zypper,
        binary: "zypper",
        cache_commands: &[&["--non-interactive", "clean", "--all"]],
    },
];

impl PackageManager {
    /// Detect the package manager from the current `PATH`.
    pub fn detect() -> Self {
        let path = env::var_os("PATH").unwrap_or_default();
        let detected = Self::detect_in(&path);
        log::debug!("detected package manager: {detected}");
        detected
    }

    /// Detect using an explicit `PATH`-style search list.
    pub fn detect_in(search_path: &OsStr) -> Self {
        let dirs: Vec<_> = env::split_paths(search_path).collect();
        MANAGERS
            .iter()
            .find(|entry| dirs.iter().any(|dir| is_executable(&dir.join(entry.binary))))
            .map(|entry| entry.kind)
            .unwrap_or(PackageManager::Unknown)
    }

    fn entry(self) -> Option<&'static ManagerEntry> {
        MANAGERS.iter().find(|entry| entry.kind == self)
    }

    /// Commands that clear this manager's caches, in order.
    ///
    /// Empty for [`PackageManager::Unknown`].
    pub fn cache_commands(self) -> Vec<CommandSpec> {
        self.entry()
            .map(|entry| {
                entry
                    .cache_commands
                    .iter()
                    .map(|args| CommandSpec::new(entry.binary, *args).elevated())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether orphaned configs can be found through `dpkg`.
    pub fn uses_dpkg(self) -> bool {
        self == PackageManager::Apt
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
            PackageManager::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Command listing installed package states.
pub fn dpkg_list() -> CommandSpec {
    CommandSpec::new("dpkg", &["-l"])
}

/// Packages removed but with configuration files left behind (`rc` state).
pub fn orphaned_configs(dpkg_list_output: &str) -> Vec<String> {
    dpkg_list_output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("rc"), Some(name)) => Some(name.to_string()),
                _ => None,
            }
        })
        .collect()
}

/// Command purging the given packages' leftover configuration.
pub fn purge_command(packages: &[String]) -> CommandSpec {
    let mut args = vec!["--purge".to_string()];
    args.extend(packages.iter().cloned());
    CommandSpec::new("dpkg", args.as_slice()).elevated()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn fake_binary(dir: &Path, name: &str) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn nothing_on_path_is_unknown() {
        let dir = tempdir().unwrap();
        assert_eq!(
            PackageManager::detect_in(dir.path().as_os_str()),
            PackageManager::Unknown
        );
    }

    #[test]
    fn first_match_in_priority_order_wins() {
        let dir = tempdir().unwrap();
        fake_binary(dir.path(), "zypper");
        fake_binary(dir.path(), "dnf");
        assert_eq!(
            PackageManager::detect_in(dir.path().as_os_str()),
            PackageManager::Dnf
        );
    }

    #[test]
    fn priority_holds_across_path_entries() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fake_binary(first.path(), "pacman");
        fake_binary(second.path(), "apt-get");

        let path = env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(PackageManager::detect_in(&path), PackageManager::Apt);
    }

    #[test]
    fn non_executable_file_is_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("apt-get"), "").unwrap();
        assert_eq!(
            PackageManager::detect_in(dir.path().as_os_str()),
            PackageManager::Unknown
        );
    }

    #[test]
    fn unknown_manager_has_no_cache_commands() {
        assert!(PackageManager::Unknown.cache_commands().is_empty());
    }

    #[test]
    fn apt_cache_commands_are_elevated() {
        let cmds = PackageManager::Apt.cache_commands();
        let rendered: Vec<_> = cmds.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered, ["sudo apt-get autoremove -y", "sudo apt-get clean"]);
    }

    #[test]
    fn orphaned_configs_only_picks_rc_rows() {
        let listing = "\
Desired=Unknown/Install/Remove/Purge/Hold
||/ Name           Version      Architecture Description
+++-==============-============-============-=================
ii  bash           5.2-2        amd64        GNU Bourne Again SHell
rc  libfoo1:amd64  1.0-1        amd64        old library
rc  oldtool        2.3          all          removed tool
";
        assert_eq!(orphaned_configs(listing), ["libfoo1:amd64", "oldtool"]);
        assert!(orphaned_configs("ii  bash 5.2 amd64 shell\n").is_empty());
    }

    #[test]
    fn purge_command_lists_every_package() {
        let cmd = purge_command(&["a".to_string(), "b".to_string()]);
        assert_eq!(cmd.to_string(), "sudo dpkg --purge a b");
    }
}
