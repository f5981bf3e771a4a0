use anyhow::Result;
use std::ffi::OsStr;
use std::path::Path;

use crate::config::Settings;
use crate::executor::CommandSpec;
use crate::operation::Plan;

/// Empty the user's cache directory and the configured global ones.
///
/// The directories themselves are kept; only their contents go. Global
/// directories are often unreadable to a normal user, so anything that is
/// not known to be absent gets a command.
pub fn plan(settings: &Settings) -> Result<Plan> {
    let mut cmds = Vec::new();

    if let Some(dir) = &settings.user_cache_dir {
        if dir.is_dir() {
            cmds.push(empty_dir(dir));
        }
    }

    for dir in &settings.global_cache_dirs {
        if Some(dir) == settings.user_cache_dir.as_ref() {
            continue;
        }
        match dir.try_exists() {
            Ok(false) => log::debug!("{} does not exist, skipping", dir.display()),
            // Err usually means permission denied, which sudo gets past
            Ok(true) | Err(_) => cmds.push(empty_dir(dir).elevated()),
        }
    }

    Ok(Plan::Run(cmds))
}

fn empty_dir(dir: &Path) -> CommandSpec {
    let args = [dir.as_os_str(), OsStr::new("-mindepth"), OsStr::new("1"), OsStr::new("-delete")];
    CommandSpec::new("find", &args)
}
