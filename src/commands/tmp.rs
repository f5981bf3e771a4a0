use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;

use crate::config::Settings;
use crate::executor::CommandSpec;
use crate::operation::{Plan, Status};

/// Remove everything under the temp directory except reserved entries.
///
/// An absent or empty directory (reserved entries aside) is already clean
/// and produces no command.
pub fn plan(settings: &Settings) -> Result<Plan> {
    let tmp_dir = &settings.tmp_dir;

    let entries = match fs::read_dir(tmp_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Plan::Skip(Status::AlreadyClean)),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", tmp_dir.display()));
        }
    };

    let mut has_targets = false;
    for entry in entries {
        let name = entry?.file_name();
        let reserved = name.to_str().is_some_and(|n| settings.is_reserved_tmp_entry(n));
        if !reserved {
            has_targets = true;
            break;
        }
    }

    if !has_targets {
        return Ok(Plan::Skip(Status::AlreadyClean));
    }

    Ok(Plan::Run(vec![remove_entries(settings).elevated()]))
}

/// `find <tmp> -mindepth 1 -maxdepth 1 ! -name <reserved>... -exec rm -rf -- {} +`
///
/// `find` hands entry names to `rm` as raw bytes and splits them into
/// batches below the argument size limit.
fn remove_entries(settings: &Settings) -> CommandSpec {
    let mut args: Vec<OsString> = vec![
        settings.tmp_dir.clone().into_os_string(),
        "-mindepth".into(),
        "1".into(),
        "-maxdepth".into(),
        "1".into(),
    ];
    for reserved in &settings.reserved_tmp_entries {
        args.push("!".into());
        args.push("-name".into());
        args.push(reserved.into());
    }
    for arg in ["-exec", "rm", "-rf", "--", "{}", "+"] {
        args.push(arg.into());
    }
    CommandSpec::new("find", args.as_slice())
}
