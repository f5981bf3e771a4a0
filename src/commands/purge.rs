use anyhow::Result;

use crate::executor::Executor;
use crate::operation::{Plan, Status};
use crate::pkg::{self, PackageManager};

/// Purge configuration left behind by removed packages.
///
/// Queries `dpkg` for packages in the `rc` state; if there are none, no
/// purge runs.
pub fn plan<E: Executor>(executor: &E, manager: PackageManager) -> Result<Plan> {
    if !manager.uses_dpkg() {
        log::warn!("orphaned config purge needs dpkg, detected {manager}");
        return Ok(Plan::Skip(Status::Unsupported));
    }

    let listing = executor.exec(&pkg::dpkg_list())?;
    if !listing.success() {
        anyhow::bail!("dpkg -l exited with {:?}: {}", listing.code, listing.stderr.trim());
    }

    let orphans = pkg::orphaned_configs(&listing.stdout);
    if orphans.is_empty() {
        return Ok(Plan::Skip(Status::NoneFound));
    }

    log::debug!("orphaned configs: {}", orphans.join(" "));
    Ok(Plan::Run(vec![pkg::purge_command(&orphans)]))
}
