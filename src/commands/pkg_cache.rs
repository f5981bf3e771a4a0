use crate::operation::{Plan, Status};
use crate::pkg::PackageManager;

/// Remove unneeded packages and clear the manager's download cache.
pub fn plan(manager: PackageManager) -> Plan {
    let cmds = manager.cache_commands();
    if cmds.is_empty() {
        log::warn!("no supported package manager found, skipping package cache");
        return Plan::Skip(Status::Unsupported);
    }
    Plan::Run(cmds)
}
