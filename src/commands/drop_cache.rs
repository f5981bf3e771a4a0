use crate::executor::CommandSpec;
use crate::operation::Plan;

/// Flush dirty pages, then drop the page cache, dentries and inodes.
pub fn plan() -> Plan {
    Plan::Run(vec![
        CommandSpec::new("sync", &[] as &[&str]),
        CommandSpec::new("sysctl", &["-w", "vm.drop_caches=3"]).elevated(),
    ])
}
