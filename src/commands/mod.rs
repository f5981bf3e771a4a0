use anyhow::Result;

use crate::config::Settings;
use crate::executor::Executor;
use crate::operation::{Action, Plan};
use crate::pkg::PackageManager;

pub mod drop_cache;
pub mod pkg_cache;
pub mod purge;
pub mod tmp;
pub mod user_cache;

/// Everything an operation needs to decide what to run.
pub struct OperationContext<'a, E: Executor> {
    pub executor: &'a E,
    pub settings: &'a Settings,
    pub manager: PackageManager,
}

/// Check an operation's preconditions and build its command list.
///
/// Read-only: nothing here mutates the system.
pub fn plan<E: Executor>(action: Action, ctx: &OperationContext<E>) -> Result<Plan> {
    match action {
        Action::DropCache => Ok(drop_cache::plan()),
        Action::CleanTmp => tmp::plan(ctx.settings),
        Action::CleanPkgCache => Ok(pkg_cache::plan(ctx.manager)),
        Action::PurgeConfigs => purge::plan(ctx.executor, ctx.manager),
        Action::CleanUserCache => user_cache::plan(ctx.settings),
    }
}
