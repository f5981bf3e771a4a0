use colored::Colorize;

use crate::audit::AuditLog;
use crate::commands::{self, OperationContext};
use crate::config::RunConfig;
use crate::executor::{CommandSpec, Executor};
use crate::operation::{Action, Plan, RunResult, Status};
use crate::progress;

/// Run one operation and record it in the audit log.
///
/// Dry runs return before any precondition check or command. Command
/// failures, including commands that cannot be started, become
/// [`Status::Failed`]; this function itself never fails.
pub fn run<E: Executor>(
    action: Action,
    ctx: &OperationContext<E>,
    config: &RunConfig,
    audit: &mut AuditLog,
) -> RunResult {
    if config.dry_run {
        audit.append(&format!("[DRY RUN] {}", action.name()));
        if !config.quiet {
            println!("  {} [DRY RUN] Would clean {}", "→".yellow(), action.name());
        }
        return RunResult::new(action, Status::DryRun);
    }

    let status = match commands::plan(action, ctx) {
        Ok(Plan::Run(cmds)) => execute(action, &cmds, ctx.executor, config.quiet),
        Ok(Plan::Skip(status)) => {
            if !config.quiet {
                println!("  {} {}: {}", "ℹ".blue(), action.name(), status.label());
            }
            status
        }
        Err(e) => {
            log::warn!("{}: {e:#}", action.name());
            if !config.quiet {
                println!("  {} {}", "✗".red().bold(), format!("{} failed", action.name()).red());
            }
            Status::Failed
        }
    };

    audit.append(&format!("{} – {}", action.name(), status.log_label()));
    RunResult::new(action, status)
}

fn execute<E: Executor>(action: Action, cmds: &[CommandSpec], executor: &E, quiet: bool) -> Status {
    let spinner = progress::spinner(action.name(), action.estimated_duration(), quiet);

    // Keep going after a failure; every command gets its chance
    let mut failed = false;
    for cmd in cmds {
        match executor.exec(cmd) {
            Ok(out) if out.success() => {
                log::debug!("`{cmd}` finished in {:?}", out.duration);
            }
            Ok(out) => {
                log::warn!("`{cmd}` exited with {:?}: {}", out.code, out.stderr.trim());
                failed = true;
            }
            Err(e) => {
                log::warn!("{e:#}");
                failed = true;
            }
        }
    }

    if failed {
        progress::finish_err(&spinner, &format!("{} failed", action.name()));
        Status::Failed
    } else {
        progress::finish_ok(&spinner, &format!("{} cleaned", action.name()));
        Status::Cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::executor::testing::RecordingExecutor;
    use crate::pkg::PackageManager;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        dir: TempDir,
        settings: Settings,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            fs::create_dir(dir.path().join("tmp")).unwrap();
            fs::write(dir.path().join("tmp").join("junk"), "x").unwrap();
            let settings = Settings {
                log_file: dir.path().join("audit.log"),
                fallback_log_file: None,
                tmp_dir: dir.path().join("tmp"),
                user_cache_dir: None,
                global_cache_dirs: vec![],
                ..Settings::default()
            };
            Fixture { dir, settings }
        }

        fn audit(&self) -> AuditLog {
            AuditLog::new(self.settings.log_file.clone(), None)
        }

        fn audit_lines(&self) -> Vec<String> {
            fs::read_to_string(self.dir.path().join("audit.log"))
                .unwrap_or_default()
                .lines()
                .map(String::from)
                .collect()
        }
    }

    fn quiet(dry_run: bool) -> RunConfig {
        RunConfig {
            dry_run,
            quiet: true,
            ..RunConfig::default()
        }
    }

    #[test]
    fn dry_run_executes_nothing_for_every_operation() {
        let fixture = Fixture::new();
        let executor = RecordingExecutor::new().respond("dpkg -l", 0, "rc  old 1 all x\n");
        let ctx = OperationContext {
            executor: &executor,
            settings: &fixture.settings,
            manager: PackageManager::Apt,
        };
        let mut audit = fixture.audit();

        for action in Action::ALL {
            let result = run(action, &ctx, &quiet(true), &mut audit);
            assert_eq!(result.status, Status::DryRun);
        }

        assert!(executor.calls.borrow().is_empty());
        assert!(fixture.dir.path().join("tmp").join("junk").exists());
        let lines = fixture.audit_lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].ends_with("[DRY RUN] System Cache"));
    }

    #[test]
    fn zero_exit_is_cleared_and_logged_as_success() {
        let fixture = Fixture::new();
        let executor = RecordingExecutor::new();
        let ctx = OperationContext {
            executor: &executor,
            settings: &fixture.settings,
            manager: PackageManager::Apt,
        };
        let mut audit = fixture.audit();

        let result = run(Action::DropCache, &ctx, &quiet(false), &mut audit);
        assert_eq!(result.status, Status::Cleared);
        assert_eq!(executor.programs(), ["sync", "sysctl"]);
        assert!(fixture.audit_lines()[0].ends_with("System Cache – Success"));
    }

    #[test]
    fn non_zero_exit_is_failed_and_later_commands_still_run() {
        let fixture = Fixture::new();
        let executor = RecordingExecutor::new().respond("apt-get autoremove", 100, "");
        let ctx = OperationContext {
            executor: &executor,
            settings: &fixture.settings,
            manager: PackageManager::Apt,
        };
        let mut audit = fixture.audit();

        let result = run(Action::CleanPkgCache, &ctx, &quiet(false), &mut audit);
        assert_eq!(result.status, Status::Failed);
        assert_eq!(executor.calls.borrow().len(), 2);
        assert!(fixture.audit_lines()[0].ends_with("Package Cache – Failed"));
    }

    #[test]
    fn unstartable_command_is_failed_not_a_crash() {
        let fixture = Fixture::new();
        let executor = RecordingExecutor::new().missing("sysctl");
        let ctx = OperationContext {
            executor: &executor,
            settings: &fixture.settings,
            manager: PackageManager::Apt,
        };
        let mut audit = fixture.audit();

        let result = run(Action::DropCache, &ctx, &quiet(false), &mut audit);
        assert_eq!(result.status, Status::Failed);
    }

    #[test]
    fn unknown_manager_never_reports_cleared() {
        let fixture = Fixture::new();
        let executor = RecordingExecutor::new();
        let ctx = OperationContext {
            executor: &executor,
            settings: &fixture.settings,
            manager: PackageManager::Unknown,
        };
        let mut audit = fixture.audit();

        let result = run(Action::CleanPkgCache, &ctx, &quiet(false), &mut audit);
        assert_eq!(result.status, Status::Unsupported);
        assert!(executor.calls.borrow().is_empty());
        assert_eq!(fixture.audit_lines().len(), 1);
    }

    #[test]
    fn tmp_cleanup_spares_the_socket_dir() {
        let fixture = Fixture::new();
        fs::create_dir(fixture.settings.tmp_dir.join(".X11-unix")).unwrap();
        let executor = RecordingExecutor::new();
        let ctx = OperationContext {
            executor: &executor,
            settings: &fixture.settings,
            manager: PackageManager::Apt,
        };
        let mut audit = fixture.audit();

        let result = run(Action::CleanTmp, &ctx, &quiet(false), &mut audit);
        assert_eq!(result.status, Status::Cleared);

        let calls = executor.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "find");
        assert_eq!(calls[0].args[0], fixture.settings.tmp_dir.as_os_str());
        let shown = calls[0].to_string();
        assert!(shown.contains("! -name .X11-unix"), "{shown}");
        assert!(shown.ends_with("-exec rm -rf -- {} +"), "{shown}");
    }

    #[test]
    fn empty_tmp_is_already_clean_without_commands() {
        let fixture = Fixture::new();
        fs::remove_file(fixture.settings.tmp_dir.join("junk")).unwrap();
        let executor = RecordingExecutor::new();
        let ctx = OperationContext {
            executor: &executor,
            settings: &fixture.settings,
            manager: PackageManager::Apt,
        };
        let mut audit = fixture.audit();

        let result = run(Action::CleanTmp, &ctx, &quiet(false), &mut audit);
        assert_eq!(result.status, Status::AlreadyClean);
        assert!(executor.calls.borrow().is_empty());
    }
}
