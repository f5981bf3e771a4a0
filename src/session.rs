//! # Cleanup session
//!
//! A [`Session`] is built once per process. Startup detects the package
//! manager, asks for elevated privileges and samples free disk space. After
//! that it either runs the single selection given on the command line or
//! loops over an interactive menu, reporting the cumulative summary after
//! every round.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::audit::AuditLog;
use crate::commands::OperationContext;
use crate::config::{RunConfig, Selection, Settings};
use crate::disk::{self, DiskSample, Freed};
use crate::executor::Executor;
use crate::operation::{Action, Status};
use crate::pkg::PackageManager;
use crate::privilege;
use crate::runner;
use crate::summary::Summary;

/// One line of input at the interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run(Selection),
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        let choice = match input.trim() {
            "0" => MenuChoice::Exit,
            "1" => MenuChoice::Run(Selection::Single(Action::DropCache)),
            "2" => MenuChoice::Run(Selection::Single(Action::CleanTmp)),
            "3" => MenuChoice::Run(Selection::Single(Action::CleanPkgCache)),
            "4" => MenuChoice::Run(Selection::Single(Action::PurgeConfigs)),
            "5" => MenuChoice::Run(Selection::Single(Action::CleanUserCache)),
            "6" => MenuChoice::Run(Selection::All),
            _ => return None,
        };
        Some(choice)
    }
}

pub struct Session<'a, E: Executor> {
    config: RunConfig,
    settings: Settings,
    manager: PackageManager,
    executor: &'a E,
    audit: AuditLog,
    summary: Summary,
    disk_root: PathBuf,
    before: Option<DiskSample>,
}

impl<'a, E: Executor> Session<'a, E> {
    /// A session with no startup side effects.
    pub fn new(config: RunConfig, settings: Settings, manager: PackageManager, executor: &'a E) -> Self {
        let audit = AuditLog::new(settings.log_file.clone(), settings.fallback_log_file.clone());
        Session {
            config,
            settings,
            manager,
            executor,
            audit,
            summary: Summary::new(),
            disk_root: PathBuf::from("/"),
            before: None,
        }
    }

    /// Detect the package manager, elevate, show the banner and take the
    /// "before" disk sample.
    pub fn start(config: RunConfig, settings: Settings, executor: &'a E) -> Self {
        let manager = PackageManager::detect();
        let mut session = Session::new(config, settings, manager, executor);
        let quiet = session.config.quiet;

        if session.config.dry_run {
            log::debug!("dry run, not asking for privileges");
        } else if !privilege::ensure_elevated(executor).is_elevated() && !quiet {
            println!(
                "{} {}",
                "!".yellow().bold(),
                "Running without elevated privileges; system-level steps may fail".yellow()
            );
        }

        if !quiet {
            println!(
                "{} {} {}",
                "sys-clean".cyan().bold(),
                env!("CARGO_PKG_VERSION").dimmed(),
                format!("(package manager: {manager})").dimmed()
            );
            if session.config.dry_run {
                println!("{}", "Dry run: nothing will be removed".yellow());
            }
        }

        session.audit.append(&format!("Session started (package manager: {manager})"));
        session.before = session.sample_disk();
        session
    }

    fn sample_disk(&self) -> Option<DiskSample> {
        DiskSample::take(&self.disk_root)
            .map_err(|e| log::warn!("{e:#}"))
            .ok()
    }

    #[cfg(test)]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Run one operation and fold its result into the summary.
    pub fn run_action(&mut self, action: Action) -> Status {
        let ctx = OperationContext {
            executor: self.executor,
            settings: &self.settings,
            manager: self.manager,
        };
        let result = runner::run(action, &ctx, &self.config, &mut self.audit);
        log::debug!("{action} finished at {}", result.timestamp.format("%H:%M:%S"));
        let status = result.status;
        self.summary.record(result);
        status
    }

    /// Run every operation in the fixed order, starting from an empty summary.
    pub fn run_all(&mut self) {
        self.summary.reset();
        for action in Action::ALL {
            self.run_action(action);
        }
    }

    pub fn run_selection(&mut self, selection: Selection) {
        match selection {
            Selection::Single(action) => {
                self.run_action(action);
            }
            Selection::All => self.run_all(),
        }
    }

    /// Print the cumulative summary and the space freed since startup.
    pub fn report<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "Summary".bold().underline())?;
        if self.summary.is_empty() {
            writeln!(out, "  {}", "Nothing has run yet".dimmed())?;
        } else {
            self.summary.render(out)?;
        }

        let failures = self
            .summary
            .entries()
            .iter()
            .filter(|(_, status)| status.is_failure())
            .count();
        if failures > 0 {
            writeln!(out, "  {}", format!("{failures} step(s) did not complete").red())?;
        }

        if let Some(before) = self.before {
            if let Some(after) = self.sample_disk() {
                let freed = Freed::from_delta(disk::compute_freed(before, after));
                let line = match freed {
                    Freed::Bytes(_) => freed.to_string().green().bold(),
                    Freed::Nothing => freed.to_string().dimmed(),
                };
                writeln!(out, "  {line}")?;
            }
        }

        if !self.config.quiet {
            if let Some(path) = self.audit.current_path() {
                writeln!(out, "  {}", format!("Log: {}", path.display()).dimmed())?;
            }
        }
        Ok(())
    }

    /// Menu loop. Returns when the user picks Exit or input runs out.
    pub fn interactive<R: BufRead, W: Write>(&mut self, mut input: R, out: &mut W) -> Result<()> {
        loop {
            print_menu(out)?;
            write!(out, "Select an option [0-6]: ")?;
            out.flush()?;

            let mut line = String::new();
            let read = input.read_line(&mut line).context("Failed to read selection")?;
            if read == 0 {
                writeln!(out)?;
                return self.farewell(out);
            }

            match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => return self.farewell(out),
                Some(MenuChoice::Run(selection)) => {
                    self.run_selection(selection);
                    self.report(out)?;
                }
                None => {
                    writeln!(
                        out,
                        "{} {}",
                        "✗".red().bold(),
                        format!("Invalid option: '{}'", line.trim()).red()
                    )?;
                }
            }
        }
    }

    fn farewell<W: Write>(&mut self, out: &mut W) -> Result<()> {
        self.audit.append("Session ended");
        writeln!(out, "{}", "Goodbye!".green().bold())?;
        Ok(())
    }
}

fn print_menu<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "What would you like to clean?".cyan().bold())?;
    for (key, label) in [
        ("1", Action::DropCache.name()),
        ("2", Action::CleanTmp.name()),
        ("3", Action::CleanPkgCache.name()),
        ("4", Action::PurgeConfigs.name()),
        ("5", Action::CleanUserCache.name()),
        ("6", "Everything"),
        ("0", "Exit"),
    ] {
        writeln!(out, "  {} {label}", format!("[{key}]").bold())?;
    }
    Ok(())
}
