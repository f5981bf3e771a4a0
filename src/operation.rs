//! # Operations and their outcomes
//!
//! The five cleanup operations are fixed at compile time. Each run of one
//! produces a [`RunResult`], which is immutable once created.

use chrono::{DateTime, Local};
use colored::{ColoredString, Colorize};
use std::fmt;
use std::time::Duration;

use crate::executor::CommandSpec;

/// A cleanup operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    DropCache,
    CleanTmp,
    CleanPkgCache,
    PurgeConfigs,
    CleanUserCache,
}

impl Action {
    /// Every operation, in the order a full cleanup runs them.
    pub const ALL: [Action; 5] = [
        Action::DropCache,
        Action::CleanTmp,
        Action::CleanPkgCache,
        Action::PurgeConfigs,
        Action::CleanUserCache,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::DropCache => "System Cache",
            Action::CleanTmp => "Temporary Files",
            Action::CleanPkgCache => "Package Cache",
            Action::PurgeConfigs => "Old Configs",
            Action::CleanUserCache => "User Cache",
        }
    }

    /// Rough runtime, only used to pace the spinner.
    pub fn estimated_duration(self) -> Duration {
        let secs = match self {
            Action::DropCache => 2,
            Action::CleanTmp => 2,
            Action::CleanPkgCache => 5,
            Action::PurgeConfigs => 3,
            Action::CleanUserCache => 2,
        };
        Duration::from_secs(secs)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Cleared,
    /// Nothing to remove; no command was run.
    AlreadyClean,
    /// No orphaned configs were found; no command was run.
    NoneFound,
    Failed,
    DryRun,
    /// The detected package manager cannot perform this operation.
    Unsupported,
}

impl Status {
    /// Label used in the audit log.
    pub fn log_label(self) -> &'static str {
        match self {
            Status::Cleared => "Success",
            Status::AlreadyClean => "Already clean",
            Status::NoneFound => "Nothing to purge",
            Status::Failed => "Failed",
            Status::DryRun => "Dry run",
            Status::Unsupported => "Unsupported package manager",
        }
    }

    /// Coloured label used in the summary.
    pub fn label(self) -> ColoredString {
        match self {
            Status::Cleared => "Cleared".green().bold(),
            Status::AlreadyClean => "Already clean".green(),
            Status::NoneFound => "None".dimmed(),
            Status::Failed => "Failed".red().bold(),
            Status::DryRun => "Dry run".yellow(),
            Status::Unsupported => "Unsupported package manager".red(),
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failed | Status::Unsupported)
    }
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub action: Action,
    pub status: Status,
    pub timestamp: DateTime<Local>,
}

impl RunResult {
    pub fn new(action: Action, status: Status) -> Self {
        RunResult {
            action,
            status,
            timestamp: Local::now(),
        }
    }
}

/// What an operation intends to do once its preconditions are checked.
#[derive(Debug, PartialEq, Eq)]
pub enum Plan {
    /// Run these commands in order.
    Run(Vec<CommandSpec>),
    /// Nothing to execute; report this status.
    Skip(Status),
}
