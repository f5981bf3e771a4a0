use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use std::io;

mod audit;
mod commands;
mod config;
mod disk;
mod executor;
mod operation;
mod pkg;
mod privilege;
mod progress;
mod runner;
mod session;
mod summary;

use config::{RunConfig, Selection, Settings};
use executor::SystemExecutor;
use operation::Action;
use session::Session;

#[derive(Parser)]
#[command(name = "sys-clean", version, disable_version_flag = true)]
#[command(about = "Free disk space on Linux: page cache, /tmp, package caches, old configs and user caches")]
#[command(
    long_about = "Free disk space on Linux: page cache, /tmp, package caches, old configs and user caches.\n\n\
                  Without an action flag an interactive menu is shown."
)]
#[command(group(
    ArgGroup::new("action")
        .args(["all", "tmp", "cache", "pkg", "purge"])
        .multiple(false) // ensures only one can be set
))]
struct Cli {
    /// Run every cleanup step
    #[arg(long)]
    all: bool,

    /// Clear /tmp
    #[arg(long)]
    tmp: bool,

    /// Clear user and global cache directories
    #[arg(long)]
    cache: bool,

    /// Clear the package manager cache
    #[arg(long)]
    pkg: bool,

    /// Purge configuration left by removed packages
    #[arg(long)]
    purge: bool,

    /// Show what would be cleaned without removing anything
    #[arg(long)]
    dry_run: bool,

    /// Only print the final summary
    #[arg(long)]
    quiet: bool,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Print version
    #[allow(dead_code)]
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

impl Cli {
    fn selection(&self) -> Option<Selection> {
        if self.all {
            Some(Selection::All)
        } else if self.tmp {
            Some(Selection::Single(Action::CleanTmp))
        } else if self.cache {
            Some(Selection::Single(Action::CleanUserCache))
        } else if self.pkg {
            Some(Selection::Single(Action::CleanPkgCache))
        } else if self.purge {
            Some(Selection::Single(Action::PurgeConfigs))
        } else {
            None
        }
    }

    fn run_config(&self) -> RunConfig {
        RunConfig {
            dry_run: self.dry_run,
            quiet: self.quiet,
            no_color: self.no_color,
            selection: self.selection(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print()?;
                return Ok(());
            }
            _ => {
                // clap's own error already carries the usage line
                e.print().ok();
                std::process::exit(1);
            }
        },
    };

    let config = cli.run_config();
    if config.no_color {
        progress::disable_colors();
    }

    let settings = Settings::discover()?;
    let executor = SystemExecutor::new();
    let mut session = Session::start(config.clone(), settings, &executor);

    let mut stdout = io::stdout();
    match config.selection {
        Some(selection) => {
            session.run_selection(selection);
            session.report(&mut stdout)?;
        }
        None => session.interactive(io::stdin().lock(), &mut stdout)?,
    }

    Ok(())
}
