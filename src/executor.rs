//! # Command execution for sys-clean
//!
//! Every cleanup step is expressed as a [`CommandSpec`] (program, arguments,
//! whether it needs root) and handed to an [`Executor`]. The real
//! implementation shells out through `std::process::Command`; tests swap in
//! a recorder so no command ever touches the host.

use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::privilege;

/// A command template in data form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    /// Kept as OS strings so non-UTF-8 paths reach the command unchanged.
    pub args: Vec<OsString>,
    /// Needs root; run through `sudo -n` when the process is not root.
    pub elevated: bool,
}

impl CommandSpec {
    pub fn new<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Self {
        CommandSpec {
            program: program.to_string(),
            args: args.iter().map(|a| a.as_ref().to_os_string()).collect(),
            elevated: false,
        }
    }

    /// Same command, flagged as requiring root.
    pub fn elevated(mut self) -> Self {
        self.elevated = true;
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elevated {
            write!(f, "sudo ")?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Structured result of running a command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A trait for executing commands on the local host.
pub trait Executor {
    /// Run a command to completion and capture its output.
    ///
    /// # Errors
    /// Returns an error only if the process could not be started at all
    /// (e.g. the binary does not exist). A non-zero exit is reported through
    /// [`CommandOutput::code`].
    fn exec(&self, cmd: &CommandSpec) -> Result<CommandOutput>;

    /// Run a command, feeding `input` to its standard input.
    fn exec_with_input(&self, cmd: &CommandSpec, input: &str) -> Result<CommandOutput>;
}

/// Runs commands on the real system.
pub struct SystemExecutor {
    is_root: bool,
}

impl SystemExecutor {
    pub fn new() -> Self {
        SystemExecutor {
            is_root: privilege::is_root(),
        }
    }

    fn build(&self, cmd: &CommandSpec) -> Command {
        let mut command = if cmd.elevated && !self.is_root {
            // Non-interactive: relies on credentials cached by the privilege gate
            let mut c = Command::new("sudo");
            c.arg("-n").arg(&cmd.program);
            c
        } else {
            Command::new(&cmd.program)
        };
        command.args(&cmd.args);
        command
    }
}

impl Executor for SystemExecutor {
    fn exec(&self, cmd: &CommandSpec) -> Result<CommandOutput> {
        log::debug!("exec: {cmd}");
        let started = Instant::now();

        let output = self
            .build(cmd)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to start `{}`", cmd.program))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: started.elapsed(),
        })
    }

    fn exec_with_input(&self, cmd: &CommandSpec, input: &str) -> Result<CommandOutput> {
        log::debug!("exec (with stdin): {cmd}");
        let started = Instant::now();

        let mut child = self
            .build(cmd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start `{}`", cmd.program))?;

        // Send the input, then close stdin so the child sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            writeln!(stdin, "{input}").context("Failed to write to child stdin")?;
            stdin.flush()?;
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for `{}`", cmd.program))?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: started.elapsed(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_elevated_commands() {
        let plain = CommandSpec::new("dpkg", &["-l"]);
        let root = CommandSpec::new("apt-get", &["clean"]).elevated();
        assert_eq!(plain.to_string(), "dpkg -l");
        assert_eq!(root.to_string(), "sudo apt-get clean");
    }

    #[test]
    fn system_executor_captures_exit_code_and_output() {
        let executor = SystemExecutor::new();

        let ok = executor.exec(&CommandSpec::new("sh", &["-c", "echo hi"])).unwrap();
        assert!(ok.success());
        assert_eq!(ok.stdout.trim(), "hi");

        let failed = executor.exec(&CommandSpec::new("sh", &["-c", "exit 3"])).unwrap();
        assert!(!failed.success());
        assert_eq!(failed.code, Some(3));
    }

    #[test]
    fn missing_binary_is_an_error_not_a_panic() {
        let executor = SystemExecutor::new();
        let result = executor.exec(&CommandSpec::new("sys-clean-no-such-binary", &[] as &[&str]));
        assert!(result.is_err());
    }

    #[test]
    fn input_is_forwarded_to_stdin() {
        let executor = SystemExecutor::new();
        let out = executor
            .exec_with_input(&CommandSpec::new("cat", &[] as &[&str]), "secret")
            .unwrap();
        assert_eq!(out.stdout.trim(), "secret");
    }

    #[test]
    fn non_utf8_arguments_reach_the_command_unchanged() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OsStr::from_bytes(b"junk\xff"));
        std::fs::write(&path, "x").unwrap();

        let executor = SystemExecutor::new();
        let cmd = CommandSpec::new("test", &[OsStr::new("-e"), path.as_os_str()]);
        assert!(executor.exec(&cmd).unwrap().success());
    }
}
