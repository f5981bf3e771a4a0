use std::io::IsTerminal;

use crate::executor::{CommandSpec, Executor};

/// How privileged commands will be run for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Already running as root.
    Root,
    /// `sudo` credentials are cached.
    Sudo,
    /// No way to elevate; privileged commands will fail individually.
    Unavailable,
}

impl Privilege {
    pub fn is_elevated(self) -> bool {
        self != Privilege::Unavailable
    }
}

pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Make sure privileged commands can run, caching `sudo` credentials if needed.
///
/// Never fails: an unavailable or declined elevation is reported as
/// [`Privilege::Unavailable`] and the session carries on.
pub fn ensure_elevated<E: Executor>(executor: &E) -> Privilege {
    if is_root() {
        return Privilege::Root;
    }
    acquire(executor, std::io::stdin().is_terminal(), prompt_password)
}

fn prompt_password() -> Option<String> {
    let user = std::env::var("USER").unwrap_or_else(|_| "user".to_string());
    rpassword::prompt_password(format!("[sudo] password for {user}: ")).ok()
}

fn acquire<E, F>(executor: &E, interactive: bool, prompt: F) -> Privilege
where
    E: Executor,
    F: FnOnce() -> Option<String>,
{
    // Credentials may already be cached from an earlier sudo call
    let cached = executor.exec(&CommandSpec::new("sudo", &["-n", "-v"]));
    match cached {
        Ok(out) if out.success() => {
            log::debug!("sudo credentials already cached");
            return Privilege::Sudo;
        }
        Ok(_) => {}
        Err(e) => {
            log::warn!("sudo is not available: {e:#}");
            return Privilege::Unavailable;
        }
    }

    if !interactive {
        log::warn!("no terminal to prompt for a sudo password; continuing unprivileged");
        return Privilege::Unavailable;
    }

    let Some(password) = prompt() else {
        return Privilege::Unavailable;
    };

    // Format the sudo command to suppress password prompt text
    let validate = CommandSpec::new("sudo", &["-S", "-p", "", "-v"]);
    match executor.exec_with_input(&validate, &password) {
        Ok(out) if out.success() => Privilege::Sudo,
        Ok(_) => {
            log::warn!("sudo rejected the password; continuing unprivileged");
            Privilege::Unavailable
        }
        Err(e) => {
            log::warn!("sudo failed: {e:#}");
            Privilege::Unavailable
        }
    }
}
