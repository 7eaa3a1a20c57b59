use std::convert::Infallible;
use std::env;
use std::ffi::CString;

use tracing::debug;

use crate::error::{Error, Result};
use crate::handler::{into_variables, ActivateProfile, Variable};

/// Replaces the current process with the user's shell, profile selected.
pub struct ShellProfileActivator {
    shell: String,
}

impl ShellProfileActivator {
    pub fn new<S: Into<String>>(shell: S) -> Self {
        ShellProfileActivator {
            shell: shell.into(),
        }
    }
}

impl ActivateProfile for ShellProfileActivator {
    fn activate(&self, profile_name: &str) -> Result<Infallible> {
        set_variables(profile_name);
        start_shell_session(&self.shell)
    }
}

fn set_variables(profile_name: &str) {
    for Variable { name, value } in into_variables(profile_name) {
        if let Some(value) = value {
            env::set_var(name, value);
        } else {
            env::remove_var(name);
        }
    }
}

fn start_shell_session(shell: &str) -> Result<Infallible> {
    debug!("shell: {}", shell);

    let path = CString::new(shell).map_err(|_| Error::InvalidShell {
        shell: shell.to_string(),
    })?;
    let args = [path.clone()];
    nix::unistd::execv(&path, &args).map_err(|source| Error::Activate {
        shell: shell.to_string(),
        source,
    })
}
