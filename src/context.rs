use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::external::ExternalCli;

mod paths {
    pub const AWS_DIR: &str = ".aws";
    pub const ROLES_FILE: &str = "roles";
}

/// Everything an invocation needs from its environment, resolved once at
/// start-up.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    home: PathBuf,
    shell: Option<String>,
    aws_cli: ExternalCli,
}

impl InvocationContext {
    pub fn new<P: Into<PathBuf>>(home: P, shell: Option<String>, aws_cli: ExternalCli) -> Self {
        InvocationContext {
            home: home.into(),
            shell,
            aws_cli,
        }
    }

    /// Reads `HOME` and `SHELL`. `HOME` is mandatory; `SHELL` is only needed
    /// once a profile is activated.
    pub fn from_env(aws_cli: ExternalCli) -> Result<Self> {
        let home = env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or(Error::MissingEnv("HOME"))?;
        let shell = env::var("SHELL").ok().filter(|s| !s.is_empty());
        Ok(InvocationContext::new(home, shell, aws_cli))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn aws_dir(&self) -> PathBuf {
        self.home.join(paths::AWS_DIR)
    }

    pub fn roles_path(&self) -> PathBuf {
        self.aws_dir().join(paths::ROLES_FILE)
    }

    pub fn shell(&self) -> Result<&str> {
        self.shell.as_deref().ok_or(Error::MissingEnv("SHELL"))
    }

    pub fn aws_cli(&self) -> &ExternalCli {
        &self.aws_cli
    }
}
