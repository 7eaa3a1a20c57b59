use std::io;
use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a single external `aws` invocation.
#[derive(Debug, thiserror::Error)]
pub enum ExternalError {
    #[error("could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {}", describe_code(.code))]
    Exit { command: String, code: Option<i32> },
}

impl ExternalError {
    /// Exit code of the collaborator, if it ran and exited normally.
    pub fn code(&self) -> Option<i32> {
        match self {
            ExternalError::Exit { code, .. } => *code,
            ExternalError::Spawn { .. } => None,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    code.map(|c| format!("status {}", c))
        .unwrap_or_else(|| "a signal".to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("could not read {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{role} not in {}", .path.display())]
    RoleNotFound { role: String, path: PathBuf },

    #[error("no session recorded for {role}")]
    SessionNotFound { role: String },

    #[error("session record {} is unreadable: {reason}", .path.display())]
    SessionCorrupt { path: PathBuf, reason: String },

    #[error("could not record session for {role}: {source}")]
    SessionWrite {
        role: String,
        #[source]
        source: io::Error,
    },

    #[error("could not read MFA code: {0}")]
    MfaToken(String),

    #[error("assume-role for {role} failed: {source}")]
    Broker {
        role: String,
        #[source]
        source: ExternalError,
    },

    #[error("assume-role for {role}: response decode failed: {source}")]
    BrokerDecode {
        role: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not set {key} for profile {profile}: {source}")]
    Profile {
        profile: String,
        key: &'static str,
        #[source]
        source: ExternalError,
    },

    #[error("could not start {shell}: {source}")]
    Activate {
        shell: String,
        #[source]
        source: nix::Error,
    },

    #[error("invalid shell path {shell}")]
    InvalidShell { shell: String },
}

impl Error {
    /// Process exit status for this failure.
    ///
    /// A collaborator that exited non-zero has its own status passed through;
    /// every other failure maps to 1.
    pub fn exit_code(&self) -> u8 {
        let passthrough = match self {
            Error::Broker { source, .. } | Error::Profile { source, .. } => source.code(),
            _ => None,
        };

        passthrough
            .and_then(|c| u8::try_from(c).ok())
            .filter(|&c| c != 0)
            .unwrap_or(1)
    }
}
