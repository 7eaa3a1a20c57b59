use std::ffi::OsStr;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::ExternalError;

pub mod defaults {
    pub const PROGRAM: &str = "aws";
}

/// The external cloud CLI every credential exchange and profile write goes
/// through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCli {
    program: String,
    leading_args: Vec<String>,
}

impl ExternalCli {
    pub fn new<S: Into<String>>(program: S) -> ExternalCli {
        ExternalCli {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Splits a command line such as `aws --no-cli-pager` on whitespace.
    pub fn from_command_line(line: &str) -> Option<ExternalCli> {
        let mut words = line.split_whitespace().map(|w| w.to_string());
        let program = words.next()?;
        Some(ExternalCli {
            program,
            leading_args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the CLI to completion and returns its stdout.
    ///
    /// stderr is inherited so the user sees the tool's own diagnostics.
    /// `AWS_PROFILE` is removed from the child's environment.
    pub async fn run<I, S>(&self, args: I) -> Result<Vec<u8>, ExternalError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect::<Vec<_>>();
        let command = self.describe(&args);
        debug!("running: {}", command);

        let child = Command::new(&self.program)
            .args(&self.leading_args)
            .args(&args)
            .env_remove("AWS_PROFILE")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| ExternalError::Spawn {
                command: command.clone(),
                source,
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ExternalError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(ExternalError::Exit {
                command,
                code: output.status.code(),
            })
        }
    }

    // Only the subcommand words are named; later arguments may carry secrets.
    fn describe<S: AsRef<OsStr>>(&self, args: &[S]) -> String {
        let mut words = vec![self.program.clone()];
        words.extend(
            args.iter()
                .take(2)
                .map(|a| a.as_ref().to_string_lossy().into_owned()),
        );
        words.join(" ")
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::testing::FakeAwsCli;

    #[test]
    fn parses_command_line() {
        let cli = ExternalCli::from_command_line("  aws --no-cli-pager ").unwrap();
        assert_eq!(cli.program(), "aws");
        assert_eq!(cli.leading_args, vec!["--no-cli-pager".to_string()]);
        assert!(ExternalCli::from_command_line("   ").is_none());
    }

    #[test]
    fn description_omits_values() {
        let cli = ExternalCli::new("aws");
        let described = cli.describe(&["configure", "set", "profile.p.aws_secret_access_key", "s3cr3t"]);
        assert_eq!(described, "aws configure set");
    }

    #[tokio::test]
    async fn captures_stdout() {
        let fake = FakeAwsCli::builder().sts_stdout("{\"ok\":true}").build();
        let out = fake.cli().run(["sts", "assume-role"]).await.unwrap();
        assert_eq!(out, b"{\"ok\":true}");
        assert_eq!(fake.calls(), vec!["sts assume-role".to_string()]);
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_with_code() {
        let fake = FakeAwsCli::builder().sts_exit(3).build();
        let err = fake.cli().run(["sts", "assume-role"]).await.unwrap_err();
        assert_eq!(err.code(), Some(3));
        assert!(err.to_string().contains("status 3"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let cli = ExternalCli::new("/nonexistent/assume-role-test/aws");
        let err = cli.run(["sts"]).await.unwrap_err();
        assert!(matches!(err, ExternalError::Spawn { .. }));
        assert_eq!(err.code(), None);
    }
}
