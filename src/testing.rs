//! Test doubles shared by the unit tests.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::external::ExternalCli;

pub const PROD_RESPONSE: &str = r#"{"Credentials":{"AccessKeyId":"AKIAEXAMPLE","SecretAccessKey":"s3cr3t","SessionToken":"tok","Expiration":"2030-01-01T00:00:00Z"}}"#;

/// A shell script standing in for `aws`.
///
/// Every invocation appends its arguments as one line to a log file.
/// `sts ...` prints the configured stdout and exits with the configured
/// status; `configure set <key> ...` fails when `<key>` ends with the
/// configured setting name.
pub struct FakeAwsCli {
    dir: TempDir,
    log: PathBuf,
    cli: ExternalCli,
}

#[derive(Default)]
pub struct FakeAwsCliBuilder {
    sts_stdout: Option<String>,
    sts_exit: i32,
    fail_setting: Option<String>,
}

impl FakeAwsCliBuilder {
    pub fn sts_stdout(mut self, stdout: &str) -> Self {
        self.sts_stdout = Some(stdout.to_string());
        self
    }

    pub fn sts_exit(mut self, code: i32) -> Self {
        self.sts_exit = code;
        self
    }

    pub fn fail_setting(mut self, key: &str) -> Self {
        self.fail_setting = Some(key.to_string());
        self
    }

    pub fn build(self) -> FakeAwsCli {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let script = dir.path().join("aws.sh");

        let stdout = self.sts_stdout.unwrap_or_else(|| PROD_RESPONSE.to_string());
        let fail_case = self
            .fail_setting
            .map(|key| {
                format!(
                    "    case \"$3\" in *.{key}) echo \"cannot write $3\" >&2; exit 255 ;; esac\n"
                )
            })
            .unwrap_or_default();

        let body = format!(
            "#!/bin/sh\n\
             printf '%s\\n' \"$*\" >> '{log}'\n\
             case \"$1\" in\n\
             sts)\n    printf '%s' '{stdout}'\n    exit {exit}\n    ;;\n\
             configure)\n{fail_case}    ;;\n\
             esac\n",
            log = log.display(),
            stdout = stdout,
            exit = self.sts_exit,
            fail_case = fail_case,
        );
        fs::write(&script, body).unwrap();

        // Run through `sh` so the script never needs its exec bit set.
        let cli = ExternalCli::from_command_line(&format!("sh {}", script.display())).unwrap();
        FakeAwsCli { dir, log, cli }
    }
}

impl FakeAwsCli {
    pub fn builder() -> FakeAwsCliBuilder {
        FakeAwsCliBuilder::default()
    }

    pub fn cli(&self) -> &ExternalCli {
        &self.cli
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Argument lists of every call so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .map(|s| s.lines().map(|l| l.to_string()).collect())
            .unwrap_or_default()
    }
}

/// Writes `contents` to `<home>/.aws/roles`.
pub fn write_roles(home: &Path, contents: &str) -> PathBuf {
    let aws_dir = home.join(".aws");
    fs::create_dir_all(&aws_dir).unwrap();
    let path = aws_dir.join("roles");
    fs::write(&path, contents).unwrap();
    path
}
