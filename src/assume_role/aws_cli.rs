use async_trait::async_trait;
use tracing::{debug, info};

use assume_role_schema::credentials::{AssumeRoleOutput, TemporaryCredentials};

use crate::assume_role::{defaults, AssumeRole};
use crate::error::{Error, Result};
use crate::external::ExternalCli;
use crate::mfa::ReadMfaToken;
use crate::role::RoleDefinition;

/// Exchanges a role definition for temporary credentials through
/// `aws sts assume-role`.
pub struct AwsCliAssumeRole {
    cli: ExternalCli,
}

impl AwsCliAssumeRole {
    pub fn new(cli: ExternalCli) -> Self {
        AwsCliAssumeRole { cli }
    }
}

fn assume_role_args(role: &RoleDefinition, token_code: Option<String>) -> Vec<String> {
    let mut args = [
        "sts",
        "assume-role",
        "--profile",
        role.iam_profile(),
        "--output",
        "json",
        "--role-arn",
        role.role_arn(),
        "--role-session-name",
        defaults::ROLE_SESSION_NAME,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect::<Vec<_>>();

    if let (Some(serial), Some(code)) = (role.mfa_serial(), token_code) {
        args.extend([
            "--serial-number".to_string(),
            serial.to_string(),
            "--token-code".to_string(),
            code,
        ]);
    }

    args
}

#[async_trait]
impl AssumeRole for AwsCliAssumeRole {
    async fn assume_role<R: ReadMfaToken + Send + Sync>(
        &self,
        role: &RoleDefinition,
        mfa_reader: &R,
    ) -> Result<TemporaryCredentials> {
        let token_code = match role.mfa_serial() {
            Some(serial) => Some(mfa_reader.read_mfa_token(serial).await?),
            None => None,
        };

        info!("assuming {} via profile {}", role.role_arn(), role.iam_profile());
        let stdout = self
            .cli
            .run(assume_role_args(role, token_code))
            .await
            .map_err(|source| Error::Broker {
                role: role.name().to_string(),
                source,
            })?;

        let output = AssumeRoleOutput::from_slice(&stdout).map_err(|source| Error::BrokerDecode {
            role: role.name().to_string(),
            source,
        })?;

        debug!(
            "received credentials for {} expiring at {}",
            role.name(),
            output.credentials.expiration()
        );
        Ok(output.credentials)
    }
}
