use async_trait::async_trait;

use assume_role_schema::credentials::TemporaryCredentials;

use crate::error::Result;
use crate::mfa::ReadMfaToken;
use crate::role::RoleDefinition;

pub mod aws_cli;

pub mod defaults {
    pub const ROLE_SESSION_NAME: &str = "cli";
}

#[async_trait]
pub trait AssumeRole {
    async fn assume_role<R: ReadMfaToken + Send + Sync>(
        &self,
        role: &RoleDefinition,
        mfa_reader: &R,
    ) -> Result<TemporaryCredentials>;
}
