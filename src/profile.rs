use std::borrow::Cow;

use async_trait::async_trait;

use assume_role_schema::credentials::TemporaryCredentials;

use crate::error::Result;
use crate::role::RoleDefinition;

pub mod aws_cli;

pub mod keys {
    pub const REGION: &str = "region";
    pub const ACCESS_KEY_ID: &str = "aws_access_key_id";
    pub const SECRET_ACCESS_KEY: &str = "aws_secret_access_key";
    pub const SESSION_TOKEN: &str = "aws_session_token";
    pub const SESSION_EXPIRATION: &str = "aws_session_expiration";
}

/// Stores credentials under a named profile of the cloud CLI.
///
/// Credentials are taken by value so they are dropped, and wiped, as soon as
/// they have been written.
#[async_trait]
pub trait WriteProfile {
    async fn persist(&self, role: &RoleDefinition, credentials: TemporaryCredentials)
        -> Result<()>;
}

struct Setting<'a> {
    key: &'static str,
    value: Option<Cow<'a, str>>,
}

fn into_settings<'a>(
    role: &'a RoleDefinition,
    credentials: &'a TemporaryCredentials,
) -> Vec<Setting<'a>> {
    fn s<'a>(key: &'static str, value: Option<Cow<'a, str>>) -> Setting<'a> {
        Setting { key, value }
    }

    vec![
        s(keys::REGION, role.region().map(Cow::Borrowed)),
        s(keys::ACCESS_KEY_ID, Some(credentials.access_key_id().into())),
        s(keys::SECRET_ACCESS_KEY, Some(credentials.secret_access_key().into())),
        s(keys::SESSION_TOKEN, Some(credentials.session_token().into())),
        s(
            keys::SESSION_EXPIRATION,
            Some(credentials.expiration().to_rfc3339().into()),
        ),
    ]
}
