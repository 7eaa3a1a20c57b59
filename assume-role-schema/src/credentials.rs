use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Output of `aws sts assume-role --output json`.
///
/// Only `Credentials` is read; `AssumedRoleUser` and friends are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssumeRoleOutput {
    pub credentials: TemporaryCredentials,
}

impl AssumeRoleOutput {
    pub fn from_slice(json: &[u8]) -> serde_json::Result<AssumeRoleOutput> {
        serde_json::from_slice(json)
    }
}

/// Short-lived credential set returned by STS. Secrets are wiped on drop.
#[derive(Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "PascalCase")]
pub struct TemporaryCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: String,
    #[zeroize(skip)]
    expiration: DateTime<Utc>,
}

impl TemporaryCredentials {
    pub fn new<S: Into<String>>(
        access_key_id: S,
        secret_access_key: S,
        session_token: S,
        expiration: DateTime<Utc>,
    ) -> TemporaryCredentials {
        TemporaryCredentials {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: session_token.into(),
            expiration,
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}
