use async_trait::async_trait;
use tracing::{debug, info};

use assume_role_schema::credentials::TemporaryCredentials;

use crate::error::{Error, Result};
use crate::external::ExternalCli;
use crate::profile::{into_settings, Setting, WriteProfile};
use crate::role::RoleDefinition;
use crate::session::SessionCache;

/// Writes credentials with `aws configure set`, one invocation per setting,
/// then records the session expiration.
pub struct AwsCliProfileWriter {
    cli: ExternalCli,
    sessions: SessionCache,
}

impl AwsCliProfileWriter {
    pub fn new(cli: ExternalCli, sessions: SessionCache) -> Self {
        AwsCliProfileWriter { cli, sessions }
    }

    async fn set(&self, profile: &str, key: &'static str, value: &str) -> Result<()> {
        let qualified = format!("profile.{}.{}", profile, key);
        self.cli
            .run(["configure", "set", qualified.as_str(), value])
            .await
            .map_err(|source| Error::Profile {
                profile: profile.to_string(),
                key,
                source,
            })?;
        debug!("set {}", qualified);
        Ok(())
    }
}

#[async_trait]
impl WriteProfile for AwsCliProfileWriter {
    async fn persist(
        &self,
        role: &RoleDefinition,
        credentials: TemporaryCredentials,
    ) -> Result<()> {
        let profile = role.profile_name();
        for Setting { key, value } in into_settings(role, &credentials) {
            if let Some(value) = value {
                self.set(profile, key, &value).await?;
            }
        }

        self.sessions
            .record_session(role.name(), profile, credentials.expiration())
            .await?;
        info!(
            "profile {} holds credentials until {}",
            profile,
            credentials.expiration()
        );
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::testing::FakeAwsCli;

    fn role(alias: Option<&str>, region: Option<&str>) -> RoleDefinition {
        RoleDefinition {
            name: "prod".to_string(),
            profile: "base".to_string(),
            role: "arn:aws:iam::111:role/Admin".to_string(),
            region: region.map(|r| r.to_string()),
            mfa: None,
            alias: alias.map(|a| a.to_string()),
        }
    }

    fn credentials() -> TemporaryCredentials {
        TemporaryCredentials::new(
            "AKIAEXAMPLE",
            "s3cr3t",
            "tok",
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn writes_every_setting_then_records_session() {
        let fake = FakeAwsCli::builder().build();
        let sessions = SessionCache::new(fake.dir().join("home/.aws"));
        let writer = AwsCliProfileWriter::new(fake.cli().clone(), sessions.clone());

        writer
            .persist(&role(None, Some("us-east-1")), credentials())
            .await
            .unwrap();

        assert_eq!(
            fake.calls(),
            vec![
                "configure set profile.prod.region us-east-1",
                "configure set profile.prod.aws_access_key_id AKIAEXAMPLE",
                "configure set profile.prod.aws_secret_access_key s3cr3t",
                "configure set profile.prod.aws_session_token tok",
                "configure set profile.prod.aws_session_expiration 2030-01-01T00:00:00+00:00",
            ]
        );
        let record = sessions.session("prod").await.unwrap();
        assert_eq!(
            record.expiration,
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(record.profile.as_deref(), Some("prod"));
    }

    #[tokio::test]
    async fn alias_names_the_profile_but_not_the_session() {
        let fake = FakeAwsCli::builder().build();
        let sessions = SessionCache::new(fake.dir().join("home/.aws"));
        let writer = AwsCliProfileWriter::new(fake.cli().clone(), sessions.clone());

        writer
            .persist(&role(Some("prod-admin"), None), credentials())
            .await
            .unwrap();

        let calls = fake.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls
            .iter()
            .all(|c| c.starts_with("configure set profile.prod-admin.")));
        let record = sessions.session("prod").await.unwrap();
        assert_eq!(record.profile.as_deref(), Some("prod-admin"));
    }

    #[tokio::test]
    async fn first_failure_aborts_and_leaves_no_session() {
        let fake = FakeAwsCli::builder()
            .fail_setting("aws_secret_access_key")
            .build();
        let sessions = SessionCache::new(fake.dir().join("home/.aws"));
        let writer = AwsCliProfileWriter::new(fake.cli().clone(), sessions.clone());

        let err = writer
            .persist(&role(None, Some("us-east-1")), credentials())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Profile { key: "aws_secret_access_key", .. }
        ));
        assert!(!err.to_string().contains("s3cr3t"));
        assert_eq!(err.exit_code(), 255);
        assert_eq!(fake.calls().len(), 3);
        assert!(matches!(
            sessions.expiration("prod").await,
            Err(Error::SessionNotFound { .. })
        ));
    }
}
