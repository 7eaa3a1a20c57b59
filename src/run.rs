use std::convert::Infallible;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::assume_role::AssumeRole;
use crate::error::{Error, Result};
use crate::handler::ActivateProfile;
use crate::mfa::ReadMfaToken;
use crate::profile::WriteProfile;
use crate::role::load::LoadRoles;
use crate::session::SessionCache;

/// Where an invocation ended up before the profile is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The recorded session is still valid; nothing was fetched.
    SessionValid {
        profile_name: String,
        remaining: Duration,
    },
    /// Fresh credentials were fetched and written.
    Refreshed {
        profile_name: String,
        expiration: DateTime<Utc>,
    },
}

impl Resolution {
    pub fn profile_name(&self) -> &str {
        match self {
            Resolution::SessionValid { profile_name, .. } => profile_name,
            Resolution::Refreshed { profile_name, .. } => profile_name,
        }
    }
}

pub struct AssumeRoleRunner<L, R, A, W, H> {
    loader: L,
    mfa_reader: R,
    assume_role: A,
    writer: W,
    handler: H,
    sessions: SessionCache,
    force_refresh: bool,
}

impl<L, R, A, W, H> AssumeRoleRunner<L, R, A, W, H>
where
    L: LoadRoles + Send + Sync,
    R: ReadMfaToken + Send + Sync,
    A: AssumeRole + Send + Sync,
    W: WriteProfile + Send + Sync,
    H: ActivateProfile,
{
    pub fn new(
        loader: L,
        mfa_reader: R,
        assume_role: A,
        writer: W,
        handler: H,
        sessions: SessionCache,
    ) -> Self {
        Self {
            loader,
            mfa_reader,
            assume_role,
            writer,
            handler,
            sessions,
            force_refresh: false,
        }
    }

    /// Ignore a still-valid session and always fetch new credentials.
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    /// Runs everything up to, but not including, activation.
    pub async fn resolve(&self, role_name: &str) -> Result<Resolution> {
        let registry = self.loader.load_roles().await?;
        let role = registry.lookup(role_name)?;
        let profile_name = role.profile_name().to_string();
        debug!("target role:{} profile:{}", role.name(), profile_name);

        if let Some(remaining) = self.valid_session(role_name, &profile_name).await {
            info!(
                "session for {} still valid for {}s, reusing profile {}",
                role_name,
                remaining.num_seconds(),
                profile_name
            );
            return Ok(Resolution::SessionValid {
                profile_name,
                remaining,
            });
        }

        let credentials = self
            .assume_role
            .assume_role(role, &self.mfa_reader)
            .await?;
        let expiration = credentials.expiration();
        self.writer.persist(role, credentials).await?;

        Ok(Resolution::Refreshed {
            profile_name,
            expiration,
        })
    }

    /// Resolves the role and hands the profile to the handler. Only returns
    /// on failure.
    pub async fn run(self, role_name: &str) -> Result<Infallible> {
        let resolution = self.resolve(role_name).await?;
        self.handler.activate(resolution.profile_name())
    }

    async fn valid_session(&self, role_name: &str, profile_name: &str) -> Option<Duration> {
        if self.force_refresh {
            debug!("refresh forced for {}", role_name);
            return None;
        }

        let record = match self.sessions.session(role_name).await {
            Ok(record) => record,
            Err(Error::SessionNotFound { .. }) => {
                debug!("no session recorded for {}", role_name);
                return None;
            }
            Err(e) => {
                warn!("ignoring session record: {}", e);
                return None;
            }
        };

        // Records without a profile predate aliases and were keyed by role.
        let recorded_profile = record.profile.as_deref().unwrap_or(role_name);
        if recorded_profile != profile_name {
            info!(
                "session for {} was written to profile {}, not {}, revalidating",
                role_name, recorded_profile, profile_name
            );
            return None;
        }

        let remaining = record.expiration - Utc::now();
        if remaining > Duration::zero() {
            Some(remaining)
        } else {
            info!("session for {} expired, revalidating", role_name);
            None
        }
    }
}
