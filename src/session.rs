use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};

const SESSION_FILE_PREFIX: &str = "session.new.";

/// What was recorded for a role on its last refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub expiration: DateTime<Utc>,
    /// Profile the credentials were written to. Absent in records written
    /// before the profile was stored.
    pub profile: Option<String>,
}

/// Per-role expiration timestamps, one small file per role.
///
/// Each file holds the expiration as Unix seconds on the first line and the
/// profile name on the second, and is overwritten on every refresh.
#[derive(Debug, Clone)]
pub struct SessionCache {
    dir: PathBuf,
}

impl SessionCache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> SessionCache {
        SessionCache { dir: dir.into() }
    }

    /// Role names are arbitrary YAML keys; they are encoded so each maps to a
    /// single file directly inside the cache directory.
    pub fn path_for(&self, role: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", SESSION_FILE_PREFIX, file_component(role)))
    }

    pub async fn record_session(
        &self,
        role: &str,
        profile: &str,
        expiration: DateTime<Utc>,
    ) -> Result<()> {
        let path = self.path_for(role);
        debug!("recording session for {} in {}", role, path.display());

        let contents = format!("{}\n{}\n", expiration.timestamp(), profile);
        let write = async {
            fs::create_dir_all(&self.dir).await?;
            fs::write(&path, contents).await
        };
        write.await.map_err(|source| Error::SessionWrite {
            role: role.to_string(),
            source,
        })
    }

    pub async fn session(&self, role: &str) -> Result<SessionRecord> {
        let path = self.path_for(role);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::SessionNotFound {
                    role: role.to_string(),
                })
            }
            Err(e) => {
                return Err(Error::SessionCorrupt {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let mut lines = contents.lines();
        let seconds = lines
            .next()
            .unwrap_or_default()
            .trim()
            .parse::<i64>()
            .map_err(|e| Error::SessionCorrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        let expiration =
            DateTime::<Utc>::from_timestamp(seconds, 0).ok_or_else(|| Error::SessionCorrupt {
                path,
                reason: format!("timestamp {} out of range", seconds),
            })?;
        let profile = lines
            .next()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(|l| l.to_string());

        Ok(SessionRecord {
            expiration,
            profile,
        })
    }

    pub async fn expiration(&self, role: &str) -> Result<DateTime<Utc>> {
        Ok(self.session(role).await?.expiration)
    }

    /// `expiration - now`. Zero or negative means the session has expired.
    pub async fn remaining_validity(&self, role: &str) -> Result<Duration> {
        self.remaining_validity_at(role, Utc::now()).await
    }

    pub async fn remaining_validity_at(&self, role: &str, now: DateTime<Utc>) -> Result<Duration> {
        Ok(self.expiration(role).await? - now)
    }
}

// Percent-encodes path separators, `%` itself, NUL, and a leading dot.
fn file_component(role: &str) -> String {
    let mut encoded = String::with_capacity(role.len());
    for (i, c) in role.chars().enumerate() {
        match c {
            '/' | '\\' | '%' | '\0' => encoded.push_str(&format!("%{:02X}", c as u32)),
            '.' if i == 0 => encoded.push_str("%2E"),
            c => encoded.push(c),
        }
    }
    encoded
}
