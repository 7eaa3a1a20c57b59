use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

pub mod load;

/// A named way of reaching a target role, as written in `~/.aws/roles`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleDefinition {
    #[serde(skip)]
    pub name: String,
    #[serde(alias = "iam_profile")]
    pub profile: String,
    pub role: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub mfa: Option<String>,
    #[serde(default, alias = "tmp_profile")]
    pub alias: Option<String>,
}

impl RoleDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The source profile used to call STS.
    pub fn iam_profile(&self) -> &str {
        &self.profile
    }

    pub fn role_arn(&self) -> &str {
        &self.role
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.is_empty())
    }

    pub fn mfa_serial(&self) -> Option<&str> {
        self.mfa.as_deref().filter(|m| !m.is_empty())
    }

    /// Name of the profile the credentials are written to.
    pub fn profile_name(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct RoleRegistry {
    path: PathBuf,
    roles: BTreeMap<String, RoleDefinition>,
}

impl RoleRegistry {
    pub fn new<P: Into<PathBuf>>(path: P, roles: BTreeMap<String, RoleDefinition>) -> Self {
        let roles = roles
            .into_iter()
            .map(|(name, mut role)| {
                role.name = name.clone();
                (name, role)
            })
            .collect();

        RoleRegistry {
            path: path.into(),
            roles,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lookup(&self, name: &str) -> Result<&RoleDefinition> {
        self.roles.get(name).ok_or_else(|| Error::RoleNotFound {
            role: name.to_string(),
            path: self.path.clone(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
