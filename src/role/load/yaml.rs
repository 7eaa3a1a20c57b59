use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::role::load::LoadRoles;
use crate::role::{RoleDefinition, RoleRegistry};

/// Reads the role mapping from a YAML file, `~/.aws/roles` by default.
#[derive(Debug, Clone)]
pub struct YamlRoleLoader {
    path: PathBuf,
}

impl YamlRoleLoader {
    pub fn new<P: Into<PathBuf>>(path: P) -> YamlRoleLoader {
        YamlRoleLoader { path: path.into() }
    }

    fn parse(&self, contents: &str) -> Result<RoleRegistry> {
        if contents.trim().is_empty() {
            return Ok(RoleRegistry::new(&self.path, BTreeMap::new()));
        }

        let roles = serde_yaml::from_str::<BTreeMap<String, RoleDefinition>>(contents).map_err(
            |source| Error::ConfigParse {
                path: self.path.clone(),
                source,
            },
        )?;
        Ok(RoleRegistry::new(&self.path, roles))
    }
}

#[async_trait]
impl LoadRoles for YamlRoleLoader {
    async fn load_roles(&self) -> Result<RoleRegistry> {
        debug!("loading roles from {}", self.path.display());
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| Error::ConfigRead {
                path: self.path.clone(),
                source,
            })?;
        self.parse(&contents)
    }
}
