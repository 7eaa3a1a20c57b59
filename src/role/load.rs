use async_trait::async_trait;

use crate::error::Result;
use crate::role::RoleRegistry;

pub mod yaml;

#[async_trait]
pub trait LoadRoles {
    async fn load_roles(&self) -> Result<RoleRegistry>;
}
