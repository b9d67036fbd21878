//! Administrator checks against live guild data.

use std::{collections::HashMap, sync::Arc};

use {
    async_trait::async_trait,
    serenity::{
        all::{Role, RoleId},
        http::Http,
    },
};

use autodelete_channels::{AdminAuthorizer, Error, Result};

use crate::ids;

/// [`AdminAuthorizer`] that fetches the member and the guild's roles on every
/// call, so permission changes apply immediately.
pub struct DiscordAdminAuthorizer {
    http: Arc<Http>,
}

impl DiscordAdminAuthorizer {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// True if any of `member_roles` carries the ADMINISTRATOR permission.
/// Roles missing from `guild_roles` are skipped.
pub fn any_role_is_admin(member_roles: &[RoleId], guild_roles: &HashMap<RoleId, Role>) -> bool {
    member_roles.iter().any(|id| {
        guild_roles
            .get(id)
            .is_some_and(|role| role.permissions.administrator())
    })
}

#[async_trait]
impl AdminAuthorizer for DiscordAdminAuthorizer {
    async fn is_admin(&self, server_id: &str, user_id: &str) -> Result<bool> {
        let guild = ids::guild_id(server_id)?;
        let user = ids::user_id(user_id)?;

        let member = guild
            .member(&self.http, user)
            .await
            .map_err(|e| Error::external("fetch guild member", e))?;
        let roles = guild
            .roles(&self.http)
            .await
            .map_err(|e| Error::external("fetch guild roles", e))?;

        Ok(any_role_is_admin(&member.roles, &roles))
    }
}
