//! Group/chat primitives (`spec.md` §6, §4.9 "Teams chat"). The teams
//! subsystem never touches group persistence directly — it asks the host
//! for a bounded page of the caller's own groups and writes through
//! `channel_message_send`.

use async_trait::async_trait;
use pamlogix_core::{GroupId, PamlogixError, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMembershipState {
    SuperAdmin,
    Admin,
    Member,
    JoinRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembership {
    pub group_id: GroupId,
    pub state: GroupMembershipState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupsListPage {
    pub memberships: Vec<GroupMembership>,
    pub cursor: Option<String>,
}

#[async_trait]
pub trait Groups: Send + Sync {
    async fn user_groups_list(
        &self,
        user_id: &UserId,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<GroupsListPage, PamlogixError>;

    async fn channel_id_build(&self, group_id: &GroupId) -> Result<String, PamlogixError>;

    async fn channel_message_send(
        &self,
        channel_id: &str,
        sender: &UserId,
        content: &str,
    ) -> Result<(), PamlogixError>;
}
