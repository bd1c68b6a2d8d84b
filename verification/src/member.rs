//! Chat-platform capabilities used by the workflow.

use async_trait::async_trait;
use thiserror::Error;

use peerlink_types::{PlatformUserId, RoleId};

/// A role that exists on the target guild.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum MemberError {
    /// The bot lacks the permission for this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("member not found: {0}")]
    NotFound(String),

    #[error("platform request failed: {0}")]
    Request(String),
}

/// Member management on one guild.
#[async_trait]
pub trait MemberManager: Send + Sync {
    /// Every role currently defined on the guild.
    async fn guild_roles(&self) -> Result<Vec<Role>, MemberError>;

    async fn add_roles(
        &self,
        user: PlatformUserId,
        roles: &[Role],
        reason: &str,
    ) -> Result<(), MemberError>;

    async fn set_nickname(&self, user: PlatformUserId, nickname: &str) -> Result<(), MemberError>;
}

/// Direct-message delivery.
#[async_trait]
pub trait DirectMessenger: Send + Sync {
    async fn send_direct_message(
        &self,
        user: PlatformUserId,
        content: &str,
    ) -> Result<(), MemberError>;
}
