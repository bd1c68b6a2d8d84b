//! Welcome message for members who just joined.

use peerlink_types::PlatformUserId;

use crate::member::{DirectMessenger, MemberError};

pub const WELCOME_MESSAGE: &str = "Welcome to the School 21 Discord server!\n\n\
To get access to the server, please verify your School 21 account \
by using the `/verify` command in the server and entering your School 21 login.";

/// A member who just joined the guild.
#[derive(Clone, Debug)]
pub struct NewMember {
    pub user: PlatformUserId,
    pub username: String,
}

/// DM verification instructions to a new member.
///
/// Fire-and-forget: delivery failures are logged and otherwise ignored.
pub async fn on_new_member(messenger: &dyn DirectMessenger, member: &NewMember) {
    match messenger.send_direct_message(member.user, WELCOME_MESSAGE).await {
        Ok(()) => tracing::debug!(user = %member.user, "sent welcome message"),
        Err(MemberError::Forbidden(_)) => {
            tracing::warn!(username = %member.username, "cannot send DM to new member")
        }
        Err(e) => {
            tracing::error!(username = %member.username, error = %e, "failed to send welcome message")
        }
    }
}
