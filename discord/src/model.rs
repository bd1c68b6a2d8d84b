//! The subset of Discord's interaction payloads the bot reads.
//!
//! Snowflakes arrive as decimal strings.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use peerlink_types::PlatformUserId;

pub const INTERACTION_PING: u8 = 1;
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

#[derive(Clone, Debug, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    /// Continuation token for follow-ups and response edits.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub data: Option<CommandData>,
    /// Set when invoked in a guild.
    #[serde(default)]
    pub member: Option<GuildMember>,
    /// Set when invoked in a DM.
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GuildMember {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub nick: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
    #[serde(default)]
    pub resolved: Option<Resolved>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Resolved {
    #[serde(default)]
    pub users: HashMap<String, User>,
    #[serde(default)]
    pub members: HashMap<String, PartialMember>,
}

/// Member data in `resolved`, which omits the user object.
#[derive(Clone, Debug, Deserialize)]
pub struct PartialMember {
    #[serde(default)]
    pub nick: Option<String>,
}

impl User {
    pub fn platform_id(&self) -> Option<PlatformUserId> {
        self.id.parse().ok()
    }

    fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

impl Interaction {
    /// Whoever ran the command.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Guild nickname, then global name, then username.
    pub fn invoker_display_name(&self) -> String {
        let nick = self.member.as_ref().and_then(|m| m.nick.as_deref());
        match (nick, self.invoker()) {
            (Some(nick), _) => nick.to_string(),
            (None, Some(user)) => user.display_name().to_string(),
            (None, None) => String::new(),
        }
    }

    pub fn guild(&self) -> Option<u64> {
        self.guild_id.as_deref().and_then(|g| g.parse().ok())
    }
}

impl CommandData {
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.value.as_ref())
    }

    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(Value::as_str)
    }

    /// Display name of a user passed as an option, from `resolved`.
    pub fn resolved_display_name(&self, user_id: &str) -> Option<String> {
        let resolved = self.resolved.as_ref()?;
        if let Some(nick) = resolved.members.get(user_id).and_then(|m| m.nick.clone()) {
            return Some(nick);
        }
        resolved
            .users
            .get(user_id)
            .map(|u| u.display_name().to_string())
    }
}
