//! Discord REST client.
//!
//! Only the handful of endpoints the bot needs: role lookup and grant,
//! nickname change, direct messages, command registration and editing a
//! deferred interaction response.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use peerlink_types::{PlatformUserId, RoleId};
use peerlink_verification::{DirectMessenger, MemberError, MemberManager, Role};

use crate::DiscordError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const AUDIT_LOG_HEADER: &str = "X-Audit-Log-Reason";

#[derive(Debug, Deserialize)]
struct RoleObject {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChannelObject {
    id: String,
}

/// Bot-authenticated client for one application.
pub struct DiscordRest {
    http: reqwest::Client,
    api_base: String,
    token: String,
    application_id: u64,
}

impl DiscordRest {
    pub fn new(api_base: &str, token: &str, application_id: u64) -> Result<Self, DiscordError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DiscordError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            application_id,
        })
    }

    pub fn application_id(&self) -> u64 {
        self.application_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
    }

    /// Send and map non-2xx statuses onto [`DiscordError`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, DiscordError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::FORBIDDEN => DiscordError::Forbidden(body),
            StatusCode::NOT_FOUND => DiscordError::NotFound(body),
            _ => DiscordError::Status {
                status: status.as_u16(),
                body,
            },
        })
    }

    /// `GET /guilds/{guild}/roles`
    pub async fn guild_roles(&self, guild: u64) -> Result<Vec<Role>, DiscordError> {
        let request = self.authorized(self.http.get(self.url(&format!("/guilds/{guild}/roles"))));
        let roles: Vec<RoleObject> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| DiscordError::InvalidResponse(format!("guild roles: {e}")))?;
        Ok(roles
            .into_iter()
            .filter_map(|r| {
                let id = r.id.parse().ok()?;
                Some(Role {
                    id: RoleId::new(id),
                    name: r.name,
                })
            })
            .collect())
    }

    /// `PUT /guilds/{guild}/members/{user}/roles/{role}`
    pub async fn add_member_role(
        &self,
        guild: u64,
        user: PlatformUserId,
        role: RoleId,
        reason: &str,
    ) -> Result<(), DiscordError> {
        let url = self.url(&format!("/guilds/{guild}/members/{user}/roles/{role}"));
        let request = self
            .authorized(self.http.put(url))
            .header(AUDIT_LOG_HEADER, reason);
        self.send(request).await?;
        Ok(())
    }

    /// `PATCH /guilds/{guild}/members/{user}`
    pub async fn modify_nickname(
        &self,
        guild: u64,
        user: PlatformUserId,
        nickname: &str,
    ) -> Result<(), DiscordError> {
        let url = self.url(&format!("/guilds/{guild}/members/{user}"));
        let request = self
            .authorized(self.http.patch(url))
            .json(&json!({ "nick": nickname }));
        self.send(request).await?;
        Ok(())
    }

    /// Open (or reuse) the DM channel with `user` and post `content` to it.
    pub async fn send_dm(&self, user: PlatformUserId, content: &str) -> Result<(), DiscordError> {
        let request = self
            .authorized(self.http.post(self.url("/users/@me/channels")))
            .json(&json!({ "recipient_id": user.to_string() }));
        let channel: ChannelObject = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| DiscordError::InvalidResponse(format!("dm channel: {e}")))?;

        let request = self
            .authorized(
                self.http
                    .post(self.url(&format!("/channels/{}/messages", channel.id))),
            )
            .json(&json!({ "content": content }));
        self.send(request).await?;
        Ok(())
    }

    /// Replace the content of a deferred interaction response.
    pub async fn edit_original_response(
        &self,
        interaction_token: &str,
        content: &str,
    ) -> Result<(), DiscordError> {
        let url = self.url(&format!(
            "/webhooks/{}/{interaction_token}/messages/@original",
            self.application_id
        ));
        let request = self.http.patch(url).json(&json!({ "content": content }));
        self.send(request).await?;
        Ok(())
    }

    /// Bulk-overwrite the application's commands. Guild-scoped when `guild`
    /// is set, global otherwise. Returns how many commands Discord accepted.
    pub async fn register_commands(
        &self,
        guild: Option<u64>,
        commands: &Value,
    ) -> Result<usize, DiscordError> {
        let path = match guild {
            Some(guild) => format!("/applications/{}/guilds/{guild}/commands", self.application_id),
            None => format!("/applications/{}/commands", self.application_id),
        };
        let request = self.authorized(self.http.put(self.url(&path))).json(commands);
        let registered: Vec<Value> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| DiscordError::InvalidResponse(format!("commands: {e}")))?;
        Ok(registered.len())
    }

    /// Member management scoped to one guild.
    pub fn for_guild(self: &Arc<Self>, guild: u64) -> GuildMembers {
        GuildMembers {
            rest: Arc::clone(self),
            guild,
        }
    }
}

#[async_trait]
impl DirectMessenger for DiscordRest {
    async fn send_direct_message(
        &self,
        user: PlatformUserId,
        content: &str,
    ) -> Result<(), MemberError> {
        Ok(self.send_dm(user, content).await?)
    }
}

/// [`MemberManager`] for a single guild.
pub struct GuildMembers {
    rest: Arc<DiscordRest>,
    guild: u64,
}

#[async_trait]
impl MemberManager for GuildMembers {
    async fn guild_roles(&self) -> Result<Vec<Role>, MemberError> {
        self.rest.guild_roles(self.guild).await.map_err(|e| {
            tracing::error!(guild = self.guild, error = %e, "failed to list guild roles");
            MemberError::from(e)
        })
    }

    async fn add_roles(
        &self,
        user: PlatformUserId,
        roles: &[Role],
        reason: &str,
    ) -> Result<(), MemberError> {
        for role in roles {
            self.rest
                .add_member_role(self.guild, user, role.id, reason)
                .await?;
        }
        Ok(())
    }

    async fn set_nickname(&self, user: PlatformUserId, nickname: &str) -> Result<(), MemberError> {
        Ok(self.rest.modify_nickname(self.guild, user, nickname).await?)
    }
}
