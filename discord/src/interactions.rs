//! Interactions endpoint.
//!
//! Discord POSTs every slash-command invocation to `/interactions`. Requests
//! are authenticated by signature, answered within Discord's three-second
//! window, and `/verify` is finished in a background task that edits the
//! deferred response.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

use peerlink_directory::Directory;
use peerlink_types::{PlatformUserId, VerifiedIdentity};
use peerlink_verification::{VerificationService, VerifyRequest};

use crate::commands::{self, MYINFO, NOT_VERIFIED_MSG, VERIFY, WHOIS};
use crate::error::DiscordError;
use crate::metrics::BotMetrics;
use crate::model::{
    CommandData, Interaction, User, INTERACTION_APPLICATION_COMMAND, INTERACTION_PING,
};
use crate::rest::DiscordRest;
use crate::signature::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};

const GUILD_ONLY_MSG: &str = "This command can only be used in a server.";
const BAD_OPTIONS_MSG: &str = "Invalid command options.";
const UNKNOWN_COMMAND_MSG: &str = "Unknown command.";
const LOOKUP_FAILED_MSG: &str = "Could not look up verification info. Please try again later.";

/// Everything a request handler needs.
pub struct AppState {
    pub service: Arc<VerificationService>,
    pub directory: Arc<dyn Directory>,
    pub rest: Arc<DiscordRest>,
    pub verifier: SignatureVerifier,
    pub metrics: Arc<BotMetrics>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/interactions", post(handle_interaction))
        .route("/metrics", get(handle_metrics))
        .with_state(state)
}

async fn handle_interaction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let timestamp = headers.get(TIMESTAMP_HEADER).and_then(|v| v.to_str().ok());
    let authentic = match (signature, timestamp) {
        (Some(signature), Some(timestamp)) => state.verifier.verify(timestamp, &body, signature),
        _ => false,
    };
    if !authentic {
        state.metrics.signatures_rejected.inc();
        tracing::debug!("rejected interaction with bad signature");
        return (StatusCode::UNAUTHORIZED, "invalid request signature").into_response();
    }
    state.metrics.interactions_received.inc();

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            tracing::warn!(error = %e, "malformed interaction payload");
            return (StatusCode::BAD_REQUEST, "malformed interaction").into_response();
        }
    };

    match interaction.kind {
        INTERACTION_PING => Json(commands::pong()).into_response(),
        INTERACTION_APPLICATION_COMMAND => {
            Json(dispatch(&state, &interaction).await).into_response()
        }
        other => {
            tracing::debug!(kind = other, "ignoring unsupported interaction type");
            (StatusCode::BAD_REQUEST, "unsupported interaction type").into_response()
        }
    }
}

async fn handle_metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn dispatch(state: &Arc<AppState>, interaction: &Interaction) -> Value {
    let Some(data) = interaction.data.as_ref() else {
        return commands::ephemeral_message(UNKNOWN_COMMAND_MSG);
    };

    let name = match data.name.as_str() {
        VERIFY | WHOIS | MYINFO => data.name.as_str(),
        _ => "unknown",
    };
    state.metrics.commands.with_label_values(&[name]).inc();

    match name {
        VERIFY => start_verify(state, interaction, data),
        WHOIS => whois(state, data).await,
        MYINFO => myinfo(state, interaction).await,
        _ => {
            tracing::warn!(command = %data.name, "unknown command");
            commands::ephemeral_message(UNKNOWN_COMMAND_MSG)
        }
    }
}

/// Defer, then run the workflow and edit the deferred response.
fn start_verify(state: &Arc<AppState>, interaction: &Interaction, data: &CommandData) -> Value {
    let Some(guild) = interaction.guild() else {
        return commands::ephemeral_message(GUILD_ONLY_MSG);
    };
    let (Some(user), Some(login)) = (
        interaction.invoker().and_then(User::platform_id),
        data.string_option("login"),
    ) else {
        return commands::ephemeral_message(BAD_OPTIONS_MSG);
    };

    let request = VerifyRequest {
        user,
        display_name: interaction.invoker_display_name(),
        claimed_login: login.to_string(),
    };
    let token = interaction.token.clone();
    let state = Arc::clone(state);

    tokio::spawn(async move {
        let members = state.rest.for_guild(guild);
        let result = state
            .service
            .verify(state.directory.as_ref(), &members, &request)
            .await;
        state.metrics.record_outcome(result.outcome);

        if let Err(e) = state.rest.edit_original_response(&token, &result.message).await {
            tracing::error!(user = %request.user, error = %e, "failed to deliver verification result");
        }
    });

    commands::deferred_ephemeral()
}

/// Read the stored link on the blocking pool; LMDB reads block the thread.
async fn lookup(
    state: &AppState,
    user: PlatformUserId,
) -> Result<Option<VerifiedIdentity>, DiscordError> {
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || service.lookup(user))
        .await
        .map_err(|e| DiscordError::Lookup(e.to_string()))?
        .map_err(|e| DiscordError::Lookup(e.to_string()))
}

async fn whois(state: &AppState, data: &CommandData) -> Value {
    let Some((target, user)) = data
        .string_option("member")
        .and_then(|id| Some((id, id.parse::<PlatformUserId>().ok()?)))
    else {
        return commands::ephemeral_message(BAD_OPTIONS_MSG);
    };
    let display_name = data
        .resolved_display_name(target)
        .unwrap_or_else(|| target.to_string());

    match lookup(state, user).await {
        Ok(identity) => {
            commands::ephemeral_message(&commands::whois_message(&display_name, identity.as_ref()))
        }
        Err(e) => {
            tracing::error!(%user, error = %e, "whois lookup failed");
            commands::ephemeral_message(LOOKUP_FAILED_MSG)
        }
    }
}

async fn myinfo(state: &AppState, interaction: &Interaction) -> Value {
    let Some(user) = interaction.invoker().and_then(User::platform_id) else {
        return commands::ephemeral_message(BAD_OPTIONS_MSG);
    };

    match lookup(state, user).await {
        Ok(Some(identity)) => commands::myinfo_embed(&identity),
        Ok(None) => commands::ephemeral_message(NOT_VERIFIED_MSG),
        Err(e) => {
            tracing::error!(%user, error = %e, "myinfo lookup failed");
            commands::ephemeral_message(LOOKUP_FAILED_MSG)
        }
    }
}
