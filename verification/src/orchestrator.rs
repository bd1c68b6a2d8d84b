//! Verification orchestrator: runs one verification attempt end to end.

use std::sync::Arc;

use tracing::Instrument;

use peerlink_directory::Directory;
use peerlink_store::{IdentityStore, StoreError};
use peerlink_types::{ExternalLogin, PlatformUserId, VerifiedIdentity};

use crate::coalition::match_coalition;
use crate::error::VerificationError;
use crate::member::{MemberError, MemberManager, Role};
use crate::outcome::{
    VerifyOutcome, VerifyResult, LOGIN_TAKEN_MSG, PERSIST_FAILED_MSG, ROLE_FAILED_MSG,
    ROLE_FORBIDDEN_MSG, STORE_UNAVAILABLE_MSG,
};
use crate::roles::RoleConfig;

/// Audit-log reason attached to role grants.
pub const AUDIT_REASON: &str = "School 21 verification";

/// One `/verify` invocation.
#[derive(Clone, Debug)]
pub struct VerifyRequest {
    pub user: PlatformUserId,
    /// Requester's current display name, for logs.
    pub display_name: String,
    /// The login as typed by the requester.
    pub claimed_login: String,
}

/// Owns the identity store and the role configuration. The directory and
/// the member-management capability are passed in per call.
///
/// Store calls run inline on the calling task. Each is a single-key LMDB
/// read or one small write transaction.
pub struct VerificationService {
    store: Arc<dyn IdentityStore>,
    roles: RoleConfig,
}

impl VerificationService {
    pub fn new(store: Arc<dyn IdentityStore>, roles: RoleConfig) -> Self {
        Self { store, roles }
    }

    pub fn roles(&self) -> &RoleConfig {
        &self.roles
    }

    /// The stored link for `user`, if any.
    pub fn lookup(&self, user: PlatformUserId) -> Result<Option<VerifiedIdentity>, VerificationError> {
        Ok(self.store.find_by_platform_id(user)?)
    }

    /// Run one verification attempt. Never fails; every problem becomes a
    /// non-success [`VerifyResult`].
    pub async fn verify(
        &self,
        directory: &dyn Directory,
        members: &dyn MemberManager,
        request: &VerifyRequest,
    ) -> VerifyResult {
        let span = tracing::info_span!(
            "verify",
            user = %request.user,
            login = %request.claimed_login.trim()
        );
        let result = self.run(directory, members, request).instrument(span).await;
        tracing::debug!(user = %request.user, outcome = %result.outcome, "verification finished");
        result
    }

    async fn run(
        &self,
        directory: &dyn Directory,
        members: &dyn MemberManager,
        request: &VerifyRequest,
    ) -> VerifyResult {
        match self.store.find_by_platform_id(request.user) {
            Ok(Some(existing)) => {
                return VerifyResult::already_verified(existing.external_login.as_str());
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to read identity store");
                return VerifyResult::rejected(VerifyOutcome::StoreUnavailable, STORE_UNAVAILABLE_MSG);
            }
        }

        let login = match ExternalLogin::parse(&request.claimed_login) {
            Ok(login) => login,
            Err(e) => {
                tracing::info!(error = %e, "rejected malformed login");
                return VerifyResult::not_found(request.claimed_login.trim());
            }
        };

        match self.store.login_is_taken(&login) {
            Ok(true) => {
                return VerifyResult::rejected(VerifyOutcome::LoginTaken, LOGIN_TAKEN_MSG);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to read identity store");
                return VerifyResult::rejected(VerifyOutcome::StoreUnavailable, STORE_UNAVAILABLE_MSG);
            }
        }

        if !directory.participant_exists(login.as_str()).await {
            return VerifyResult::not_found(login.as_str());
        }

        let coalition = directory.get_coalition_name(login.as_str()).await;
        let category = coalition.as_deref().and_then(match_coalition);
        tracing::debug!(coalition = ?coalition, category = ?category, "directory lookup done");

        let roles = match self.resolve_roles(members, category).await {
            Ok(roles) => roles,
            Err(e) => return role_failure(e),
        };
        if !roles.is_empty() {
            if let Err(e) = members.add_roles(request.user, &roles, AUDIT_REASON).await {
                return role_failure(e);
            }
        }

        if let Err(e) = members.set_nickname(request.user, login.as_str()).await {
            match e {
                MemberError::Forbidden(_) => tracing::warn!(
                    member = %request.display_name,
                    "cannot change nickname - insufficient permissions"
                ),
                _ => tracing::error!(error = %e, "failed to change nickname"),
            }
        }

        // Roles and nickname stay applied even if this write fails.
        match self.store.upsert(request.user, &login, coalition.as_deref()) {
            Ok(_) => {}
            Err(StoreError::Duplicate(detail)) => {
                tracing::warn!(%detail, "login was claimed concurrently");
                return VerifyResult::rejected(VerifyOutcome::LoginTaken, LOGIN_TAKEN_MSG);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save verified user");
                return VerifyResult::rejected(VerifyOutcome::PersistFailed, PERSIST_FAILED_MSG);
            }
        }

        tracing::info!(
            member = %request.display_name,
            coalition = coalition.as_deref().unwrap_or("-"),
            "user verified"
        );
        let role_names = roles.into_iter().map(|r| r.name).collect();
        VerifyResult::verified(login.as_str(), role_names, coalition)
    }

    /// Base role then coalition role, skipping unset and unknown ones.
    ///
    /// A failed role listing is an error, not "every role is missing".
    async fn resolve_roles(
        &self,
        members: &dyn MemberManager,
        category: Option<crate::GroupCategory>,
    ) -> Result<Vec<Role>, MemberError> {
        let mut wanted = Vec::with_capacity(2);
        wanted.extend(self.roles.base_role());
        if let Some(id) = category.and_then(|c| self.roles.group_role(c)) {
            if !wanted.contains(&id) {
                wanted.push(id);
            }
        }
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let available = members.guild_roles().await?;
        let mut roles = Vec::with_capacity(wanted.len());
        for id in wanted {
            match available.iter().find(|r| r.id == id) {
                Some(role) => roles.push(role.clone()),
                None => tracing::warn!(role = %id, "configured role does not exist, skipping"),
            }
        }
        Ok(roles)
    }
}

fn role_failure(e: MemberError) -> VerifyResult {
    match e {
        MemberError::Forbidden(_) => {
            tracing::warn!(error = %e, "not allowed to assign roles");
            VerifyResult::rejected(VerifyOutcome::RoleAssignmentForbidden, ROLE_FORBIDDEN_MSG)
        }
        _ => {
            tracing::error!(error = %e, "failed to assign roles");
            VerifyResult::rejected(VerifyOutcome::RoleAssignmentFailed, ROLE_FAILED_MSG)
        }
    }
}
