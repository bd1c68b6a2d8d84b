//! Nullable chat platform that records member changes instead of making them.

use async_trait::async_trait;
use peerlink_types::{PlatformUserId, RoleId};
use peerlink_verification::{DirectMessenger, MemberError, MemberManager, Role};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Canned failure modes for one kind of member operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Failure {
    #[default]
    None,
    Forbidden,
    Error,
}

impl Failure {
    fn check(self, what: &str) -> Result<(), MemberError> {
        match self {
            Failure::None => Ok(()),
            Failure::Forbidden => Err(MemberError::Forbidden(format!("missing permission: {what}"))),
            Failure::Error => Err(MemberError::Request(format!("{what} failed"))),
        }
    }
}

/// A guild whose roles are set up by the test.
#[derive(Default)]
pub struct NullMembers {
    roles: Mutex<HashMap<RoleId, Role>>,
    listing_failure: Mutex<Failure>,
    role_failure: Mutex<Failure>,
    nickname_failure: Mutex<Failure>,
    dm_failure: Mutex<Failure>,
    granted: Mutex<Vec<(PlatformUserId, Vec<RoleId>, String)>>,
    nicknames: Mutex<Vec<(PlatformUserId, String)>>,
    messages: Mutex<Vec<(PlatformUserId, String)>>,
    nickname_attempted: AtomicBool,
}

impl NullMembers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role that exists on the guild.
    pub fn with_role(self, id: u64, name: &str) -> Self {
        self.roles.lock().unwrap().insert(
            RoleId::new(id),
            Role {
                id: RoleId::new(id),
                name: name.to_string(),
            },
        );
        self
    }

    /// Make `guild_roles` fail, as when the role list cannot be fetched.
    pub fn fail_role_listing(&self, failure: Failure) {
        *self.listing_failure.lock().unwrap() = failure;
    }

    pub fn fail_roles(&self, failure: Failure) {
        *self.role_failure.lock().unwrap() = failure;
    }

    pub fn fail_nickname(&self, failure: Failure) {
        *self.nickname_failure.lock().unwrap() = failure;
    }

    pub fn fail_messages(&self, failure: Failure) {
        *self.dm_failure.lock().unwrap() = failure;
    }

    /// Every successful `add_roles` call: (user, role ids, audit reason).
    pub fn granted(&self) -> Vec<(PlatformUserId, Vec<RoleId>, String)> {
        self.granted.lock().unwrap().clone()
    }

    /// Every successful nickname change.
    pub fn nicknames(&self) -> Vec<(PlatformUserId, String)> {
        self.nicknames.lock().unwrap().clone()
    }

    /// Whether `set_nickname` was called at all, even if it failed.
    pub fn nickname_attempted(&self) -> bool {
        self.nickname_attempted.load(Ordering::SeqCst)
    }

    /// Every delivered direct message.
    pub fn messages(&self) -> Vec<(PlatformUserId, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MemberManager for NullMembers {
    async fn guild_roles(&self) -> Result<Vec<Role>, MemberError> {
        let failure = *self.listing_failure.lock().unwrap();
        failure.check("list roles")?;
        Ok(self.roles.lock().unwrap().values().cloned().collect())
    }

    async fn add_roles(
        &self,
        user: PlatformUserId,
        roles: &[Role],
        reason: &str,
    ) -> Result<(), MemberError> {
        let failure = *self.role_failure.lock().unwrap();
        failure.check("manage roles")?;
        self.granted.lock().unwrap().push((
            user,
            roles.iter().map(|r| r.id).collect(),
            reason.to_string(),
        ));
        Ok(())
    }

    async fn set_nickname(&self, user: PlatformUserId, nickname: &str) -> Result<(), MemberError> {
        self.nickname_attempted.store(true, Ordering::SeqCst);
        let failure = *self.nickname_failure.lock().unwrap();
        failure.check("manage nicknames")?;
        self.nicknames
            .lock()
            .unwrap()
            .push((user, nickname.to_string()));
        Ok(())
    }
}

#[async_trait]
impl DirectMessenger for NullMembers {
    async fn send_direct_message(
        &self,
        user: PlatformUserId,
        content: &str,
    ) -> Result<(), MemberError> {
        let failure = *self.dm_failure.lock().unwrap();
        failure.check("send messages")?;
        self.messages
            .lock()
            .unwrap()
            .push((user, content.to_string()));
        Ok(())
    }
}
