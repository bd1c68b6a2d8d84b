//! Verified-identity storage trait.

use peerlink_types::{ExternalLogin, PlatformUserId, VerifiedIdentity};

use crate::StoreError;

/// Durable mapping from platform user to verified learning-platform login.
///
/// Each call is its own transaction. Implementations must keep both the
/// user id and the login unique.
pub trait IdentityStore: Send + Sync {
    /// Ensure the backing tables exist. Idempotent; called on every start.
    fn initialize(&self) -> Result<(), StoreError>;

    /// Insert or fully replace the record for `user`, stamping `verified_at`
    /// with the store clock.
    ///
    /// Returns [`StoreError::Duplicate`] if `login` already belongs to a
    /// different user; the existing record is left untouched.
    fn upsert(
        &self,
        user: PlatformUserId,
        login: &ExternalLogin,
        group_label: Option<&str>,
    ) -> Result<VerifiedIdentity, StoreError>;

    fn find_by_platform_id(
        &self,
        user: PlatformUserId,
    ) -> Result<Option<VerifiedIdentity>, StoreError>;

    fn find_by_external_login(
        &self,
        login: &ExternalLogin,
    ) -> Result<Option<VerifiedIdentity>, StoreError>;

    /// Whether any user has already claimed `login`.
    fn login_is_taken(&self, login: &ExternalLogin) -> Result<bool, StoreError> {
        Ok(self.find_by_external_login(login)?.is_some())
    }

    /// Delete the record for `user`. Returns `false` if there was none.
    fn remove(&self, user: PlatformUserId) -> Result<bool, StoreError>;

    /// Number of stored identities.
    fn count(&self) -> Result<u64, StoreError>;
}
