//! LMDB implementation of IdentityStore.
//!
//! The primary table and the login index are always written in the same
//! write transaction, so the index can never point at a missing record and
//! two concurrent claims on one login resolve as first writer wins. Index
//! keys are case-folded logins; records keep the login as typed.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use peerlink_store::{IdentityStore, StoreError};
use peerlink_types::{Clock, ExternalLogin, PlatformUserId, VerifiedIdentity};

use crate::LmdbError;

pub struct LmdbIdentityStore {
    pub(crate) env: Arc<Env>,
    pub(crate) identities_db: Database<Bytes, Bytes>,
    pub(crate) logins_db: Database<Bytes, Bytes>,
    pub(crate) clock: Arc<dyn Clock>,
}

fn login_key(login: &ExternalLogin) -> Vec<u8> {
    login.index_key().into_bytes()
}

impl LmdbIdentityStore {
    fn read_identity(
        &self,
        txn: &RoTxn,
        user: PlatformUserId,
    ) -> Result<Option<VerifiedIdentity>, LmdbError> {
        match self.identities_db.get(txn, &user.to_key())? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    fn login_owner(
        &self,
        txn: &RoTxn,
        login: &ExternalLogin,
    ) -> Result<Option<PlatformUserId>, LmdbError> {
        match self.logins_db.get(txn, &login_key(login))? {
            Some(bytes) => PlatformUserId::from_key(bytes).map(Some).ok_or_else(|| {
                LmdbError::Corruption(format!("login index entry for {login} is not a user id"))
            }),
            None => Ok(None),
        }
    }

    fn upsert_inner(
        &self,
        user: PlatformUserId,
        login: &ExternalLogin,
        group_label: Option<&str>,
    ) -> Result<VerifiedIdentity, LmdbError> {
        let key = user.to_key();
        let mut wtxn = self.env.write_txn()?;

        if let Some(owner) = self.login_owner(&wtxn, login)? {
            if owner != user {
                // Dropping the txn aborts it.
                return Err(LmdbError::Duplicate(format!(
                    "login {login} is already linked to user {owner}"
                )));
            }
        }

        if let Some(previous) = self.read_identity(&wtxn, user)? {
            if !previous.external_login.same_account(login) {
                self.logins_db
                    .delete(&mut wtxn, &login_key(&previous.external_login))?;
            }
        }

        let identity = VerifiedIdentity {
            platform_user_id: user,
            external_login: login.clone(),
            group_label: group_label.map(str::to_string),
            verified_at: self.clock.now(),
        };
        let bytes = bincode::serialize(&identity)?;
        self.identities_db.put(&mut wtxn, &key, &bytes)?;
        self.logins_db.put(&mut wtxn, &login_key(login), &key)?;
        wtxn.commit()?;
        Ok(identity)
    }

    fn remove_inner(&self, user: PlatformUserId) -> Result<bool, LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let Some(existing) = self.read_identity(&wtxn, user)? else {
            return Ok(false);
        };
        self.identities_db.delete(&mut wtxn, &user.to_key())?;
        if self.login_owner(&wtxn, &existing.external_login)? == Some(user) {
            self.logins_db
                .delete(&mut wtxn, &login_key(&existing.external_login))?;
        }
        wtxn.commit()?;
        Ok(true)
    }
}

impl IdentityStore for LmdbIdentityStore {
    fn initialize(&self) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some(crate::environment::IDENTITIES_DB))
            .map_err(LmdbError::from)?;
        self.env
            .create_database::<Bytes, Bytes>(&mut wtxn, Some(crate::environment::LOGINS_DB))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn upsert(
        &self,
        user: PlatformUserId,
        login: &ExternalLogin,
        group_label: Option<&str>,
    ) -> Result<VerifiedIdentity, StoreError> {
        let identity = self.upsert_inner(user, login, group_label)?;
        tracing::debug!(%user, %login, "identity stored");
        Ok(identity)
    }

    fn find_by_platform_id(
        &self,
        user: PlatformUserId,
    ) -> Result<Option<VerifiedIdentity>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.read_identity(&rtxn, user)?)
    }

    fn find_by_external_login(
        &self,
        login: &ExternalLogin,
    ) -> Result<Option<VerifiedIdentity>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(owner) = self.login_owner(&rtxn, login)? else {
            return Ok(None);
        };
        let identity = self.read_identity(&rtxn, owner)?.ok_or_else(|| {
            LmdbError::Corruption(format!("login {login} indexes missing user {owner}"))
        })?;
        Ok(Some(identity))
    }

    fn remove(&self, user: PlatformUserId) -> Result<bool, StoreError> {
        Ok(self.remove_inner(user)?)
    }

    fn count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.identities_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
