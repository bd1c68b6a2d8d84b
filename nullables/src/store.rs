//! Nullable identity store: thread-safe in-memory storage for testing.

use peerlink_store::{IdentityStore, StoreError};
use peerlink_types::{Clock, ExternalLogin, PlatformUserId, VerifiedIdentity};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::NullClock;

/// An in-memory identity store with the same uniqueness rules as LMDB,
/// including case-insensitive login collisions.
///
/// Reads and writes can be made to fail to exercise error paths.
pub struct NullIdentityStore {
    records: Mutex<HashMap<PlatformUserId, VerifiedIdentity>>,
    clock: Arc<dyn Clock>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl NullIdentityStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(NullClock::default()))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seed a record directly, bypassing uniqueness checks.
    pub fn insert(&self, identity: VerifiedIdentity) {
        self.records
            .lock()
            .unwrap()
            .insert(identity.platform_user_id, identity);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `upsert` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of all records.
    pub fn records(&self) -> Vec<VerifiedIdentity> {
        self.records.lock().unwrap().values().cloned().collect()
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store: reads disabled".into()));
        }
        Ok(())
    }
}

impl Default for NullIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for NullIdentityStore {
    fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn upsert(
        &self,
        user: PlatformUserId,
        login: &ExternalLogin,
        group_label: Option<&str>,
    ) -> Result<VerifiedIdentity, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store: writes disabled".into()));
        }
        let mut records = self.records.lock().unwrap();
        if let Some(owner) = records
            .values()
            .find(|r| r.external_login.same_account(login) && r.platform_user_id != user)
        {
            return Err(StoreError::Duplicate(format!(
                "login {login} is already linked to user {}",
                owner.platform_user_id
            )));
        }
        let identity = VerifiedIdentity {
            platform_user_id: user,
            external_login: login.clone(),
            group_label: group_label.map(str::to_string),
            verified_at: self.clock.now(),
        };
        records.insert(user, identity.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(identity)
    }

    fn find_by_platform_id(
        &self,
        user: PlatformUserId,
    ) -> Result<Option<VerifiedIdentity>, StoreError> {
        self.check_read()?;
        Ok(self.records.lock().unwrap().get(&user).cloned())
    }

    fn find_by_external_login(
        &self,
        login: &ExternalLogin,
    ) -> Result<Option<VerifiedIdentity>, StoreError> {
        self.check_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.external_login.same_account(login))
            .cloned())
    }

    fn remove(&self, user: PlatformUserId) -> Result<bool, StoreError> {
        Ok(self.records.lock().unwrap().remove(&user).is_some())
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.lock().unwrap().len() as u64)
    }
}
