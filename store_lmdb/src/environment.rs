//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use peerlink_types::{Clock, SystemClock};

use crate::identity::LmdbIdentityStore;
use crate::LmdbError;

/// Primary identity table: `user_id (u64 BE) -> bincode(VerifiedIdentity)`.
pub(crate) const IDENTITIES_DB: &str = "identities";
/// Unique login index: `login bytes -> user_id (u64 BE)`.
pub(crate) const LOGINS_DB: &str = "identity_logins";

/// Default map size: plenty for a few million identities.
pub const DEFAULT_MAP_SIZE: usize = 64 * 1024 * 1024;

const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    path: PathBuf,
    identities_db: Database<Bytes, Bytes>,
    logins_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    ///
    /// Creates the directory and every table if missing.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process per path and
        // never mapped twice concurrently from this process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let identities_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some(IDENTITIES_DB))?;
        let logins_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some(LOGINS_DB))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), "opened LMDB environment");

        Ok(Self {
            env: Arc::new(env),
            path: path.to_path_buf(),
            identities_db,
            logins_db,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// Identity store stamping records with wall-clock time.
    pub fn identity_store(&self) -> LmdbIdentityStore {
        self.identity_store_with_clock(Arc::new(SystemClock))
    }

    /// Identity store stamping records with the given clock.
    pub fn identity_store_with_clock(&self, clock: Arc<dyn Clock>) -> LmdbIdentityStore {
        LmdbIdentityStore {
            env: self.env.clone(),
            identities_db: self.identities_db,
            logins_db: self.logins_db,
            clock,
        }
    }
}
