//! LMDB storage backend for peerlink.
//!
//! Implements the storage traits from `peerlink-store` using the `heed` LMDB
//! bindings. All tables live in a single environment under the data dir.

pub mod environment;
pub mod error;
pub mod identity;
pub mod integrity;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use identity::LmdbIdentityStore;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
