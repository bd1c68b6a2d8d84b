//! Test doubles for the verification workflow.
//!
//! Each double stands in for one external collaborator and records what it
//! was asked to do, so tests can assert on side effects without a network,
//! a database or a Discord guild. Failure modes are switched on per test.

pub mod clock;
pub mod directory;
pub mod members;
pub mod store;

pub use clock::NullClock;
pub use directory::NullDirectory;
pub use members::{Failure, NullMembers};
pub use store::NullIdentityStore;
