//! Client for the School 21 participant directory.
//!
//! The directory is a bearer-token REST API. The client authenticates with a
//! service account (password grant), keeps the token for every later
//! request, and re-authenticates once when the token expires.
//!
//! Lookups collapse every failure into "absent": the orchestrator only needs
//! to know whether a participant exists and which coalition they belong to.
//! The underlying cause is logged.

pub mod client;
pub mod error;
pub mod types;

pub use client::{Credentials, DirectoryClient, DirectoryConfig};
pub use error::DirectoryError;
pub use types::{CoalitionRecord, ParticipantRecord};

use async_trait::async_trait;

/// The two directory reads the verification workflow depends on.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Whether `login` is a known participant.
    async fn participant_exists(&self, login: &str) -> bool;

    /// Coalition name of `login`, if it has one and the lookup succeeded.
    async fn get_coalition_name(&self, login: &str) -> Option<String>;
}
