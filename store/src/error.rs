use thiserror::Error;

/// Failures surfaced by an [`IdentityStore`](crate::IdentityStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The login is already linked to a different member.
    #[error("login already linked: {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored record could not be encoded or decoded.
    #[error("record encoding error: {0}")]
    Serialization(String),

    /// The login index and the identity table disagree.
    #[error("identity store is inconsistent: {0}")]
    Corruption(String),
}
