use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("store error: {0}")]
    Store(#[from] peerlink_store::StoreError),
}
