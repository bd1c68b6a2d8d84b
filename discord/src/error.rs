//! Discord adapter error types.

use thiserror::Error;

use peerlink_verification::MemberError;

#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("identity lookup failed: {0}")]
    Lookup(String),

    #[error("invalid signature key: {0}")]
    Signature(String),

    #[error("store error: {0}")]
    Store(#[from] peerlink_store::StoreError),

    #[error("lmdb error: {0}")]
    Lmdb(#[from] peerlink_store_lmdb::LmdbError),

    #[error("directory error: {0}")]
    Directory(#[from] peerlink_directory::DirectoryError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DiscordError {
    fn from(e: reqwest::Error) -> Self {
        DiscordError::Http(e.to_string())
    }
}

impl From<DiscordError> for MemberError {
    fn from(e: DiscordError) -> Self {
        match e {
            DiscordError::Forbidden(body) => MemberError::Forbidden(body),
            DiscordError::NotFound(body) => MemberError::NotFound(body),
            other => MemberError::Request(other.to_string()),
        }
    }
}
