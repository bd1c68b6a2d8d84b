use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("authentication rejected with HTTP status {0}")]
    AuthRejected(u16),

    #[error("token expired and re-authentication did not help")]
    Unauthorized,

    #[error("HTTP request to directory failed: {0}")]
    RequestFailed(String),

    #[error("directory returned HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("invalid response from directory: {0}")]
    InvalidResponse(String),

    #[error("directory unreachable: {0}")]
    Unreachable(String),

    #[error("invalid directory configuration: {0}")]
    InvalidConfig(String),
}

impl DirectoryError {
    pub(crate) fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DirectoryError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            DirectoryError::Unreachable(format!("connection failed: {e}"))
        } else {
            DirectoryError::RequestFailed(e.to_string())
        }
    }
}
