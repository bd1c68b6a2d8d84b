//! Parse errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid snowflake id: {0}")]
    InvalidId(String),

    #[error("login is empty")]
    EmptyLogin,

    #[error("login contains forbidden character {0:?}")]
    InvalidLoginChar(char),
}
