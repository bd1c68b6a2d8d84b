//! Chat-platform identifiers.
//!
//! Discord serialises snowflakes as decimal strings in JSON; internally they
//! are plain `u64`s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Stable identifier of a chat-platform account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlatformUserId(u64);

impl PlatformUserId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Big-endian key bytes, so LMDB orders records by id.
    pub fn to_key(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_key(bytes: &[u8]) -> Option<Self> {
        let buf: [u8; 8] = bytes.try_into().ok()?;
        Some(Self(u64::from_be_bytes(buf)))
    }
}

impl fmt::Display for PlatformUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlatformUserId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidId(s.to_string()))
    }
}

/// A grantable role on the chat platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleId(u64);

impl RoleId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Configuration uses `0` for "not set"; such roles are never assigned.
    pub fn from_config(id: u64) -> Option<Self> {
        (id != 0).then_some(Self(id))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoleId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_parses_snowflake_strings() {
        let id: PlatformUserId = "80351110224678912".parse().unwrap();
        assert_eq!(id.get(), 80351110224678912);
        assert!("not-a-number".parse::<PlatformUserId>().is_err());
    }

    #[test]
    fn user_id_key_ordering_matches_numeric_ordering() {
        let a = PlatformUserId::new(5).to_key();
        let b = PlatformUserId::new(300).to_key();
        assert!(a < b);
        assert_eq!(PlatformUserId::from_key(&b), Some(PlatformUserId::new(300)));
        assert_eq!(PlatformUserId::from_key(&[1, 2, 3]), None);
    }

    #[test]
    fn zero_role_is_unset() {
        assert_eq!(RoleId::from_config(0), None);
        assert_eq!(RoleId::from_config(7), Some(RoleId::new(7)));
    }
}
