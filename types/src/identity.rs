//! The persisted link between a platform account and a learning-platform login.

use serde::{Deserialize, Serialize};

use crate::{ExternalLogin, PlatformUserId, Timestamp};

/// One verified link. Replaced wholesale on re-verification, never patched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Primary key.
    pub platform_user_id: PlatformUserId,
    /// Unique across all records.
    pub external_login: ExternalLogin,
    /// Coalition name as reported by the directory at verification time.
    pub group_label: Option<String>,
    pub verified_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bincode_roundtrip_keeps_optional_label() {
        let identity = VerifiedIdentity {
            platform_user_id: PlatformUserId::new(42),
            external_login: ExternalLogin::parse("jdoe").unwrap(),
            group_label: None,
            verified_at: Timestamp::new(1_700_000_000),
        };
        let bytes = bincode::serialize(&identity).unwrap();
        let decoded: VerifiedIdentity = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, identity);
    }
}
