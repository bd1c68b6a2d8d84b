//! Learning-platform login.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A login on the external learning platform.
///
/// Stored trimmed and exactly as the member typed it. The platform treats
/// logins case-insensitively, so uniqueness goes through [`index_key`].
///
/// [`index_key`]: ExternalLogin::index_key
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalLogin(String);

impl ExternalLogin {
    /// Trim and validate a user-supplied login.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let login = raw.trim();
        if login.is_empty() {
            return Err(TypesError::EmptyLogin);
        }
        if let Some(c) = login
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#'))
        {
            return Err(TypesError::InvalidLoginChar(c));
        }
        Ok(Self(login.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded form used as the uniqueness key.
    pub fn index_key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether both logins name the same platform account.
    pub fn same_account(&self, other: &ExternalLogin) -> bool {
        self.index_key() == other.index_key()
    }
}

impl fmt::Display for ExternalLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ExternalLogin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_but_keeps_case() {
        let login = ExternalLogin::parse("  JDoe ").unwrap();
        assert_eq!(login.as_str(), "JDoe");
        assert_eq!(login.to_string(), "JDoe");
    }

    #[test]
    fn index_key_folds_case() {
        let upper = ExternalLogin::parse("JDoe").unwrap();
        let lower = ExternalLogin::parse("jdoe").unwrap();
        assert_ne!(upper, lower);
        assert_eq!(upper.index_key(), "jdoe");
        assert!(upper.same_account(&lower));
        assert!(!upper.same_account(&ExternalLogin::parse("asmith").unwrap()));
    }

    #[test]
    fn parse_rejects_empty_and_path_characters() {
        assert_eq!(ExternalLogin::parse("   "), Err(TypesError::EmptyLogin));
        assert_eq!(
            ExternalLogin::parse("../admin"),
            Err(TypesError::InvalidLoginChar('/'))
        );
        assert_eq!(
            ExternalLogin::parse("j doe"),
            Err(TypesError::InvalidLoginChar(' '))
        );
    }
}
