//! Verification results and their user-facing messages.

use std::fmt;

/// How a verification attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerifyOutcome {
    Verified,
    AlreadyVerified,
    LoginTaken,
    NotFound,
    RoleAssignmentForbidden,
    RoleAssignmentFailed,
    /// The identity store could not be read.
    StoreUnavailable,
    /// Side effects were applied but the link could not be saved.
    PersistFailed,
}

impl VerifyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::AlreadyVerified => "already_verified",
            Self::LoginTaken => "login_taken",
            Self::NotFound => "not_found",
            Self::RoleAssignmentForbidden => "role_forbidden",
            Self::RoleAssignmentFailed => "role_failed",
            Self::StoreUnavailable => "store_unavailable",
            Self::PersistFailed => "persist_failed",
        }
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) const LOGIN_TAKEN_MSG: &str =
    "This School 21 login is already linked to another Discord account.";
pub(crate) const ROLE_FORBIDDEN_MSG: &str =
    "Bot doesn't have permission to assign roles. Please contact an administrator.";
pub(crate) const ROLE_FAILED_MSG: &str =
    "An error occurred while assigning roles. Please try again later.";
pub(crate) const STORE_UNAVAILABLE_MSG: &str =
    "Verification is temporarily unavailable. Please try again later.";
pub(crate) const PERSIST_FAILED_MSG: &str =
    "Your verification could not be saved. Please try again later.";

/// Result of one verification attempt, ready to show to the requester.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyResult {
    pub outcome: VerifyOutcome,
    pub message: String,
    /// Names of the roles granted, in grant order.
    pub assigned_roles: Vec<String>,
    /// Coalition name as reported by the directory.
    pub group_name: Option<String>,
}

impl VerifyResult {
    pub fn success(&self) -> bool {
        self.outcome == VerifyOutcome::Verified
    }

    pub(crate) fn verified(login: &str, assigned_roles: Vec<String>, group_name: Option<String>) -> Self {
        let mut message = format!("Successfully verified as **{login}**!");
        if !assigned_roles.is_empty() {
            message.push_str(&format!("\nRoles assigned: {}", assigned_roles.join(", ")));
        }
        if let Some(group) = &group_name {
            message.push_str(&format!("\nCoalition: {group}"));
        }
        Self {
            outcome: VerifyOutcome::Verified,
            message,
            assigned_roles,
            group_name,
        }
    }

    pub(crate) fn already_verified(login: &str) -> Self {
        Self::rejected(
            VerifyOutcome::AlreadyVerified,
            format!("You are already verified as **{login}**"),
        )
    }

    pub(crate) fn not_found(login: &str) -> Self {
        Self::rejected(
            VerifyOutcome::NotFound,
            format!(
                "User **{login}** was not found on the School 21 platform. \
                 Please check your login and try again."
            ),
        )
    }

    pub(crate) fn rejected(outcome: VerifyOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
            assigned_roles: Vec::new(),
            group_name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verified_message_lists_roles_and_coalition() {
        let result = VerifyResult::verified(
            "jdoe",
            vec!["Peer".into(), "Dragon".into()],
            Some("Dragon squad".into()),
        );
        assert!(result.success());
        assert_eq!(
            result.message,
            "Successfully verified as **jdoe**!\nRoles assigned: Peer, Dragon\nCoalition: Dragon squad"
        );
    }

    #[test]
    fn verified_message_without_extras_is_one_line() {
        let result = VerifyResult::verified("jdoe", Vec::new(), None);
        assert_eq!(result.message, "Successfully verified as **jdoe**!");
    }

    #[test]
    fn rejections_are_not_successes() {
        let result = VerifyResult::already_verified("jdoe");
        assert!(!result.success());
        assert_eq!(result.message, "You are already verified as **jdoe**");
        assert_eq!(VerifyResult::not_found("x").outcome.as_str(), "not_found");
    }
}
