//! Verification workflow.
//!
//! A verification request runs a fixed sequence of checks and side effects:
//!
//! 1. requester already verified? → stop
//! 2. login already linked to someone else? → stop
//! 3. login unknown to the directory? → stop
//! 4. look up the coalition and map it to a [`GroupCategory`]
//! 5. grant the base role and the coalition role
//! 6. rename the requester to their login (best effort)
//! 7. persist the link
//!
//! Every failure is turned into a [`VerifyResult`] with a user-facing
//! message; nothing propagates out of [`VerificationService::verify`].

pub mod coalition;
pub mod error;
pub mod greeter;
pub mod member;
pub mod orchestrator;
pub mod outcome;
pub mod roles;

pub use coalition::{match_coalition, GroupCategory, COALITION_TABLE};
pub use error::VerificationError;
pub use greeter::{on_new_member, NewMember, WELCOME_MESSAGE};
pub use member::{DirectMessenger, MemberError, MemberManager, Role};
pub use orchestrator::{VerificationService, VerifyRequest, AUDIT_REASON};
pub use outcome::{VerifyOutcome, VerifyResult};
pub use roles::RoleConfig;
