//! Fundamental types for peerlink.
//!
//! Identifiers for both sides of a link (the chat-platform account and the
//! learning-platform login), the persisted [`VerifiedIdentity`] record, and
//! the timestamp/clock used to stamp it.

pub mod error;
pub mod identity;
pub mod ids;
pub mod login;
pub mod time;

pub use error::TypesError;
pub use identity::VerifiedIdentity;
pub use ids::{PlatformUserId, RoleId};
pub use login::ExternalLogin;
pub use time::{Clock, SystemClock, Timestamp};
