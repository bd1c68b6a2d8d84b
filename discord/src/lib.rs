//! Discord adapter for peerlink.
//!
//! Slash commands arrive as signed HTTP interactions on `POST /interactions`;
//! member changes and messages go out through the Discord REST API. The
//! [`Bot`] ties both to the identity store and the directory client.

pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod interactions;
pub mod metrics;
pub mod model;
pub mod rest;
pub mod shutdown;
pub mod signature;

pub use bot::{Bot, Secrets};
pub use config::{BotConfig, DiscordConfig};
pub use error::DiscordError;
pub use interactions::{router, AppState};
pub use metrics::BotMetrics;
pub use rest::{DiscordRest, GuildMembers};
pub use shutdown::ShutdownController;
pub use signature::SignatureVerifier;
