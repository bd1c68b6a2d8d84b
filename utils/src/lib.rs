//! Shared utilities for peerlink.

pub mod logging;

pub use logging::{init_logging, LogFormat};
