//! Directory response payloads.
//!
//! Only the fields peerlink reads are typed; everything else is kept in
//! `extra` so nothing the API sends is rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /participants/{login}`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParticipantRecord {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default, rename = "className")]
    pub class_name: Option<String>,
    #[serde(default, rename = "parallelName")]
    pub parallel_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /participants/{login}/coalition`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CoalitionRecord {
    #[serde(default)]
    pub name: Option<String>,
    /// Older API revisions use this key instead of `name`.
    #[serde(default, rename = "coalitionName")]
    pub coalition_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CoalitionRecord {
    /// `name`, falling back to `coalitionName`. Empty strings count as missing.
    pub fn display_name(&self) -> Option<&str> {
        [self.name.as_deref(), self.coalition_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
