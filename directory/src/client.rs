//! HTTP client for the participant directory.

use crate::error::DirectoryError;
use crate::types::{CoalitionRecord, ParticipantRecord, TokenResponse};
use crate::Directory;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How many times a request is re-sent after a 401. Each retry is preceded
/// by a fresh password grant.
const MAX_REAUTH_RETRIES: u32 = 1;

/// Endpoints and client settings. Credentials are kept separately.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// OpenID Connect token endpoint.
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Base URL of the participant API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// OAuth client id sent with the password grant.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_auth_url() -> String {
    "https://auth.21-school.ru/auth/realms/EduPowerKeycloak/protocol/openid-connect/token"
        .to_string()
}

fn default_base_url() -> String {
    "https://platform.21-school.ru/services/21-school/api/v1".to_string()
}

fn default_client_id() -> String {
    "s21-open-api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            base_url: default_base_url(),
            client_id: default_client_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Service-account credentials for the password grant.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

enum SessionState {
    Unauthenticated,
    Authenticated {
        access_token: String,
        /// Stored for completeness; expiry is handled by a full password grant.
        #[allow(dead_code)]
        refresh_token: Option<String>,
    },
}

/// Authenticated directory client.
///
/// One instance is shared by every request. The HTTP session is created
/// lazily on first use and dropped by [`DirectoryClient::close`].
pub struct DirectoryClient {
    config: DirectoryConfig,
    base_url: Url,
    credentials: Credentials,
    http: Mutex<Option<reqwest::Client>>,
    session: Mutex<SessionState>,
}

impl DirectoryClient {
    pub fn new(config: DirectoryConfig, credentials: Credentials) -> Result<Self, DirectoryError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| DirectoryError::InvalidConfig(format!("base_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::InvalidConfig(format!(
                "base_url {} cannot carry a path",
                config.base_url
            )));
        }
        Url::parse(&config.auth_url)
            .map_err(|e| DirectoryError::InvalidConfig(format!("auth_url: {e}")))?;

        Ok(Self {
            config,
            base_url,
            credentials,
            http: Mutex::new(None),
            session: Mutex::new(SessionState::Unauthenticated),
        })
    }

    /// Current HTTP session, created on first use.
    fn http(&self) -> Result<reqwest::Client, DirectoryError> {
        let mut guard = self.http.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| DirectoryError::RequestFailed(format!("failed to build HTTP client: {e}")))?;
        *guard = Some(client.clone());
        Ok(client)
    }

    /// Release the HTTP session. A later request opens a new one.
    pub fn close(&self) {
        let released = self
            .http
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some();
        if released {
            tracing::debug!("directory HTTP session closed");
        }
    }

    /// Whether a token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    fn access_token(&self) -> Option<String> {
        match &*self.session.lock().unwrap_or_else(|e| e.into_inner()) {
            SessionState::Authenticated { access_token, .. } => Some(access_token.clone()),
            SessionState::Unauthenticated => None,
        }
    }

    /// Drop the token, unless another request already replaced it.
    fn invalidate(&self, rejected_token: &str) {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(&*session, SessionState::Authenticated { access_token, .. } if access_token == rejected_token)
        {
            *session = SessionState::Unauthenticated;
        }
    }

    /// Exchange the service-account credentials for a token.
    ///
    /// Returns `false` (and logs) on any failure.
    pub async fn authenticate(&self) -> bool {
        match self.try_authenticate().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "directory authentication failed");
                false
            }
        }
    }

    async fn try_authenticate(&self) -> Result<(), DirectoryError> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
            ("grant_type", "password"),
        ];

        let response = self
            .http()?
            .post(&self.config.auth_url)
            .form(&form)
            .send()
            .await
            .map_err(DirectoryError::from_transport)?;

        if response.status() != StatusCode::OK {
            return Err(DirectoryError::AuthRejected(response.status().as_u16()));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            DirectoryError::InvalidResponse(format!("failed to parse token response: {e}"))
        })?;

        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = SessionState::Authenticated {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        };
        tracing::info!("authenticated with School 21 API");
        Ok(())
    }

    /// `base_url` + path segments, each percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DirectoryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DirectoryError::InvalidConfig("base_url cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Authenticated GET. `Ok(None)` means 404.
    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>, DirectoryError> {
        let url = self.endpoint(segments)?;
        let http = self.http()?;

        for attempt in 0..=MAX_REAUTH_RETRIES {
            let token = match self.access_token() {
                Some(token) => token,
                None => {
                    self.try_authenticate().await?;
                    self.access_token().ok_or(DirectoryError::Unauthorized)?
                }
            };

            let response = http
                .get(url.clone())
                .bearer_auth(&token)
                .send()
                .await
                .map_err(DirectoryError::from_transport)?;

            match response.status() {
                StatusCode::OK => {
                    let body = response.json::<T>().await.map_err(|e| {
                        DirectoryError::InvalidResponse(format!("{}: {e}", url.path()))
                    })?;
                    return Ok(Some(body));
                }
                StatusCode::NOT_FOUND => return Ok(None),
                StatusCode::UNAUTHORIZED => {
                    tracing::debug!(attempt, path = url.path(), "directory token rejected");
                    self.invalidate(&token);
                }
                status => return Err(DirectoryError::UnexpectedStatus(status.as_u16())),
            }
        }

        Err(DirectoryError::Unauthorized)
    }

    /// Lookup that folds errors into `None` after logging them.
    async fn lookup<T: DeserializeOwned>(&self, login: &str, segments: &[&str]) -> Option<T> {
        match self.fetch(segments).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(%login, error = %e, "directory request failed");
                None
            }
        }
    }

    /// `GET /participants/{login}`
    pub async fn get_participant(&self, login: &str) -> Option<ParticipantRecord> {
        self.lookup(login, &["participants", login]).await
    }

    /// `GET /participants/{login}/coalition`
    pub async fn get_participant_coalition(&self, login: &str) -> Option<CoalitionRecord> {
        self.lookup(login, &["participants", login, "coalition"])
            .await
    }

    pub async fn participant_exists(&self, login: &str) -> bool {
        self.get_participant(login).await.is_some()
    }

    pub async fn get_coalition_name(&self, login: &str) -> Option<String> {
        self.get_participant_coalition(login)
            .await
            .and_then(|record| record.display_name().map(str::to_string))
    }
}

#[async_trait]
impl Directory for DirectoryClient {
    async fn participant_exists(&self, login: &str) -> bool {
        DirectoryClient::participant_exists(self, login).await
    }

    async fn get_coalition_name(&self, login: &str) -> Option<String> {
        DirectoryClient::get_coalition_name(self, login).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> Result<DirectoryClient, DirectoryError> {
        let config = DirectoryConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        DirectoryClient::new(config, Credentials::new("svc", "secret"))
    }

    #[test]
    fn default_config_points_at_school21() {
        let config = DirectoryConfig::default();
        assert!(config.auth_url.starts_with("https://auth.21-school.ru/"));
        assert_eq!(config.client_id, "s21-open-api");
    }

    #[test]
    fn endpoint_appends_encoded_segments() {
        let client = client("https://example.test/api/v1/").unwrap();
        let url = client.endpoint(&["participants", "j doe", "coalition"]).unwrap();
        assert_eq!(url.as_str(), "https://example.test/api/v1/participants/j%20doe/coalition");

        let url = client.endpoint(&["participants", "../admin"]).unwrap();
        assert_eq!(url.path(), "/api/v1/participants/..%2Fadmin");
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(client("not a url"), Err(DirectoryError::InvalidConfig(_))));
        assert!(matches!(client("mailto:ops@example.test"), Err(DirectoryError::InvalidConfig(_))));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("svc", "hunter2"));
        assert!(debug.contains("svc"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn starts_unauthenticated() {
        assert!(!client("https://example.test/api/v1").unwrap().is_authenticated());
    }
}
