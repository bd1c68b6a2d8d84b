//! Directory client against an in-process mock of the School 21 API.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;

use peerlink_directory::{Credentials, Directory, DirectoryClient, DirectoryConfig};

// ---------------------------------------------------------------------------
// Mock server
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockApi {
    token_requests: AtomicUsize,
    participant_requests: AtomicUsize,
    current_token: Mutex<Option<String>>,
    /// Reject the next participant request with 401 even if the token is valid.
    expire_next: AtomicBool,
    /// Reject every participant request with 401.
    always_expired: AtomicBool,
}

impl MockApi {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = self
            .current_token
            .lock()
            .unwrap()
            .as_ref()
            .map(|t| format!("Bearer {t}"));
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        expected.is_some() && expected == presented
    }

    fn reject(&self) -> bool {
        self.always_expired.load(Ordering::SeqCst) || self.expire_next.swap(false, Ordering::SeqCst)
    }
}

async fn token(
    State(api): State<Arc<MockApi>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let n = api.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    let valid = form.get("client_id").map(String::as_str) == Some("s21-open-api")
        && form.get("username").map(String::as_str) == Some("svc")
        && form.get("password").map(String::as_str) == Some("secret")
        && form.get("grant_type").map(String::as_str) == Some("password");
    if !valid {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_grant"})));
    }
    let access = format!("token-{n}");
    *api.current_token.lock().unwrap() = Some(access.clone());
    (
        StatusCode::OK,
        Json(json!({"access_token": access, "refresh_token": "refresh", "expires_in": 300})),
    )
}

async fn participant(
    State(api): State<Arc<MockApi>>,
    Path(login): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    api.participant_requests.fetch_add(1, Ordering::SeqCst);
    if !api.authorized(&headers) || api.reject() {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    match login.as_str() {
        "jdoe" | "asmith" => (
            StatusCode::OK,
            Json(json!({"login": login, "status": "ACTIVE", "className": "21_10"})),
        ),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "not found"}))),
    }
}

async fn coalition(
    State(api): State<Arc<MockApi>>,
    Path(login): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !api.authorized(&headers) || api.reject() {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    match login.as_str() {
        "jdoe" => (StatusCode::OK, Json(json!({"coalitionId": 3, "coalitionName": "Dragon squad"}))),
        "asmith" => (StatusCode::OK, Json(json!({"name": "Phoenix"}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

async fn spawn_api() -> (Arc<MockApi>, DirectoryConfig) {
    let api = Arc::new(MockApi::default());
    let app = Router::new()
        .route("/token", post(token))
        .route("/api/v1/participants/:login", get(participant))
        .route("/api/v1/participants/:login/coalition", get(coalition))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = DirectoryConfig {
        auth_url: format!("http://{addr}/token"),
        base_url: format!("http://{addr}/api/v1"),
        ..Default::default()
    };
    (api, config)
}

fn client(config: DirectoryConfig, password: &str) -> DirectoryClient {
    DirectoryClient::new(config, Credentials::new("svc", password)).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_request_authenticates_lazily_and_token_is_reused() {
    let (api, config) = spawn_api().await;
    let client = client(config, "secret");
    assert!(!client.is_authenticated());

    assert!(client.participant_exists("jdoe").await);
    assert!(client.participant_exists("asmith").await);

    assert!(client.is_authenticated());
    assert_eq!(api.token_requests.load(Ordering::SeqCst), 1);
    assert_eq!(api.participant_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn expired_token_is_renewed_once_and_request_retried() {
    let (api, config) = spawn_api().await;
    let client = client(config, "secret");
    assert!(client.authenticate().await);

    api.expire_next.store(true, Ordering::SeqCst);
    let record = client.get_participant("jdoe").await.expect("retried request succeeds");

    assert_eq!(record.login.as_deref(), Some("jdoe"));
    assert_eq!(api.token_requests.load(Ordering::SeqCst), 2);
    assert_eq!(api.participant_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn persistent_expiry_gives_up_after_one_retry() {
    let (api, config) = spawn_api().await;
    let client = client(config, "secret");
    api.always_expired.store(true, Ordering::SeqCst);

    assert!(!client.participant_exists("jdoe").await);

    // Initial grant plus exactly one re-authentication.
    assert_eq!(api.token_requests.load(Ordering::SeqCst), 2);
    assert_eq!(api.participant_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn rejected_credentials_fail_without_querying_participants() {
    let (api, config) = spawn_api().await;
    let client = client(config, "wrong");

    assert!(!client.authenticate().await);
    assert!(!client.participant_exists("jdoe").await);
    assert_eq!(api.participant_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unknown_and_failing_participants_are_absent() {
    let (_api, config) = spawn_api().await;
    let client = client(config, "secret");

    assert!(client.get_participant("ghost").await.is_none());
    assert!(client.get_participant("broken").await.is_none());
    assert!(client.get_coalition_name("ghost").await.is_none());
}

#[tokio::test]
async fn coalition_name_reads_either_field_variant() {
    let (_api, config) = spawn_api().await;
    let client = client(config, "secret");

    assert_eq!(client.get_coalition_name("jdoe").await.as_deref(), Some("Dragon squad"));
    assert_eq!(client.get_coalition_name("asmith").await.as_deref(), Some("Phoenix"));
}

#[tokio::test]
async fn closed_session_is_reopened_on_next_request() {
    let (_api, config) = spawn_api().await;
    let client = client(config, "secret");

    assert!(client.participant_exists("jdoe").await);
    client.close();
    assert!(client.participant_exists("jdoe").await);
}

#[tokio::test]
async fn works_through_the_directory_trait() {
    let (_api, config) = spawn_api().await;
    let directory: Arc<dyn Directory> = Arc::new(client(config, "secret"));

    assert!(directory.participant_exists("jdoe").await);
    assert!(!directory.participant_exists("nobody").await);
    assert_eq!(directory.get_coalition_name("asmith").await.as_deref(), Some("Phoenix"));
}

#[tokio::test]
async fn unreachable_directory_reports_absent() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = DirectoryConfig {
        auth_url: format!("http://{addr}/token"),
        base_url: format!("http://{addr}/api/v1"),
        timeout_secs: 2,
        ..Default::default()
    };
    let client = client(config, "secret");
    assert!(!client.authenticate().await);
    assert!(!client.participant_exists("jdoe").await);
}
