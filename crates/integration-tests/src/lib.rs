//! Integration-test support for the guardian bot.
//!
//! Spins up two local servers per test:
//!
//! - the bot itself, bound to an ephemeral port with an in-memory admin
//!   store, and
//! - a stub LINE Messaging API that records every outbound call so tests
//!   can assert on replies and member removals.
//!
//! The bot is pointed at the stub via its Messaging API origin setting, so
//! tests exercise the real HTTP surface end to end: signature verification,
//! event dispatch, authorization, and the outbound platform calls.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde_json::{Value, json};
use sha2::Sha256;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use guardian_bot::config::{BotConfig, LineConfig};
use guardian_bot::db::AdminRepository;
use guardian_bot::routes;
use guardian_bot::state::AppState;

/// Channel secret shared by the bot under test and the signing helper.
pub const CHANNEL_SECRET: &str = "integration-test-channel-secret";

/// Compute the webhook signature the way the platform does.
#[must_use]
pub fn sign(secret: &str, body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("valid key length");
    mac.update(body.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

// =============================================================================
// Stub LINE Messaging API
// =============================================================================

/// Shared, inspectable state of the stub LINE API.
#[derive(Clone, Default)]
pub struct LineStubState {
    replies: Arc<Mutex<Vec<Value>>>,
    removal_attempts: Arc<Mutex<Vec<String>>>,
    failing_removals: Arc<Mutex<HashSet<String>>>,
}

impl LineStubState {
    /// Texts of every reply message received, in arrival order.
    #[must_use]
    pub fn reply_texts(&self) -> Vec<String> {
        self.replies
            .lock()
            .expect("lock poisoned")
            .iter()
            .flat_map(|body| {
                body["messages"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|m| m["text"].as_str().map(String::from))
            })
            .collect()
    }

    /// Number of reply requests received (one request may carry several
    /// messages).
    #[must_use]
    pub fn reply_count(&self) -> usize {
        self.replies.lock().expect("lock poisoned").len()
    }

    /// User IDs whose removal was attempted, in arrival order, including
    /// attempts the stub answered with an error.
    #[must_use]
    pub fn removal_attempts(&self) -> Vec<String> {
        self.removal_attempts.lock().expect("lock poisoned").clone()
    }

    /// Make future removal calls for `user_id` fail with a 500.
    pub fn fail_removals_for(&self, user_id: &str) {
        self.failing_removals
            .lock()
            .expect("lock poisoned")
            .insert(user_id.to_string());
    }
}

/// A stub LINE Messaging API server.
pub struct LineStub {
    /// Address the stub listens on.
    pub addr: SocketAddr,
    /// Recorded calls.
    pub state: LineStubState,
}

impl LineStub {
    /// Spawn the stub on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let state = LineStubState::default();

        let app = Router::new()
            .route("/v2/bot/message/reply", post(capture_reply))
            .route("/v2/bot/profile/{user_id}", get(profile))
            .route(
                "/v2/bot/group/{group_id}/member/{user_id}",
                get(group_member_profile).delete(remove_member),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub listener");
        let addr = listener.local_addr().expect("listener has no local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server error");
        });

        Self { addr, state }
    }

    /// Origin URL for pointing the bot at this stub.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Deterministic display name the stub hands out for any profile lookup.
#[must_use]
pub fn stub_display_name(user_id: &str) -> String {
    format!("member-{user_id}")
}

async fn capture_reply(
    State(state): State<LineStubState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.replies.lock().expect("lock poisoned").push(body);
    Json(json!({}))
}

async fn profile(Path(user_id): Path<String>) -> Json<Value> {
    Json(json!({
        "displayName": stub_display_name(&user_id),
        "userId": user_id,
    }))
}

async fn group_member_profile(Path((_group_id, user_id)): Path<(String, String)>) -> Json<Value> {
    Json(json!({
        "displayName": stub_display_name(&user_id),
        "userId": user_id,
    }))
}

async fn remove_member(
    State(state): State<LineStubState>,
    Path((_group_id, user_id)): Path<(String, String)>,
) -> StatusCode {
    state
        .removal_attempts
        .lock()
        .expect("lock poisoned")
        .push(user_id.clone());

    if state
        .failing_removals
        .lock()
        .expect("lock poisoned")
        .contains(&user_id)
    {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

// =============================================================================
// Bot under test
// =============================================================================

/// A running bot instance wired to a stub LINE API.
pub struct TestContext {
    /// HTTP client for driving the bot.
    pub client: reqwest::Client,
    /// Base URL of the bot under test.
    pub bot_url: String,
    /// The bot's database pool, shared for direct assertions.
    pub pool: SqlitePool,
    /// The stub LINE API the bot talks to.
    pub line: LineStub,
}

impl TestContext {
    /// Spawn a bot with an empty in-memory admin store.
    ///
    /// # Panics
    ///
    /// Panics if either server fails to start.
    pub async fn new() -> Self {
        let line = LineStub::spawn().await;

        // Single connection so the test's assertions see the same in-memory
        // database as the bot.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");

        AdminRepository::new(&pool)
            .init(None)
            .await
            .expect("Failed to initialize admin store");

        let config = BotConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            line: LineConfig {
                channel_access_token: SecretString::from("integration-test-access-token"),
                channel_secret: SecretString::from(CHANNEL_SECRET),
                api_base: line.base_url(),
            },
            bootstrap_admin_id: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config, pool.clone());
        let app = routes::routes().with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind bot listener");
        let bot_url = format!("http://{}", listener.local_addr().expect("local addr"));

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("bot server error");
        });

        Self {
            client: reqwest::Client::new(),
            bot_url,
            pool,
            line,
        }
    }

    /// Insert an admin directly into the store.
    ///
    /// # Panics
    ///
    /// Panics if the insert fails.
    pub async fn seed_admin(&self, user_id: &str) {
        AdminRepository::new(&self.pool)
            .add(user_id)
            .await
            .expect("Failed to seed admin");
    }

    /// Membership check against the store.
    ///
    /// # Panics
    ///
    /// Panics if the query fails.
    pub async fn is_admin(&self, user_id: &str) -> bool {
        AdminRepository::new(&self.pool)
            .is_admin(user_id)
            .await
            .expect("Failed to query admin store")
    }

    /// `POST` a correctly signed webhook body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_webhook(&self, body: &str) -> reqwest::Response {
        self.post_webhook_signed(body, &sign(CHANNEL_SECRET, body))
            .await
    }

    /// `POST` a webhook body with an explicit signature header value.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn post_webhook_signed(&self, body: &str, signature: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/callback", self.bot_url))
            .header("X-Line-Signature", signature)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("HTTP request failed")
    }
}

// =============================================================================
// Webhook payload builders
// =============================================================================

/// Build a one-event payload carrying a group text message.
#[must_use]
pub fn text_message_payload(
    sender: &str,
    group_id: &str,
    text: &str,
    mention: Option<&str>,
) -> String {
    let mut message = json!({
        "id": "1",
        "type": "text",
        "text": text,
    });
    if let Some(user_id) = mention {
        message["mention"] = json!({
            "mentionees": [{"index": 0, "length": 1, "type": "user", "userId": user_id}]
        });
    }

    json!({
        "destination": "Ubot",
        "events": [{
            "type": "message",
            "replyToken": "reply-token",
            "source": {"type": "group", "groupId": group_id, "userId": sender},
            "message": message,
        }]
    })
    .to_string()
}

/// Build a one-event payload for the bot being added to a group.
#[must_use]
pub fn join_payload(group_id: &str) -> String {
    json!({
        "destination": "Ubot",
        "events": [{
            "type": "join",
            "replyToken": "reply-token",
            "source": {"type": "group", "groupId": group_id},
        }]
    })
    .to_string()
}

/// Build a one-event payload for members joining a group.
#[must_use]
pub fn member_joined_payload(adder: &str, group_id: &str, members: &[&str]) -> String {
    let members: Vec<Value> = members
        .iter()
        .map(|user_id| json!({"type": "user", "userId": user_id}))
        .collect();

    json!({
        "destination": "Ubot",
        "events": [{
            "type": "memberJoined",
            "replyToken": "reply-token",
            "source": {"type": "group", "groupId": group_id, "userId": adder},
            "joined": {"members": members},
        }]
    })
    .to_string()
}
