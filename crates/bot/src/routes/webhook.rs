//! LINE webhook handler.
//!
//! Receives platform events, verifies their signature, and dispatches each
//! event to the matching service. Acknowledgment is decoupled from
//! per-event outcomes: once the signature checks out, the webhook gets its
//! 200 even when individual events fail. Only an unavailable store aborts
//! the request.

use axum::{
    Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use tracing::{debug, error, instrument};

use crate::error::AppError;
use crate::line::{Event, MessageContent, WebhookPayload, messages::greeting_message};
use crate::services::{CommandService, MembershipGuard};
use crate::state::AppState;

/// Create webhook routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/callback", get(verification_handshake).post(callback))
}

/// Static status page.
async fn index() -> &'static str {
    "Guardian bot is running!"
}

/// Webhook verification handshake.
///
/// The platform probes the callback URL with a `GET` when the webhook is
/// registered; no event processing happens here.
async fn verification_handshake() -> &'static str {
    "OK"
}

/// Handle a webhook delivery.
///
/// Verifies the `X-Line-Signature` header against the raw body before
/// anything else; a missing or wrong signature is a 400 and no event is
/// processed.
#[instrument(skip(state, headers, body))]
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let signature = headers
        .get("X-Line-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::InvalidSignature("Missing signature header".into()))?;

    state
        .line()
        .verify_signature(&body, signature)
        .map_err(|e| AppError::InvalidSignature(e.to_string()))?;

    debug!("LINE signature verified");

    let payload: WebhookPayload = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse webhook payload: {e}")))?;

    for event in &payload.events {
        if let Err(e) = dispatch(&state, event).await {
            // Store unavailability is the one transport-level failure;
            // everything else stays a per-event outcome.
            if matches!(e, AppError::Database(_)) {
                return Err(e);
            }
            error!(error = %e, "event processing failed");
        }
    }

    Ok("OK")
}

/// Route one event to its handler.
async fn dispatch(state: &AppState, event: &Event) -> Result<(), AppError> {
    match event {
        Event::Message(event) => match &event.message {
            MessageContent::Text(message) => {
                CommandService::new(state.pool().clone(), state.line().clone())
                    .handle_text(event, message)
                    .await
            }
            MessageContent::Other => {
                debug!("ignoring non-text message");
                Ok(())
            }
        },
        Event::Join(event) => {
            state
                .line()
                .reply_text(&event.reply_token, greeting_message())
                .await?;
            Ok(())
        }
        Event::MemberJoined(event) => {
            MembershipGuard::new(state.pool().clone(), state.line().clone())
                .handle_member_joined(event)
                .await
        }
        Event::Other => {
            debug!("ignoring unsupported event type");
            Ok(())
        }
    }
}
