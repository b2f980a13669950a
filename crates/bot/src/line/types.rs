//! LINE Messaging API wire types.
//!
//! Inbound webhook payloads and outbound request/response bodies, modeled as
//! tagged serde enums. Only the event and message shapes the bot reacts to
//! are spelled out; everything else deserializes into an explicit catch-all
//! variant so new platform event types never break parsing.
//!
//! See: <https://developers.line.biz/en/reference/messaging-api/>

use serde::{Deserialize, Serialize};

// =============================================================================
// Inbound webhook payloads
// =============================================================================

/// Body of a webhook `POST`: a batch of independent events.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Bot user ID the delivery is addressed to.
    #[serde(default)]
    pub destination: Option<String>,
    /// Events in delivery order. No ordering is assumed between them.
    #[serde(default)]
    pub events: Vec<Event>,
}

/// A single webhook event, keyed by its `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// A message was sent in a chat the bot is in.
    Message(MessageEvent),
    /// The bot itself was added to a group or room.
    Join(JoinEvent),
    /// One or more users joined a group the bot is in.
    MemberJoined(MemberJoinedEvent),
    /// Any event type the bot does not react to.
    #[serde(other)]
    Other,
}

/// A message event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// One-shot token for replying to this event.
    pub reply_token: String,
    /// Who sent the message, and where.
    pub source: Source,
    /// The message content.
    pub message: MessageContent,
}

/// Message content, keyed by its `type` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    /// A text message, with an optional structured mention list.
    Text(TextMessage),
    /// Stickers, images, and every other content type.
    #[serde(other)]
    Other,
}

/// A text message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextMessage {
    /// Message ID.
    #[serde(default)]
    pub id: Option<String>,
    /// The message text.
    pub text: String,
    /// Mention annotation, present only when the text mentions users.
    #[serde(default)]
    pub mention: Option<Mention>,
}

impl TextMessage {
    /// User ID of the first mentioned user, if the message carries one.
    ///
    /// Mentions of "everyone" have no user ID and are skipped by returning
    /// `None` when the first mentionee lacks one.
    #[must_use]
    pub fn first_mentioned_user(&self) -> Option<&str> {
        self.mention
            .as_ref()?
            .mentionees
            .first()?
            .user_id
            .as_deref()
    }
}

/// Structured mention annotation on a text message.
#[derive(Debug, Clone, Deserialize)]
pub struct Mention {
    /// Mentioned users, in text order.
    #[serde(default)]
    pub mentionees: Vec<Mentionee>,
}

/// A single mentioned user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentionee {
    /// Mentioned user's ID. Absent for "everyone" mentions.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// The bot was added to a group or room.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinEvent {
    /// One-shot token for replying to this event.
    pub reply_token: String,
    /// The chat the bot joined.
    pub source: Source,
}

/// Users joined a group the bot is in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberJoinedEvent {
    /// One-shot token for replying to this event.
    pub reply_token: String,
    /// The group, plus the user who performed the addition when known.
    pub source: Source,
    /// The newly joined members.
    pub joined: JoinedMembers,
}

/// Member list attached to a member-joined event.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinedMembers {
    /// Newly joined members.
    #[serde(default)]
    pub members: Vec<Member>,
}

/// A group member reference.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// The member's user ID.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Event source: who acted, and in which chat.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Acting user's ID. Absent for some system-originated events.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Group ID when the event happened in a group chat.
    #[serde(default)]
    pub group_id: Option<String>,
}

// =============================================================================
// Outbound request/response bodies
// =============================================================================

/// Body of a `POST /v2/bot/message/reply` request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    /// Reply token from the inbound event.
    pub reply_token: String,
    /// Messages to send (the platform caps the batch size).
    pub messages: Vec<OutgoingMessage>,
}

/// An outbound message, keyed by its `type` field.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutgoingMessage {
    /// Plain text message.
    Text { text: String },
}

impl OutgoingMessage {
    /// Create a text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A user profile, direct or group-scoped.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Human-readable display name.
    pub display_name: String,
    /// The profiled user's ID.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Profile picture URL, when the user has one.
    #[serde(default)]
    pub picture_url: Option<String>,
}

/// Error body returned by the Messaging API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable error summary.
    #[serde(default)]
    pub message: Option<String>,
}
