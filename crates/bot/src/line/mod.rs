//! LINE platform integration.
//!
//! This module provides:
//! - [`LineClient`] for replies, profile lookups, and member removal
//! - Webhook signature verification
//! - Wire types for inbound events and outbound messages
//! - Builders for every reply text the bot sends
//!
//! The platform is treated as a black box: the bot never retries its calls,
//! and callers decide whether a failure is fatal for the surrounding
//! operation.

mod client;
mod error;
pub mod messages;
mod types;

pub use client::LineClient;
pub use error::LineError;
pub use types::{
    ApiErrorResponse, Event, JoinEvent, JoinedMembers, Member, MemberJoinedEvent, Mention,
    Mentionee, MessageContent, MessageEvent, OutgoingMessage, Profile, ReplyRequest, Source,
    TextMessage, WebhookPayload,
};
