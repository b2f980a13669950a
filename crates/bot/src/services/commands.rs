//! Reply logic for inbound text messages.
//!
//! Applies the authorization gate, then answers each intent. Webhook
//! acknowledgment is handled upstream; this service only talks to the store
//! and the platform.

use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

use crate::commands::{self, Intent};
use crate::db::AdminRepository;
use crate::error::AppError;
use crate::line::messages::{
    kick_unavailable_message, mention_required_message, not_admin_message, promoted_message,
    roster_message, unknown_command_message, whoami_message,
};
use crate::line::{LineClient, MessageEvent, TextMessage};

use super::profile::ProfileResolver;

/// Handles parsed commands on behalf of a single webhook event.
pub struct CommandService {
    pool: SqlitePool,
    line: LineClient,
}

impl CommandService {
    /// Create a new command service.
    #[must_use]
    pub const fn new(pool: SqlitePool, line: LineClient) -> Self {
        Self { pool, line }
    }

    /// Parse, authorize, and answer one text message.
    ///
    /// Privileged intents from non-admin senders get exactly the
    /// "not an admin" reply and mutate nothing.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the store is unavailable and
    /// `AppError::Line` if a reply cannot be delivered.
    #[instrument(skip(self, event, message), fields(reply_token = %event.reply_token))]
    pub async fn handle_text(
        &self,
        event: &MessageEvent,
        message: &TextMessage,
    ) -> Result<(), AppError> {
        let Some(sender) = event.source.user_id.as_deref() else {
            debug!("text event without a sender, ignoring");
            return Ok(());
        };

        let text = message.text.trim();
        let intent = commands::parse(text);
        let admins = AdminRepository::new(&self.pool);

        if intent.is_privileged() && !admins.is_admin(sender).await? {
            info!(%sender, ?intent, "privileged command from non-admin");
            self.line
                .reply_text(&event.reply_token, not_admin_message())
                .await?;
            return Ok(());
        }

        match intent {
            Intent::ListAdmins => {
                let resolver = ProfileResolver::new(&self.line);
                let group_id = event.source.group_id.as_deref();

                let all = admins.list_all().await?;
                let mut names = Vec::with_capacity(all.len());
                for admin in &all {
                    names.push(resolver.resolve(&admin.user_id, group_id).await);
                }

                self.line
                    .reply_text(&event.reply_token, &roster_message(&names))
                    .await?;
            }
            Intent::PromoteAdmin => match message.first_mentioned_user() {
                Some(target) => {
                    let inserted = admins.add(target).await?;
                    info!(%sender, %target, inserted, "promoted user to admin");
                    self.line
                        .reply_text(&event.reply_token, promoted_message())
                        .await?;
                }
                None => {
                    self.line
                        .reply_text(&event.reply_token, mention_required_message())
                        .await?;
                }
            },
            Intent::KickRequest => {
                // Intentional stub: no state change, no removal call.
                self.line
                    .reply_text(&event.reply_token, kick_unavailable_message())
                    .await?;
            }
            Intent::UnknownCommand => {
                self.line
                    .reply_text(&event.reply_token, unknown_command_message())
                    .await?;
            }
            Intent::WhoAmI => {
                self.line
                    .reply_text(&event.reply_token, &whoami_message(sender))
                    .await?;
            }
            Intent::Ignore => {}
        }

        Ok(())
    }
}
