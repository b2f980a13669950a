//! Membership guard: revert unauthorized member additions.
//!
//! When members join a group through a non-admin, the guard removes each of
//! them and posts a single notice. Removal is best-effort and per-member: a
//! platform refusal for one member never stops the attempt on the rest.

use sqlx::SqlitePool;
use tracing::{debug, info, instrument, warn};

use crate::db::AdminRepository;
use crate::error::AppError;
use crate::line::messages::unauthorized_join_message;
use crate::line::{LineClient, MemberJoinedEvent};

/// Enforces the admins-add-members rule on join events.
pub struct MembershipGuard {
    pool: SqlitePool,
    line: LineClient,
}

impl MembershipGuard {
    /// Create a new membership guard.
    #[must_use]
    pub const fn new(pool: SqlitePool, line: LineClient) -> Self {
        Self { pool, line }
    }

    /// Handle a member-joined event.
    ///
    /// Additions performed by an admin are left alone. Otherwise every newly
    /// joined member is removed (failures logged per member, batch always
    /// completes) and exactly one notice is sent. An addition with no
    /// attributable adder is treated as unauthorized.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the admin lookup fails and
    /// `AppError::Line` if the notice cannot be delivered. Individual
    /// removal failures are not errors.
    #[instrument(skip(self, event), fields(group = ?event.source.group_id))]
    pub async fn handle_member_joined(&self, event: &MemberJoinedEvent) -> Result<(), AppError> {
        let admins = AdminRepository::new(&self.pool);

        if let Some(adder) = event.source.user_id.as_deref()
            && admins.is_admin(adder).await?
        {
            debug!(%adder, "authorized member addition");
            return Ok(());
        }

        let Some(group_id) = event.source.group_id.as_deref() else {
            warn!("member-joined event without a group context, nothing to revert");
            return Ok(());
        };

        let mut removed = 0_usize;
        for member in &event.joined.members {
            let Some(user_id) = member.user_id.as_deref() else {
                continue;
            };

            match self.line.remove_group_member(group_id, user_id).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(error = %e, %user_id, "failed to remove member"),
            }
        }

        info!(
            adder = ?event.source.user_id,
            attempted = event.joined.members.len(),
            removed,
            "reverted unauthorized member addition"
        );

        self.line
            .reply_text(&event.reply_token, unauthorized_join_message())
            .await?;

        Ok(())
    }
}
