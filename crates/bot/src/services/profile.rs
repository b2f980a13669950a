//! Best-effort display-name resolution.
//!
//! Profile lookups are cosmetic: a roster reply must never fail because the
//! platform would not hand out a profile. The contract here is therefore
//! best-effort and non-propagating. Any lookup failure degrades to a
//! truncated form of the user ID.

use tracing::{debug, instrument};

use crate::line::LineClient;

/// Number of leading user-ID characters kept in the fallback display value.
const FALLBACK_PREFIX_CHARS: usize = 8;

/// Resolves chat-platform user IDs to display names.
pub struct ProfileResolver<'a> {
    line: &'a LineClient,
}

impl<'a> ProfileResolver<'a> {
    /// Create a new profile resolver.
    #[must_use]
    pub const fn new(line: &'a LineClient) -> Self {
        Self { line }
    }

    /// Resolve a user ID to a display name.
    ///
    /// Uses the group-scoped profile endpoint when a group context is
    /// present, the direct one otherwise. Never fails: every lookup error
    /// degrades to [`fallback_display`].
    #[instrument(skip(self))]
    pub async fn resolve(&self, user_id: &str, group_id: Option<&str>) -> String {
        let fetched = match group_id {
            Some(group_id) => self.line.get_group_member_profile(group_id, user_id).await,
            None => self.line.get_profile(user_id).await,
        };

        match fetched {
            Ok(profile) => profile.display_name,
            Err(e) => {
                debug!(error = %e, %user_id, "profile lookup failed, using fallback");
                fallback_display(user_id)
            }
        }
    }
}

/// Obfuscated fallback shown when a profile cannot be fetched: the first
/// eight characters of the user ID plus an ellipsis.
#[must_use]
pub fn fallback_display(user_id: &str) -> String {
    let prefix: String = user_id.chars().take(FALLBACK_PREFIX_CHARS).collect();
    format!("{prefix}…")
}
