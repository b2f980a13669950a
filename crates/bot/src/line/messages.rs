//! Reply texts sent by the bot.
//!
//! Every user-visible string lives here so wording is consistent and
//! testable. Errors shown to chat users are freeform emoji-prefixed text,
//! never structured error codes.

/// Reply for a privileged command from a non-admin sender.
#[must_use]
pub const fn not_admin_message() -> &'static str {
    "❌ You are not an admin."
}

/// Roster reply listing the current admins by display name.
#[must_use]
pub fn roster_message(names: &[String]) -> String {
    format!("👑 Current admins:\n{}", names.join("\n"))
}

/// Reply after a successful promotion.
#[must_use]
pub const fn promoted_message() -> &'static str {
    "✅ User promoted to admin."
}

/// Reply to a promote command that mentions nobody.
#[must_use]
pub const fn mention_required_message() -> &'static str {
    "⚠️ Please mention a user to promote."
}

/// Reply to the kick command. Kicking via command stays unavailable on
/// purpose; the membership guard is the only path that removes members.
#[must_use]
pub const fn kick_unavailable_message() -> &'static str {
    "❌ Sorry, I cannot kick users automatically."
}

/// Reply to an unrecognized `!`-command.
#[must_use]
pub const fn unknown_command_message() -> &'static str {
    "⚠️ Unknown command."
}

/// Reply telling the sender their own user ID.
#[must_use]
pub fn whoami_message(user_id: &str) -> String {
    format!("Your user ID: {user_id}")
}

/// Greeting sent when the bot is added to a chat.
#[must_use]
pub const fn greeting_message() -> &'static str {
    "👋 Guardian is online and watching this group!"
}

/// Notice sent after reverting an unauthorized member addition.
#[must_use]
pub const fn unauthorized_join_message() -> &'static str {
    "🚫 Reverted an unauthorized member addition. Only admins may add members."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_message_joins_names_with_newlines() {
        let names = vec!["Alice".to_string(), "Bob".to_string()];
        assert_eq!(roster_message(&names), "👑 Current admins:\nAlice\nBob");
    }

    #[test]
    fn test_whoami_message_contains_user_id() {
        assert_eq!(whoami_message("U123"), "Your user ID: U123");
    }
}
