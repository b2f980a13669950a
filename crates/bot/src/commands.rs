//! Command parsing for inbound text messages.
//!
//! [`parse`] maps already-trimmed message text to an [`Intent`]. Matching is
//! case-sensitive. Branch precedence matters and is fixed here: exact
//! matches are checked before prefix matches, so `!admins` is the roster
//! command while `!adminfoo` still reaches the promote branch.

/// The parsed meaning of an inbound text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// `!admins` (exact): list the admin roster.
    ListAdmins,
    /// `!admin...` (prefix): promote the mentioned user.
    PromoteAdmin,
    /// `!kick...` (prefix): kick request (always answered with a stub).
    KickRequest,
    /// Any other `!`-prefixed text.
    UnknownCommand,
    /// `whoami` (exact): echo the sender's user ID.
    WhoAmI,
    /// Anything else: not addressed to the bot.
    Ignore,
}

impl Intent {
    /// Whether this intent requires the sender to be an admin.
    ///
    /// Exactly the `!`-prefixed intents are privileged; `WhoAmI` and
    /// `Ignore` are never gated.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(
            self,
            Self::ListAdmins | Self::PromoteAdmin | Self::KickRequest | Self::UnknownCommand
        )
    }
}

/// Parse trimmed message text into an [`Intent`].
///
/// Exact matches (`!admins`, `whoami`) are evaluated before prefix matches
/// (`!admin`, `!kick`); reordering the arms changes behavior.
#[must_use]
pub fn parse(text: &str) -> Intent {
    match text {
        "!admins" => Intent::ListAdmins,
        "whoami" => Intent::WhoAmI,
        _ if text.starts_with("!admin") => Intent::PromoteAdmin,
        _ if text.starts_with("!kick") => Intent::KickRequest,
        _ if text.starts_with('!') => Intent::UnknownCommand,
        _ => Intent::Ignore,
    }
}
