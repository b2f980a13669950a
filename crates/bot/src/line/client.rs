//! LINE Messaging API client.
//!
//! Provides methods for replying to events, fetching profiles, removing
//! group members, and verifying webhook signatures.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{debug, error, instrument};

use super::error::LineError;
use super::types::{ApiErrorResponse, OutgoingMessage, Profile, ReplyRequest};

/// LINE Messaging API client.
#[derive(Clone)]
pub struct LineClient {
    /// HTTP client.
    client: Client,
    /// Channel access token for authentication.
    channel_access_token: SecretString,
    /// Channel secret for verifying webhooks.
    channel_secret: SecretString,
    /// Messaging API origin.
    api_base: String,
}

impl std::fmt::Debug for LineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineClient")
            .field("channel_access_token", &"[REDACTED]")
            .field("channel_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl LineClient {
    /// Create a new LINE client.
    #[must_use]
    pub fn new(
        channel_access_token: SecretString,
        channel_secret: SecretString,
        api_base: String,
    ) -> Self {
        Self {
            client: Client::new(),
            channel_access_token,
            channel_secret,
            api_base,
        }
    }

    /// Send reply messages for an inbound event.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the platform rejects the
    /// reply (e.g., expired reply token).
    #[instrument(skip(self, messages))]
    pub async fn reply(
        &self,
        reply_token: &str,
        messages: Vec<OutgoingMessage>,
    ) -> Result<(), LineError> {
        let request = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        let response = self
            .client
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(self.channel_access_token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| LineError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            error!(%status, %message, "LINE API error sending reply");
            return Err(LineError::Api(format!("{status}: {message}")));
        }

        debug!("Reply sent");

        Ok(())
    }

    /// Send a single text reply (convenience method).
    ///
    /// # Errors
    ///
    /// Returns error if replying fails.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), LineError> {
        self.reply(reply_token, vec![OutgoingMessage::text(text)])
            .await
    }

    /// Fetch a user's profile.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user is not reachable
    /// (e.g., has not friended the bot).
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, LineError> {
        self.get_json(&format!("{}/v2/bot/profile/{user_id}", self.api_base))
            .await
    }

    /// Fetch a user's profile scoped to a group.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the user is not a member of
    /// the group.
    #[instrument(skip(self))]
    pub async fn get_group_member_profile(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Profile, LineError> {
        self.get_json(&format!(
            "{}/v2/bot/group/{group_id}/member/{user_id}",
            self.api_base
        ))
        .await
    }

    /// Remove a member from a group.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the platform refuses the
    /// removal (insufficient bot permissions, member already gone).
    #[instrument(skip(self))]
    pub async fn remove_group_member(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), LineError> {
        let response = self
            .client
            .delete(format!(
                "{}/v2/bot/group/{group_id}/member/{user_id}",
                self.api_base
            ))
            .bearer_auth(self.channel_access_token.expose_secret())
            .send()
            .await
            .map_err(|e| LineError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(LineError::Api(format!("{status}: {message}")));
        }

        debug!("Group member removed");

        Ok(())
    }

    /// Verify a LINE webhook signature.
    ///
    /// The signature is the base64-encoded HMAC-SHA256 digest of the raw
    /// request body, keyed with the channel secret, delivered in the
    /// `X-Line-Signature` header:
    /// <https://developers.line.biz/en/reference/messaging-api/#signature-validation>
    ///
    /// # Arguments
    ///
    /// * `body` - The raw request body
    /// * `signature` - The `X-Line-Signature` header value
    ///
    /// # Errors
    ///
    /// Returns error if signature verification fails.
    #[instrument(skip(self, body, signature))]
    pub fn verify_signature(&self, body: &str, signature: &str) -> Result<(), LineError> {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.channel_secret.expose_secret().as_bytes())
                .map_err(|e| LineError::InvalidSignature(e.to_string()))?;

        mac.update(body.as_bytes());

        let expected = BASE64.encode(mac.finalize().into_bytes());

        // Constant-time comparison
        if !constant_time_compare(&expected, signature) {
            return Err(LineError::InvalidSignature("Signature mismatch".to_string()));
        }

        debug!("LINE signature verified");

        Ok(())
    }

    /// `GET` a JSON body with bearer auth.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, LineError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(self.channel_access_token.expose_secret())
            .send()
            .await
            .map_err(|e| LineError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ApiErrorResponse>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(LineError::Api(format!("{status}: {message}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LineError::Response(e.to_string()))
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
