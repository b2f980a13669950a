//! End-to-end webhook tests.
//!
//! Each test drives the bot over real HTTP with platform-signed payloads
//! and asserts on the replies and removals captured by the stub LINE API,
//! plus the admin store where a mutation (or its absence) matters.

use guardian_integration_tests::{
    TestContext, join_payload, member_joined_payload, stub_display_name, text_message_payload,
};

use guardian_bot::line::messages::{
    greeting_message, kick_unavailable_message, mention_required_message, not_admin_message,
    promoted_message, roster_message, unauthorized_join_message, unknown_command_message,
    whoami_message,
};

// =============================================================================
// HTTP surface
// =============================================================================

#[tokio::test]
async fn index_returns_status_string() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(&ctx.bot_url)
        .send()
        .await
        .expect("HTTP request failed");

    assert_eq!(resp.status(), 200);
    let body = resp.text().await.expect("body");
    assert_eq!(body, "Guardian bot is running!");
}

#[tokio::test]
async fn callback_get_handshake_returns_ok() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(format!("{}/callback", ctx.bot_url))
        .send()
        .await
        .expect("HTTP request failed");

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.expect("body"), "OK");
}

#[tokio::test]
async fn health_endpoints_respond() {
    let ctx = TestContext::new().await;

    let live = ctx
        .client
        .get(format!("{}/health", ctx.bot_url))
        .send()
        .await
        .expect("HTTP request failed");
    assert_eq!(live.status(), 200);

    let ready = ctx
        .client
        .get(format!("{}/health/ready", ctx.bot_url))
        .send()
        .await
        .expect("HTTP request failed");
    assert_eq!(ready.status(), 200);
}

// =============================================================================
// Signature verification
// =============================================================================

#[tokio::test]
async fn invalid_signature_returns_400_without_processing() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    // A promote payload that would mutate state if it were processed.
    let body = text_message_payload("U1", "Cgroup", "!admin", Some("U2"));
    let resp = ctx.post_webhook_signed(&body, "bm90LXRoZS1zaWduYXR1cmU=").await;

    assert_eq!(resp.status(), 400);
    assert_eq!(ctx.line.state.reply_count(), 0, "no outbound messages");
    assert!(!ctx.is_admin("U2").await, "store must be unchanged");
}

#[tokio::test]
async fn missing_signature_header_returns_400() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(format!("{}/callback", ctx.bot_url))
        .header("Content-Type", "application/json")
        .body(r#"{"events":[]}"#)
        .send()
        .await
        .expect("HTTP request failed");

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn empty_event_batch_is_acknowledged() {
    let ctx = TestContext::new().await;

    let resp = ctx.post_webhook(r#"{"destination":"Ubot","events":[]}"#).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.expect("body"), "OK");
}

// =============================================================================
// Commands
// =============================================================================

#[tokio::test]
async fn list_admins_replies_roster_with_display_names() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;
    ctx.seed_admin("U2").await;

    let body = text_message_payload("U1", "Cgroup", "!admins", None);
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    let expected = roster_message(&[stub_display_name("U1"), stub_display_name("U2")]);
    assert_eq!(ctx.line.state.reply_texts(), vec![expected]);
}

#[tokio::test]
async fn promote_with_mention_adds_admin_and_replies_success() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    let body = text_message_payload("U1", "Cgroup", "!admin", Some("U2"));
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert!(ctx.is_admin("U2").await, "mentioned user must become admin");
    assert_eq!(ctx.line.state.reply_texts(), vec![promoted_message()]);
}

#[tokio::test]
async fn promote_is_idempotent_across_repeated_commands() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    let body = text_message_payload("U1", "Cgroup", "!admin", Some("U2"));
    ctx.post_webhook(&body).await;
    ctx.post_webhook(&body).await;

    assert!(ctx.is_admin("U2").await);
    // Both commands answer with the success reply; the store keeps one row,
    // which the roster reply proves.
    let roster = text_message_payload("U1", "Cgroup", "!admins", None);
    ctx.post_webhook(&roster).await;

    let expected = roster_message(&[stub_display_name("U1"), stub_display_name("U2")]);
    assert_eq!(
        ctx.line.state.reply_texts(),
        vec![
            promoted_message().to_string(),
            promoted_message().to_string(),
            expected,
        ]
    );
}

#[tokio::test]
async fn promote_without_mention_asks_for_mention() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    let body = text_message_payload("U1", "Cgroup", "!admin", None);
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(ctx.line.state.reply_texts(), vec![mention_required_message()]);
}

#[tokio::test]
async fn admin_prefix_text_reaches_promote_branch() {
    // "!adminfoo" falls through the exact "!admins" branch into the
    // "!admin" prefix branch, which then asks for a mention.
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    let body = text_message_payload("U1", "Cgroup", "!adminfoo", None);
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(ctx.line.state.reply_texts(), vec![mention_required_message()]);
}

#[tokio::test]
async fn non_admin_privileged_commands_get_not_admin_reply_and_no_mutation() {
    let ctx = TestContext::new().await;

    for text in ["!admins", "!admin", "!kick", "!frob"] {
        let body = text_message_payload("U3", "Cgroup", text, Some("U4"));
        let resp = ctx.post_webhook(&body).await;
        assert_eq!(resp.status(), 200);
    }

    assert_eq!(
        ctx.line.state.reply_texts(),
        vec![not_admin_message(); 4],
        "every privileged command gets exactly the not-admin reply"
    );
    assert!(!ctx.is_admin("U4").await, "no promotion may happen");
    assert!(
        ctx.line.state.removal_attempts().is_empty(),
        "no removal may happen"
    );
}

#[tokio::test]
async fn whoami_is_ungated_and_echoes_sender() {
    let ctx = TestContext::new().await;

    // U3 is not an admin; whoami must still answer.
    let body = text_message_payload("U3", "Cgroup", "whoami", None);
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(ctx.line.state.reply_texts(), vec![whoami_message("U3")]);
}

#[tokio::test]
async fn whoami_is_case_sensitive() {
    let ctx = TestContext::new().await;

    let body = text_message_payload("U3", "Cgroup", "WhoAmI", None);
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(ctx.line.state.reply_count(), 0, "mixed case is plain chatter");
}

#[tokio::test]
async fn kick_command_replies_stub_and_never_calls_removal() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    let body = text_message_payload("U1", "Cgroup", "!kick", Some("U2"));
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(ctx.line.state.reply_texts(), vec![kick_unavailable_message()]);
    assert!(
        ctx.line.state.removal_attempts().is_empty(),
        "the kick command never reaches the removal API"
    );
}

#[tokio::test]
async fn unknown_command_replies_unknown() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    let body = text_message_payload("U1", "Cgroup", "!frob", None);
    ctx.post_webhook(&body).await;

    assert_eq!(ctx.line.state.reply_texts(), vec![unknown_command_message()]);
}

#[tokio::test]
async fn plain_chatter_gets_no_reply() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    let body = text_message_payload("U1", "Cgroup", "hello there", None);
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(ctx.line.state.reply_count(), 0);
}

// =============================================================================
// Join events
// =============================================================================

#[tokio::test]
async fn join_event_sends_greeting() {
    let ctx = TestContext::new().await;

    let resp = ctx.post_webhook(&join_payload("Cgroup")).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(ctx.line.state.reply_texts(), vec![greeting_message()]);
}

#[tokio::test]
async fn member_joined_by_admin_is_left_alone() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    let body = member_joined_payload("U1", "Cgroup", &["U4", "U5"]);
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert!(ctx.line.state.removal_attempts().is_empty());
    assert_eq!(ctx.line.state.reply_count(), 0);
}

#[tokio::test]
async fn member_joined_by_non_admin_removes_all_and_notifies_once() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    // One removal fails; the other member must still be attempted.
    ctx.line.state.fail_removals_for("U4");

    let body = member_joined_payload("U3", "Cgroup", &["U4", "U5"]);
    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200, "removal failures never break the ack");
    assert_eq!(ctx.line.state.removal_attempts(), vec!["U4", "U5"]);
    assert_eq!(
        ctx.line.state.reply_texts(),
        vec![unauthorized_join_message()],
        "exactly one notice regardless of per-member outcomes"
    );
}

// =============================================================================
// Batches and unknown events
// =============================================================================

#[tokio::test]
async fn unknown_event_type_is_acknowledged() {
    let ctx = TestContext::new().await;

    let body = r#"{"destination":"Ubot","events":[{"type":"unfollow","source":{"type":"user","userId":"U1"}}]}"#;
    let resp = ctx.post_webhook(body).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(ctx.line.state.reply_count(), 0);
}

#[tokio::test]
async fn events_in_one_delivery_are_processed_independently() {
    let ctx = TestContext::new().await;
    ctx.seed_admin("U1").await;

    // A privileged command from a non-admin followed by an unauthorized
    // member addition; both must take effect within one delivery.
    let body = serde_json::json!({
        "destination": "Ubot",
        "events": [
            {
                "type": "message",
                "replyToken": "rt-1",
                "source": {"type": "group", "groupId": "Cgroup", "userId": "U3"},
                "message": {"id": "1", "type": "text", "text": "!admins"},
            },
            {
                "type": "memberJoined",
                "replyToken": "rt-2",
                "source": {"type": "group", "groupId": "Cgroup", "userId": "U3"},
                "joined": {"members": [{"type": "user", "userId": "U6"}]},
            },
        ]
    })
    .to_string();

    let resp = ctx.post_webhook(&body).await;

    assert_eq!(resp.status(), 200);
    assert_eq!(
        ctx.line.state.reply_texts(),
        vec![
            not_admin_message().to_string(),
            unauthorized_join_message().to_string(),
        ]
    );
    assert_eq!(ctx.line.state.removal_attempts(), vec!["U6"]);
}
