// SPDX-FileCopyrightText: 2026 Bento Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the webhook HTTP surface.
//!
//! Drives the axum router directly via `tower::ServiceExt::oneshot` with
//! recording fakes behind the dispatcher, so no network is involved.
//!
//! Run with:
//!   cargo test -p bento --test webhook_e2e

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine;
use bento_agent::testing::{FakeBackend, RecordingLine, ScriptedCompletions};
use bento_agent::{AgentSettings, Dispatcher};
use bento_core::session::MemorySessionStore;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tower::ServiceExt;

type HmacSha256 = Hmac<Sha256>;

const CHANNEL_SECRET: &str = "test-channel-secret";

/// Compute the base64 HMAC-SHA256 signature as the platform would produce it.
fn compute_sig(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

fn settings() -> AgentSettings {
    AgentSettings {
        group_trigger: "bento".into(),
        chat_model: "gpt-4o-2024-08-06".into(),
        vision_model: "gpt-4o".into(),
        travel_model: "gpt-4o-mini".into(),
        max_tokens: 512,
    }
}

struct Harness {
    line: Arc<RecordingLine>,
    app: axum::Router,
}

fn harness(script: Vec<String>) -> Harness {
    let line = Arc::new(RecordingLine::new());
    let dispatcher = Arc::new(Dispatcher::new(
        line.clone(),
        Arc::new(ScriptedCompletions::new(script)),
        Arc::new(FakeBackend::new()),
        Arc::new(MemorySessionStore::default()),
        settings(),
    ));
    let app = bento::webhook::router(bento::webhook::AppState {
        dispatcher,
        channel_secret: Arc::new(CHANNEL_SECRET.to_string()),
    });
    Harness { line, app }
}

fn signed_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header("x-line-signature", compute_sig(CHANNEL_SECRET, body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_returns_ok() {
    let h = harness(vec![]);
    let response = h
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let h = harness(vec![]);
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"events":[]}"#))
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.line.outbound_count(), 0, "no processing before the gate");
}

#[tokio::test]
async fn invalid_signature_is_rejected() {
    let h = harness(vec![]);
    let body = r#"{"events":[]}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header(
            "x-line-signature",
            compute_sig("some-other-secret", body.as_bytes()),
        )
        .body(Body::from(body))
        .unwrap();

    let response = h.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signed_empty_envelope_is_acknowledged() {
    let h = harness(vec![]);
    let response = h.app.oneshot(signed_request(r#"{"events":[]}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn signed_malformed_body_is_still_acknowledged() {
    // A signed but unparsable body must answer 200 to avoid redelivery.
    let h = harness(vec![]);
    let response = h.app.oneshot(signed_request("not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn text_event_is_dispatched_and_replied() {
    let h = harness(vec!["多喝水。".to_string()]);
    let body = r#"{"events":[
        {"type":"message","replyToken":"rt-1",
         "source":{"type":"user","userId":"U1"},
         "message":{"type":"text","id":"m1","text":"怎麼吃比較健康？"}}
    ]}"#;

    let response = h.app.oneshot(signed_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.line.reply_texts(), vec!["多喝水。".to_string()]);
}

#[tokio::test]
async fn events_are_processed_in_order() {
    let h = harness(vec!["第一則回覆".to_string(), "第二則回覆".to_string()]);
    let body = r#"{"events":[
        {"type":"message","replyToken":"rt-1",
         "source":{"type":"user","userId":"U1"},
         "message":{"type":"text","id":"m1","text":"第一個問題"}},
        {"type":"message","replyToken":"rt-2",
         "source":{"type":"user","userId":"U1"},
         "message":{"type":"text","id":"m2","text":"第二個問題"}}
    ]}"#;

    let response = h.app.oneshot(signed_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let replies = h.line.replies.lock().unwrap();
    let tokens: Vec<&str> = replies.iter().map(|(token, _)| token.as_str()).collect();
    assert_eq!(tokens, vec!["rt-1", "rt-2"]);
}

#[tokio::test]
async fn unsupported_event_does_not_block_the_rest() {
    // A sticker message is dropped by the normalizer; the following text
    // event must still be handled.
    let h = harness(vec!["回覆".to_string()]);
    let body = r#"{"events":[
        {"type":"message","replyToken":"rt-1",
         "source":{"type":"user","userId":"U1"},
         "message":{"type":"sticker","id":"m1","packageId":"1","stickerId":"2"}},
        {"type":"message","replyToken":"rt-2",
         "source":{"type":"user","userId":"U1"},
         "message":{"type":"text","id":"m2","text":"還在嗎"}}
    ]}"#;

    let response = h.app.oneshot(signed_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.line.reply_texts(), vec!["回覆".to_string()]);
}

#[tokio::test]
async fn group_text_without_trigger_produces_no_outbound_calls() {
    let h = harness(vec![]);
    let body = r#"{"events":[
        {"type":"message","replyToken":"rt-1",
         "source":{"type":"group","groupId":"G1","userId":"U1"},
         "message":{"type":"text","id":"m1","text":"午餐吃什麼"}}
    ]}"#;

    let response = h.app.oneshot(signed_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(h.line.outbound_count(), 0);
}
