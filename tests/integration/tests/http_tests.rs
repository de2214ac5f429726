//! HTTP surface: health endpoints and interaction ingress
//!
//! Run with: cargo test -p integration-tests --test http_tests

use std::sync::Arc;

use integration_tests::*;
use raid_bot::server::create_app;
use raid_bot::AppState;
use raid_common::AppConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Serve the app on an ephemeral port and return its base URL
async fn serve(harness: &Harness) -> String {
    let config = AppConfig::from_toml("[store]\nbackend = \"memory\"").unwrap();
    let app = create_app(AppState::new(Arc::clone(&harness.ctx), Arc::new(config)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn interaction(user: u64, channel: u64, command: Value) -> Value {
    let mut body = json!({
        "interaction": { "id": "77", "token": "abc" },
        "guild_id": GUILD,
        "channel_id": channel.to_string(),
        "user_id": user.to_string(),
    });
    if let (Some(body), Some(command)) = (body.as_object_mut(), command.as_object()) {
        body.extend(command.clone());
    }
    body
}

#[tokio::test]
async fn test_root_and_ping() {
    let harness = Harness::new();
    let base = serve(&harness).await;
    let client = reqwest::Client::new();

    let root = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    assert!(root.text().await.unwrap().starts_with("Response created at"));

    let ping = client.get(format!("{base}/ping")).send().await.unwrap();
    assert_eq!(ping.text().await.unwrap(), "pong");
}

#[tokio::test]
async fn test_health_reports_store_and_queue() {
    let harness = Harness::new();
    let base = serve(&harness).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
    assert_eq!(body["queue_open"], true);
}

#[tokio::test]
async fn test_health_after_shutdown_is_unavailable() {
    let mut harness = Harness::new();
    let (worker, _stats) = harness.spawn_worker();
    harness.cancel.cancel();
    worker.await.unwrap();
    let base = serve(&harness).await;

    let response = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "stopping");
}

#[tokio::test]
async fn test_queued_interaction_is_accepted() {
    let mut harness = Harness::configured().await;
    let channel = harness.create_event("Molten Core", "Jan 6", "9 PM").await;
    let base = serve(&harness).await;

    let body = interaction(
        PLAYER.get(),
        channel.get(),
        json!({ "command": "join", "class": "Warrior", "role": "Tank", "name": "Grom" }),
    );
    let response = reqwest::Client::new()
        .post(format!("{base}/interactions"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["status"], "queued");
    assert_eq!(reply["task_id"], 1);

    harness.run_queued().await;
    let record = harness.record(channel).await.unwrap();
    assert!(record.members.contains(PLAYER));
}

#[tokio::test]
async fn test_inline_answer_is_ok() {
    let harness = Harness::configured().await;
    let base = serve(&harness).await;

    let body = interaction(
        CREATOR.get(),
        LOBBY.get(),
        json!({ "command": "create", "name": "Onyxia", "date": "Jan 1", "time": "9 AM" }),
    );
    let response = reqwest::Client::new()
        .post(format!("{base}/interactions"))
        .json(&body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let reply: Value = response.json().await.unwrap();
    assert_eq!(reply["status"], "answered");
    assert!(reply.get("task_id").is_none());
    assert_eq!(
        harness.platform.last_reply_text().unwrap(),
        "The date and time is in the past!"
    );
}

#[tokio::test]
async fn test_malformed_interaction_is_rejected() {
    let harness = Harness::configured().await;
    let base = serve(&harness).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/interactions"))
        .json(&json!({ "command": "dance" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_PAYLOAD");
    assert_eq!(harness.ctx.queue().submitted(), 0);
}
