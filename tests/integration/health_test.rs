use super::common;

use common::test_server::TestServer;
use serde_json::json;

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_provider"], "scripted");
    assert!(body["uptime_seconds"].is_number());
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_live_endpoint() {
    let server = TestServer::new().await;
    let client = reqwest::Client::new();

    let response = client
        .get(server.url("/health/live"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_chat_over_http_populates_agent_cache() {
    let server = TestServer::new().await;
    server.llm.push_text("Hello!");
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(server.url("/auth/new-account"))
        .json(&json!({"email": "s@t.u", "password": "pw"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = body["sessionToken"].as_str().unwrap().to_string();

    let body: serde_json::Value = client
        .post(server.url("/chat/new-chat"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let chat_id = body["chatId"].as_str().unwrap().to_string();

    let response = client
        .post(server.url("/chat/student-response"))
        .header("Authorization", &token)
        .json(&json!({"chatId": chat_id, "prompt": "Hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["response"], "Hello!");

    let health: serde_json::Value = client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["live_agents"], 1);
}
