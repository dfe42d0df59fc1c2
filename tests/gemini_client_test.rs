//! Gemini 클라이언트 테스트
//!
//! 로컬 axum 서버를 Gemini API 대신 띄워 요청 형식과 응답 처리를 검증합니다.

use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    Json, Router,
};
use axum_test::TestServer;
use message_responder::{
    create_test_router_with_mock, error::AppError, AiClientTrait, GeminiClient, GeminiConfig,
    SafetySettings,
};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Captured {
    path: Arc<Mutex<Option<String>>>,
    query: Arc<Mutex<Option<String>>>,
    key: Arc<Mutex<Option<String>>>,
    body: Arc<Mutex<Option<Value>>>,
}

/// 고정 응답을 돌려주는 가짜 Gemini 서버 실행
async fn spawn_fake_gemini(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();

    let app = Router::new()
        .fallback(
            move |State(captured): State<Captured>,
                  uri: Uri,
                  headers: HeaderMap,
                  Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    *captured.path.lock().unwrap() = Some(uri.path().to_string());
                    *captured.query.lock().unwrap() = uri.query().map(str::to_string);
                    *captured.key.lock().unwrap() = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *captured.body.lock().unwrap() = Some(body);
                    (status, Json(reply))
                }
            },
        )
        .with_state(captured.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1beta"), captured)
}

const API_KEY: &str = "SECRET-KEY-123";

fn client_for(api_base: String) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: API_KEY.to_string(),
        model: "gemini-test".to_string(),
        api_base,
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn should_send_prompt_and_safety_settings() {
    // Arrange
    let (base, captured) = spawn_fake_gemini(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hi Ada!"}]},
                "finishReason": "STOP"
            }]
        }),
    )
    .await;
    let client = client_for(base);

    // Act
    let text = client
        .generate("Say hi to Ada", &SafetySettings::default())
        .await
        .unwrap();

    // Assert
    assert_eq!(text, "Hi Ada!");
    assert_eq!(
        captured.path.lock().unwrap().as_deref(),
        Some("/v1beta/models/gemini-test:generateContent")
    );
    assert_eq!(captured.key.lock().unwrap().as_deref(), Some(API_KEY));
    assert!(captured.query.lock().unwrap().is_none());

    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Say hi to Ada");
    assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
    assert!(body["safetySettings"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["threshold"] == "BLOCK_NONE"));
}

#[tokio::test]
async fn http_error_should_be_upstream_failure() {
    let (base, _) = spawn_fake_gemini(
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"code": 429, "message": "Resource has been exhausted"}}),
    )
    .await;
    let client = client_for(base);

    let result = client.generate("hi", &SafetySettings::default()).await;

    assert!(matches!(result, Err(AppError::UpstreamFailure(_))));
}

#[tokio::test]
async fn blocked_prompt_should_be_upstream_failure() {
    let (base, _) = spawn_fake_gemini(
        StatusCode::OK,
        json!({"promptFeedback": {"blockReason": "SAFETY"}}),
    )
    .await;
    let client = client_for(base);

    let result = client.generate("hi", &SafetySettings::default()).await;

    assert!(matches!(result, Err(AppError::UpstreamFailure(_))));
}

/// 바인딩 후 바로 닫아 연결 거부를 유도
async fn unreachable_base() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1beta")
}

#[tokio::test]
async fn unreachable_api_should_be_upstream_failure_without_key() {
    let client = client_for(unreachable_base().await);

    let result = client.health_check().await;

    match result {
        Err(AppError::UpstreamFailure(msg)) => {
            assert!(!msg.contains(API_KEY), "key leaked: {msg}");
            assert!(!msg.contains("generateContent"), "url leaked: {msg}");
        }
        other => panic!("expected UpstreamFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn health_endpoint_should_not_expose_api_key() {
    // Arrange
    let client = client_for(unreachable_base().await);
    let server = TestServer::new(create_test_router_with_mock(None, client)).unwrap();

    // Act
    let response = server.get("/health").await;

    // Assert
    response.assert_status_ok();
    let body = response.text();
    assert!(body.contains("\"unhealthy\""));
    assert!(!body.contains(API_KEY), "key leaked: {body}");
}

#[tokio::test]
async fn upstream_failure_response_should_not_expose_api_key() {
    let client = client_for(unreachable_base().await);
    let server = TestServer::new(create_test_router_with_mock(None, client)).unwrap();

    let response = server
        .post("/api/ai/greeting")
        .json(&json!({"message": "Hello"}))
        .await;

    response.assert_status_internal_server_error();
    assert!(!response.text().contains(API_KEY));
}
