//! `ChatClient` against a mock chat service.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parlor::{Backend, ChatClient, ChatRequest, EndRequest, Message, StartRequest};

fn client(server: &MockServer) -> ChatClient {
    ChatClient::with_options(
        Some(format!("{}/api", server.uri())),
        Some(Duration::from_secs(5)),
    )
    .unwrap()
}

#[tokio::test]
async fn start_posts_json_and_decodes_greeting() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"preference_mode": "guided"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversationStarted": true,
            "user_id": "u-9",
            "response": "Welcome!"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .start(&StartRequest::new(Some("guided".to_string())))
        .await
        .unwrap();

    assert!(response.started());
    assert_eq!(response.user_id.as_deref(), Some("u-9"));
    assert_eq!(response.payload.messages(), vec![Message::bot("Welcome!")]);
}

#[tokio::test]
async fn chat_sends_message_and_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(json!({"message": "cheap", "user_id": "u-9"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": ["bot", "Which part of town?"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .chat(&ChatRequest::new("cheap", Some("u-9".to_string())))
        .await
        .unwrap();

    assert!(!response.is_session_expired());
    assert_eq!(
        response.payload.messages(),
        vec![Message::bot("Which part of town?")]
    );
}

#[tokio::test]
async fn chat_400_with_error_body_is_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "Conversation not started",
            "conversationStarted": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server)
        .chat(&ChatRequest::new("hello", Some("gone".to_string())))
        .await
        .unwrap();
    assert!(response.is_session_expired());
    assert_eq!(
        response.error_message.as_deref(),
        Some("Conversation not started")
    );
}

#[tokio::test]
async fn chat_400_without_error_field_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let err = client(&server)
        .chat(&ChatRequest::new("hello", None))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert!(err.to_string().contains("bad request"));
}

#[tokio::test]
async fn server_error_is_api_error_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/start"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "database down"})))
        .mount(&server)
        .await;

    let err = client(&server)
        .start(&StartRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("database down"));
}

#[tokio::test]
async fn plain_text_reply_is_shown_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Just text, no JSON."))
        .mount(&server)
        .await;

    let response = client(&server)
        .chat(&ChatRequest::new("hi", None))
        .await
        .unwrap();
    assert_eq!(
        response.payload.messages(),
        vec![Message::bot("Just text, no JSON.")]
    );
}

#[tokio::test]
async fn end_posts_user_id_and_ignores_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/end"))
        .and(body_json(json!({"user_id": "u-9"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .end(&EndRequest::new(Some("u-9".to_string())))
        .await
        .unwrap();
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    // Shut the server down so nothing is listening on its port.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let err = ChatClient::with_options(Some(uri), Some(Duration::from_secs(5)))
        .unwrap()
        .start(&StartRequest::default())
        .await
        .unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err:?}");
    assert!(err.status_code().is_none());
}
