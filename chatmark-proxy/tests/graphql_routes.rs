use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chatmark_proxy::{
    config::{ProxyConfig, UpstreamConfig},
    graphql::FALLBACK_REPLY,
    router, AppState, Completion, CompletionBackend, UpstreamError,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Backend returning a canned result and recording prompts.
struct FakeBackend {
    reply: Option<Completion>,
    prompts: Mutex<Vec<(String, u32)>>,
}

impl FakeBackend {
    fn replying(completion: Completion) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(completion),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<Completion, UpstreamError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), max_tokens));
        match &self.reply {
            Some(completion) => Ok(completion.clone()),
            None => Err(UpstreamError::Status {
                status: 401,
                reason: "Unauthorized".into(),
                body: "bad key".into(),
            }),
        }
    }
}

fn config() -> ProxyConfig {
    ProxyConfig {
        listen_addr: "127.0.0.1:0".into(),
        max_body_bytes: 4096,
        upstream: UpstreamConfig {
            base_url: Some("https://api.example.com".into()),
            api_key: None,
            model: "test-model".into(),
            timeout: Duration::from_secs(5),
        },
    }
}

fn app(backend: Arc<FakeBackend>) -> Router {
    router(AppState::new(config(), backend))
}

fn graphql(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn send_message_body(message: &str, conversation: Option<&str>) -> String {
    json!({
        "query": "mutation SendMessage($input: MessageInput!) { sendMessage(input: $input) { id message timestamp conversationId } }",
        "variables": { "input": { "message": message, "conversationId": conversation } }
    })
    .to_string()
}

#[tokio::test]
async fn hello_query() {
    let (status, body) = send(
        app(FakeBackend::failing()),
        graphql(r#"{"query":"query { hello }"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hello"], "Hello from chatmark proxy!");
}

#[tokio::test]
async fn send_message_returns_reply_and_new_conversation() {
    let backend = FakeBackend::replying(Completion::with_reply("**hi** there"));
    let (status, body) = send(app(backend.clone()), graphql(&send_message_body("hello", None))).await;

    assert_eq!(status, StatusCode::OK);
    let reply = &body["data"]["sendMessage"];
    assert_eq!(reply["message"], "**hi** there");
    assert!(!reply["id"].as_str().unwrap().is_empty());
    assert!(!reply["conversationId"].as_str().unwrap().is_empty());
    assert!(reply["timestamp"].as_str().unwrap().contains('T'));

    let prompts = backend.prompts.lock().unwrap();
    assert_eq!(prompts.as_slice(), &[("hello".to_string(), 1000)]);
}

#[tokio::test]
async fn send_message_echoes_conversation_id() {
    let backend = FakeBackend::replying(Completion::with_reply("ok"));
    let (_, body) = send(app(backend), graphql(&send_message_body("hi", Some("conv-7")))).await;
    assert_eq!(body["data"]["sendMessage"]["conversationId"], "conv-7");
}

#[tokio::test]
async fn empty_choices_use_fallback_reply() {
    let backend = FakeBackend::replying(Completion::default());
    let (_, body) = send(app(backend), graphql(&send_message_body("hi", None))).await;
    assert_eq!(body["data"]["sendMessage"]["message"], FALLBACK_REPLY);
}

#[tokio::test]
async fn upstream_failure_is_a_normal_reply() {
    let (status, body) = send(
        app(FakeBackend::failing()),
        graphql(&send_message_body("hi", None)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let message = body["data"]["sendMessage"]["message"].as_str().unwrap();
    assert!(message.starts_with("Error: "), "{message}");
    assert!(message.contains("401"));
}

#[tokio::test]
async fn shape_errors_are_400() {
    let cases = [
        (graphql(""), "Request body is empty"),
        (graphql("{not json"), "Invalid JSON in request body"),
        (graphql(r#"{"variables":{}}"#), "GraphQL query is required"),
        (
            graphql(&send_message_body("", None)),
            "Message is required",
        ),
        (
            graphql(r#"{"query":"subscription { ticks }"}"#),
            "Unsupported GraphQL operation",
        ),
    ];
    for (request, expected) in cases {
        let (status, body) = send(app(FakeBackend::failing()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(body["errors"][0]["message"], expected);
    }
}

#[tokio::test]
async fn wrong_content_type_is_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(r#"{"query":"query { hello }"}"#))
        .unwrap();
    let (status, body) = send(app(FakeBackend::failing()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"][0]["message"],
        "Content-Type must be application/json"
    );
}

#[tokio::test]
async fn health_reports_environment() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(FakeBackend::failing()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"]["hasUpstreamUrl"], true);
    assert_eq!(body["environment"]["hasApiKey"], false);
    assert_eq!(body["environment"]["upstreamUrl"], "https://api.example.com");
}

#[tokio::test]
async fn upstream_check_counts_choices() {
    let backend = FakeBackend::replying(Completion::with_reply("pong"));
    let request = Request::get("/test-upstream").body(Body::empty()).unwrap();
    let (status, body) = send(app(backend.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["details"], "Received response with 1 choices");
    assert_eq!(backend.prompts.lock().unwrap()[0].1, 50);

    let (_, body) = send(
        app(FakeBackend::failing()),
        graphql(r#"{"query":"query { testUpstream { success message details } }"}"#),
    )
    .await;
    assert_eq!(body["data"]["testUpstream"]["success"], false);
    assert_eq!(body["data"]["testUpstream"]["details"], "bad key");
}

#[tokio::test]
async fn preflight_and_fallback() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/graphql")
        .header(header::ORIGIN, "https://chat.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app(FakeBackend::failing()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );

    let request = Request::get("/elsewhere").body(Body::empty()).unwrap();
    let response = app(FakeBackend::failing()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("/graphql"));
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let big = format!(r#"{{"query":"query {{ hello }}","pad":"{}"}}"#, "x".repeat(8192));
    let response = app(FakeBackend::failing()).oneshot(graphql(&big)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn other_methods_follow_the_worker_routing() {
    let request = Request::get("/graphql").body(Body::empty()).unwrap();
    let response = app(FakeBackend::failing()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), 1024).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Endpoints"));

    let backend = FakeBackend::replying(Completion::with_reply("pong"));
    let request = Request::post("/test-upstream").body(Body::empty()).unwrap();
    let (status, body) = send(app(backend), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let request = Request::delete("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(FakeBackend::failing()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
