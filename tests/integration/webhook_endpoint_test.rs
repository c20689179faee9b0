use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderName, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use webhook_receiver::config::LogFormat;
use webhook_receiver::utils::signature::{sign_payload, HmacAlgorithm};
use webhook_receiver::{build_router, AppState, Config, SignatureConfig};

const SIGNATURE_HEADER: &str = "x-webhook-signature";

fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        port: 0,
        signature_header_key: HeaderName::from_static(SIGNATURE_HEADER),
        signature: SignatureConfig::new("topsecret", "https://example.com/webhook"),
        request_timeout: 30,
        log_format: LogFormat::Pretty,
    }
}

fn app() -> Router {
    build_router(AppState::new(test_config()))
}

fn signed_header(payload: &Value) -> String {
    let now = chrono::Utc::now().timestamp();
    sign_payload(
        payload,
        &test_config().signature,
        HmacAlgorithm::Sha256,
        now,
        "abc123",
    )
    .unwrap()
}

fn webhook_request(content_type: &str, signature: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/webhook")
        .header(CONTENT_TYPE, content_type);
    if let Some(signature) = signature {
        builder = builder.header(SIGNATURE_HEADER, signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn assert_acknowledged(body: &Value) {
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Webhook received");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_check() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_check_accepts_any_method() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_valid_signature_is_acknowledged() {
    let payload = json!({"b": 2, "a": 1});
    let header = signed_header(&payload);

    let response = app()
        .oneshot(webhook_request("application/json", Some(&header), r#"{"b":2,"a":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_acknowledged(&json_body(response).await);
}

#[tokio::test]
async fn test_reordered_body_still_acknowledged() {
    // The sender signed one key order and delivered another.
    let header = signed_header(&json!({"a": 1, "b": 2}));

    let response = app()
        .oneshot(webhook_request("text/plain", Some(&header), r#"{"b":2,"a":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_acknowledged(&json_body(response).await);
}

#[tokio::test]
async fn test_invalid_signature_is_still_acknowledged() {
    let header = format!("sha256={},{},abc123", "0".repeat(64), chrono::Utc::now().timestamp());

    let response = app()
        .oneshot(webhook_request("application/json", Some(&header), r#"{"a":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_acknowledged(&json_body(response).await);
}

#[tokio::test]
async fn test_malformed_and_missing_signature_are_still_acknowledged() {
    for signature in [Some("abc,def"), Some("nodelimiter,1700000000,nonce"), None] {
        let response = app()
            .oneshot(webhook_request("application/json", signature, r#"{"a":1}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "{signature:?}");
        assert_acknowledged(&json_body(response).await);
    }
}

#[tokio::test]
async fn test_unsupported_content_type_is_rejected() {
    let response = app()
        .oneshot(webhook_request("application/octet-stream", None, r#"{"a":1}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Unsupported content type");
}

#[tokio::test]
async fn test_invalid_json_is_rejected() {
    let response = app()
        .oneshot(webhook_request("application/json", None, "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Not Found");
}

#[tokio::test]
async fn test_get_webhook_is_not_found() {
    let response = app()
        .oneshot(Request::builder().uri("/webhook").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
