//! Webhook callback endpoint.
//!
//! Deliveries are acknowledged once the body has been read and parsed. The
//! signature outcome is logged but does not change the response.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, Uri},
    response::Json,
};
use serde_json::Value;
use tracing::{debug, error};

use crate::app_state::AppState;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::handlers::response::WebhookAck;
use crate::utils::signature::{verify_hmac_signature, SignatureError};

/// Result of checking the signature header of one delivery.
#[derive(Debug)]
pub enum SignatureOutcome {
    Valid,
    Invalid,
    MissingHeader,
    Rejected(SignatureError),
}

/// Only JSON and textual bodies are accepted.
pub fn is_supported_content_type(content_type: &str) -> bool {
    content_type.contains("application/json") || content_type.contains("text/")
}

/// POST /webhook
pub async fn receive_webhook(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>> {
    debug!("Webhook received");

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if !is_supported_content_type(content_type) {
        return Err(ApiError::UnsupportedContentType);
    }

    let body_text =
        std::str::from_utf8(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    let payload: Value = serde_json::from_str(body_text)?;

    debug!(
        method = %method,
        uri = %uri,
        headers = ?headers,
        body_size = body.len(),
        content_type = %content_type,
        body = %body_text,
        "Webhook delivery"
    );

    match check_signature(&state.config, &headers, &payload) {
        SignatureOutcome::Valid => debug!("Signature is valid"),
        SignatureOutcome::Invalid => error!("Signature is invalid"),
        SignatureOutcome::MissingHeader => error!(
            header = %state.config.signature_header_key,
            "Invalid header format: signature header missing"
        ),
        SignatureOutcome::Rejected(e) => error!(error = %e, "Signature verification failed"),
    }

    Ok(Json(WebhookAck::received()))
}

/// Look up the configured signature header and verify it against `payload`.
pub fn check_signature(config: &Config, headers: &HeaderMap, payload: &Value) -> SignatureOutcome {
    let Some(header_value) = headers
        .get(&config.signature_header_key)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    else {
        return SignatureOutcome::MissingHeader;
    };

    match verify_hmac_signature(payload, header_value, &config.signature) {
        Ok(true) => SignatureOutcome::Valid,
        Ok(false) => SignatureOutcome::Invalid,
        Err(e) => SignatureOutcome::Rejected(e),
    }
}
