//! Response bodies returned by the webhook and health endpoints.

use serde::{Deserialize, Serialize};

/// Acknowledgement sent for every delivery that could be read.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self {
            success: true,
            message: "Webhook received".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_shape() {
        let ack = serde_json::to_value(WebhookAck::received()).unwrap();
        assert_eq!(ack["success"], true);
        assert_eq!(ack["message"], "Webhook received");
        assert!(chrono::DateTime::parse_from_rfc3339(ack["timestamp"].as_str().unwrap()).is_ok());
    }
}
