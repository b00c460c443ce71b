//! Nexmo (Vonage) SMS backends.
//!
//! Nexmo reports delivery failures inside a successful HTTP response:
//! each message in the body carries a status code, `"0"` meaning
//! accepted. Anything else is treated as a carrier rejection.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use pv_core::errors::DeliveryError;
use pv_core::SmsBackend;

use super::{mask_phone_number, required_option, BackendError};

const NEXMO_API_URL: &str = "https://rest.nexmo.com/sms/json";
const REQUEST_TIMEOUT_SECS: u64 = 30;

// Nexmo per-message status codes that map to specific error kinds.
const STATUS_THROTTLED: &str = "1";
const STATUS_INVALID_CREDENTIALS: &str = "4";

/// Production Nexmo backend.
///
/// Required options: `key` (API key), `secret` (API secret), `from`
/// (sender id or number).
pub struct NexmoBackend {
    http: reqwest::Client,
    api_key: String,
    api_secret: String,
    from: String,
    api_url: String,
}

impl NexmoBackend {
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, BackendError> {
        let api_key = required_option(options, "nexmo", "key")?;
        let api_secret = required_option(options, "nexmo", "secret")?;
        let from = required_option(options, "nexmo", "from")?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Init {
                backend: "nexmo".to_string(),
                message: e.to_string(),
            })?;

        info!(from = %from, "Nexmo backend initialized");

        Ok(Self {
            http,
            api_key,
            api_secret,
            from,
            api_url: NEXMO_API_URL.to_string(),
        })
    }
}

#[async_trait]
impl SmsBackend for NexmoBackend {
    async fn send_sms(&self, number: &str, message: &str) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(&self.api_url)
            .form(&[
                ("api_key", self.api_key.as_str()),
                ("api_secret", self.api_secret.as_str()),
                ("from", self.from.as_str()),
                ("to", number.trim_start_matches('+')),
                ("text", message),
            ])
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Transport {
                message: format!("unexpected HTTP status {}", status),
            });
        }

        let body: Value = response.json().await.map_err(|e| DeliveryError::Transport {
            message: format!("unreadable response body: {}", e),
        })?;

        let first = body
            .get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.first())
            .ok_or_else(|| DeliveryError::Transport {
                message: "response carried no message status".to_string(),
            })?;
        let message_status = first.get("status").and_then(Value::as_str).unwrap_or("");

        if message_status == "0" {
            debug!(to = %mask_phone_number(number), "Nexmo accepted message");
            return Ok(());
        }

        let detail = first
            .get("error-text")
            .and_then(Value::as_str)
            .unwrap_or("no detail")
            .to_string();
        error!(
            to = %mask_phone_number(number),
            status = message_status,
            detail = %detail,
            "Nexmo rejected message"
        );

        Err(match message_status {
            STATUS_THROTTLED => DeliveryError::RateLimited { message: detail },
            STATUS_INVALID_CREDENTIALS => DeliveryError::Auth { message: detail },
            _ => DeliveryError::Rejected {
                message: format!("status {}: {}", message_status, detail),
            },
        })
    }
}

/// Sandbox variant: logs the message instead of calling the carrier.
pub struct NexmoSandboxBackend {
    from: Option<String>,
}

impl NexmoSandboxBackend {
    pub fn from_options(options: &HashMap<String, String>) -> Self {
        Self {
            from: options.get("from").cloned(),
        }
    }
}

#[async_trait]
impl SmsBackend for NexmoSandboxBackend {
    async fn send_sms(&self, number: &str, message: &str) -> Result<(), DeliveryError> {
        info!(
            to = %mask_phone_number(number),
            from = self.from.as_deref().unwrap_or("sandbox"),
            message = message,
            "Nexmo sandbox: message not sent to carrier"
        );
        Ok(())
    }
}
