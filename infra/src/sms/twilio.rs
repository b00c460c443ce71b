//! Twilio SMS backends.
//!
//! `TwilioBackend` calls the Twilio Messages API over HTTPS with basic
//! auth. `TwilioSandboxBackend` accepts the same options but logs the
//! message instead of calling the carrier, for development and staging
//! environments.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use pv_core::errors::DeliveryError;
use pv_core::SmsBackend;

use super::{mask_phone_number, required_option, BackendError};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Production Twilio backend.
///
/// Required options: `sid` (account SID), `secret` (auth token), `from`
/// (a Twilio phone number in E.164 format).
pub struct TwilioBackend {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    api_base: String,
}

impl TwilioBackend {
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, BackendError> {
        let account_sid = required_option(options, "twilio", "sid")?;
        let auth_token = required_option(options, "twilio", "secret")?;
        let from_number = required_option(options, "twilio", "from")?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| BackendError::Init {
                backend: "twilio".to_string(),
                message: e.to_string(),
            })?;

        info!(
            from = %mask_phone_number(&from_number),
            "Twilio backend initialized"
        );

        Ok(Self {
            http,
            account_sid,
            auth_token,
            from_number,
            api_base: TWILIO_API_BASE.to_string(),
        })
    }
}

#[async_trait]
impl SmsBackend for TwilioBackend {
    async fn send_sms(&self, number: &str, message: &str) -> Result<(), DeliveryError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", number),
                ("From", self.from_number.as_str()),
                ("Body", message),
            ])
            .send()
            .await
            .map_err(|e| DeliveryError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(to = %mask_phone_number(number), "Twilio accepted message");
            return Ok(());
        }

        let detail = match response.json::<Value>().await {
            Ok(body) => body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no detail")
                .to_string(),
            Err(_) => "no detail".to_string(),
        };
        error!(
            to = %mask_phone_number(number),
            status = %status,
            detail = %detail,
            "Twilio rejected message"
        );

        Err(match status.as_u16() {
            401 | 403 => DeliveryError::Auth { message: detail },
            429 => DeliveryError::RateLimited { message: detail },
            _ => DeliveryError::Rejected {
                message: format!("{}: {}", status, detail),
            },
        })
    }
}

/// Sandbox variant: validates nothing against the carrier and logs the
/// message instead of sending it.
pub struct TwilioSandboxBackend {
    from_number: Option<String>,
}

impl TwilioSandboxBackend {
    pub fn from_options(options: &HashMap<String, String>) -> Self {
        Self {
            from_number: options.get("from").cloned(),
        }
    }
}

#[async_trait]
impl SmsBackend for TwilioSandboxBackend {
    async fn send_sms(&self, number: &str, message: &str) -> Result<(), DeliveryError> {
        info!(
            to = %mask_phone_number(number),
            from = self.from_number.as_deref().unwrap_or("sandbox"),
            message = message,
            "Twilio sandbox: message not sent to carrier"
        );
        Ok(())
    }
}
