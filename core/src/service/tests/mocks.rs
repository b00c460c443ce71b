//! Mock delivery backends shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backends::SmsBackend;
use crate::errors::DeliveryError;

/// Records every message it is asked to send.
#[derive(Default)]
pub struct RecordingBackend {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SmsBackend for RecordingBackend {
    async fn send_sms(&self, number: &str, message: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((number.to_string(), message.to_string()));
        Ok(())
    }
}

/// Always fails with a carrier rejection.
pub struct FailingBackend;

#[async_trait]
impl SmsBackend for FailingBackend {
    async fn send_sms(&self, _number: &str, _message: &str) -> Result<(), DeliveryError> {
        Err(DeliveryError::Rejected {
            message: "number unreachable".to_string(),
        })
    }
}

/// Backend exercising the message-rendering capability override.
#[derive(Default)]
pub struct CustomMessageBackend {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl SmsBackend for CustomMessageBackend {
    async fn send_sms(&self, number: &str, message: &str) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((number.to_string(), message.to_string()));
        Ok(())
    }

    fn generate_message(
        &self,
        security_code: &str,
        context: &HashMap<String, String>,
    ) -> Option<String> {
        let extra = context.get("extra").map(String::as_str).unwrap_or("");
        Some(format!("Custom: {} / {}", security_code, extra))
    }
}
