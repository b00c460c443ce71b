//! Delivery-backend contract.
//!
//! A backend is a pluggable, carrier-specific implementation of the SMS
//! sending contract. Concrete carriers (Twilio, Nexmo, sandbox and mock
//! variants) live in the infrastructure crate; this module only defines
//! the interface the verification service depends on.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::DeliveryError;

/// Contract every SMS delivery backend must satisfy.
///
/// `send_sms` performs one outbound network call to the carrier.
/// Failures are carrier-specific errors; the verification service
/// catches them, logs them, and degrades gracefully instead of
/// crashing the calling application.
#[async_trait]
pub trait SmsBackend: Send + Sync {
    /// Send `message` to `number` (E.164 format).
    async fn send_sms(&self, number: &str, message: &str) -> Result<(), DeliveryError>;

    /// Optional message-rendering capability.
    ///
    /// A backend that wants full control over the wording returns
    /// `Some(message)`; the service then uses it instead of the
    /// configured template. The default implementation opts out.
    fn generate_message(
        &self,
        security_code: &str,
        context: &HashMap<String, String>,
    ) -> Option<String> {
        let _ = (security_code, context);
        None
    }
}
