//! Mock SMS backend for development and testing.
//!
//! Records messages instead of sending them, validates numbers the same
//! way the real backends do, and can simulate carrier failures.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use pv_core::errors::DeliveryError;
use pv_core::SmsBackend;

use super::{is_valid_phone_number, mask_phone_number};

/// Recording backend: every accepted message lands in `sent_messages`.
#[derive(Clone, Default)]
pub struct MockSmsBackend {
    sent_messages: Arc<Mutex<Vec<(String, String)>>>,
    message_count: Arc<AtomicU64>,
    simulate_failure: bool,
}

impl MockSmsBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock that fails every send, for exercising delivery-failure
    /// handling.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Messages accepted so far, as `(number, message)` pairs.
    pub fn sent_messages(&self) -> Vec<(String, String)> {
        self.sent_messages.lock().unwrap().clone()
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmsBackend for MockSmsBackend {
    async fn send_sms(&self, number: &str, message: &str) -> Result<(), DeliveryError> {
        if !is_valid_phone_number(number) {
            return Err(DeliveryError::Rejected {
                message: format!("invalid phone number format: {}", mask_phone_number(number)),
            });
        }

        if self.simulate_failure {
            warn!(
                to = %mask_phone_number(number),
                "mock backend simulating carrier failure"
            );
            return Err(DeliveryError::Transport {
                message: "simulated SMS sending failure".to_string(),
            });
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        self.sent_messages
            .lock()
            .unwrap()
            .push((number.to_string(), message.to_string()));

        info!(
            provider = "mock",
            to = %mask_phone_number(number),
            message_id = %message_id,
            count = count,
            "mock SMS recorded"
        );
        Ok(())
    }
}
