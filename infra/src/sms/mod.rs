//! SMS backend implementations and the backend registry.
//!
//! Built-in identifiers:
//!
//! - `twilio` / `twilio_sandbox`: Twilio Messages API, real and log-only
//! - `nexmo` / `nexmo_sandbox`: Nexmo SMS API, real and log-only
//! - `mock`: recording backend for tests and development
//!
//! Custom backends register under their own identifier with
//! [`BackendRegistry::register`]; any type satisfying
//! [`pv_core::SmsBackend`] qualifies.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use pv_core::config::PhoneVerificationSettings;
use pv_core::SmsBackend;

pub mod mock_sms;
pub mod nexmo;
pub mod twilio;

#[cfg(test)]
mod tests;

pub use mock_sms::MockSmsBackend;
pub use nexmo::{NexmoBackend, NexmoSandboxBackend};
pub use twilio::{TwilioBackend, TwilioSandboxBackend};

/// Errors raised while resolving or constructing a delivery backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("unknown backend identifier: {name}")]
    UnknownBackend { name: String },

    #[error("backend {backend} requires option {option}")]
    MissingOption { backend: String, option: String },

    #[error("failed to initialize backend {backend}: {message}")]
    Init { backend: String, message: String },
}

/// Constructs a backend from the configured `OPTIONS` mapping.
pub type BackendFactory =
    Box<dyn Fn(&HashMap<String, String>) -> Result<Arc<dyn SmsBackend>, BackendError> + Send + Sync>;

/// Maps backend identifiers to constructors.
///
/// Resolution happens once at configuration-load time; the resulting
/// backend is shared for the lifetime of the service.
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Empty registry, for hosts that only use custom backends.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in carrier backends.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("twilio", |options| {
            Ok(Arc::new(TwilioBackend::from_options(options)?) as Arc<dyn SmsBackend>)
        });
        registry.register("twilio_sandbox", |options| {
            Ok(Arc::new(TwilioSandboxBackend::from_options(options)) as Arc<dyn SmsBackend>)
        });
        registry.register("nexmo", |options| {
            Ok(Arc::new(NexmoBackend::from_options(options)?) as Arc<dyn SmsBackend>)
        });
        registry.register("nexmo_sandbox", |options| {
            Ok(Arc::new(NexmoSandboxBackend::from_options(options)) as Arc<dyn SmsBackend>)
        });
        registry.register("mock", |_options| {
            Ok(Arc::new(MockSmsBackend::new()) as Arc<dyn SmsBackend>)
        });
        registry
    }

    /// Registers (or replaces) a backend constructor under `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&HashMap<String, String>) -> Result<Arc<dyn SmsBackend>, BackendError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Resolves the backend named by `settings.backend` and constructs
    /// it from `settings.options`.
    pub fn create(
        &self,
        settings: &PhoneVerificationSettings,
    ) -> Result<Arc<dyn SmsBackend>, BackendError> {
        let factory =
            self.factories
                .get(&settings.backend)
                .ok_or_else(|| BackendError::UnknownBackend {
                    name: settings.backend.clone(),
                })?;
        factory(&settings.options)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Masks a phone number for logging, keeping only the last 4 digits.
pub fn mask_phone_number(phone: &str) -> String {
    // Works per character, not per byte, since arbitrary caller input
    // ends up here via log and error paths.
    let (prefix, rest) = match phone.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", phone),
    };

    let chars: Vec<char> = rest.chars().collect();
    if chars.len() <= 4 {
        return format!("{}{}", prefix, "*".repeat(chars.len()));
    }

    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", prefix, "*".repeat(chars.len() - 4), visible)
}

/// Checks E.164 format: leading `+`, then 10 to 15 digits.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let Some(digits) = phone.strip_prefix('+') else {
        return false;
    };
    (10..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

pub(crate) fn required_option(
    options: &HashMap<String, String>,
    backend: &str,
    option: &str,
) -> Result<String, BackendError> {
    options
        .get(option)
        .cloned()
        .ok_or_else(|| BackendError::MissingOption {
            backend: backend.to_string(),
            option: option.to_string(),
        })
}
