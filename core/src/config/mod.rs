//! Settings block for the verification service.
//!
//! The host application supplies a `PHONE_VERIFICATION` block; it is
//! validated once here and then passed into the service as an immutable
//! value. Reconfiguration means constructing a new service, never
//! mutating shared state.

use std::collections::HashMap;

use serde_json::Value;

use crate::code::MAX_TOKEN_LENGTH;
use crate::errors::ConfigError;
use crate::message;

/// Canonical names of the required settings keys.
pub const REQUIRED_KEYS: [&str; 7] = [
    "BACKEND",
    "OPTIONS",
    "MESSAGE",
    "APP_NAME",
    "SECURITY_CODE_EXPIRATION_TIME",
    "TOKEN_LENGTH",
    "VERIFY_SECURITY_CODE_ONLY_ONCE",
];

/// Validated, immutable verification settings.
#[derive(Debug, Clone)]
pub struct PhoneVerificationSettings {
    /// Backend identifier, resolved to a delivery backend by the registry.
    pub backend: String,
    /// Backend-specific credentials and options, opaque to the core.
    pub options: HashMap<String, String>,
    /// Message template with `{security_code}`, `{app}`, and arbitrary
    /// `{context_key}` placeholders.
    pub message: String,
    /// Application name substituted for `{app}`.
    pub app_name: String,
    /// Seconds before a security code (and its session token) expires.
    pub security_code_expiration_time: i64,
    /// Number of digits in a security code.
    pub token_length: usize,
    /// Whether a session token may verify successfully at most once.
    pub verify_security_code_only_once: bool,
}

impl PhoneVerificationSettings {
    /// Builds validated settings from the raw `PHONE_VERIFICATION` block.
    ///
    /// `None` means the block is absent entirely; that and an incomplete
    /// block both fail fast, naming what is missing. Values are also
    /// type- and range-checked here so later stages never see a bad
    /// configuration.
    pub fn from_value(block: Option<&Value>) -> Result<Self, ConfigError> {
        let Some(block) = block else {
            return Err(ConfigError::MissingSettings);
        };
        let Some(map) = block.as_object() else {
            return Err(ConfigError::MissingSettings);
        };

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| !map.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys { keys: missing });
        }

        let backend = string_value(map, "BACKEND")?;
        let options = options_value(&map["OPTIONS"])?;
        let message = string_value(map, "MESSAGE")?;
        let app_name = string_value(map, "APP_NAME")?;
        let security_code_expiration_time =
            int_value(map, "SECURITY_CODE_EXPIRATION_TIME")?;
        let token_length = int_value(map, "TOKEN_LENGTH")? as usize;
        let verify_security_code_only_once = bool_value(map, "VERIFY_SECURITY_CODE_ONLY_ONCE")?;

        let settings = Self {
            backend,
            options,
            message,
            app_name,
            security_code_expiration_time,
            token_length,
            verify_security_code_only_once,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.token_length < 1 || self.token_length > MAX_TOKEN_LENGTH {
            return Err(ConfigError::InvalidValue {
                key: "TOKEN_LENGTH".to_string(),
                reason: format!(
                    "must be between 1 and {}, got {}",
                    MAX_TOKEN_LENGTH, self.token_length
                ),
            });
        }
        if self.security_code_expiration_time <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "SECURITY_CODE_EXPIRATION_TIME".to_string(),
                reason: "must be a positive number of seconds".to_string(),
            });
        }
        message::validate_template(&self.message)
    }
}

fn string_value(
    map: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<String, ConfigError> {
    map[key]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: "expected a string".to_string(),
        })
}

fn int_value(map: &serde_json::Map<String, Value>, key: &str) -> Result<i64, ConfigError> {
    map[key].as_i64().ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: "expected an integer".to_string(),
    })
}

fn bool_value(map: &serde_json::Map<String, Value>, key: &str) -> Result<bool, ConfigError> {
    map[key].as_bool().ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: "expected a boolean".to_string(),
    })
}

fn options_value(value: &Value) -> Result<HashMap<String, String>, ConfigError> {
    let Some(object) = value.as_object() else {
        return Err(ConfigError::InvalidValue {
            key: "OPTIONS".to_string(),
            reason: "expected an object".to_string(),
        });
    };

    object
        .iter()
        .map(|(key, value)| {
            value
                .as_str()
                .map(|v| (key.clone(), v.to_string()))
                .ok_or_else(|| ConfigError::InvalidValue {
                    key: format!("OPTIONS.{}", key),
                    reason: "expected a string".to_string(),
                })
        })
        .collect()
}
