//! Settings loading for the `PHONE_VERIFICATION` block.
//!
//! Sources, later ones overriding earlier: an optional `phone_verify`
//! config file in the working directory, then `PHONE_VERIFICATION__*`
//! environment variables (with `.env` support). Keys are normalized to
//! the canonical uppercase names before validation so every source goes
//! through the same checks in `pv_core`.

use config::{Config, Environment, File};
use serde_json::Value;

use pv_core::config::PhoneVerificationSettings;
use pv_core::errors::ConfigError;

const ENV_PREFIX: &str = "PHONE_VERIFICATION";

/// Loads and validates settings from the default file and environment
/// sources.
pub fn load_settings() -> Result<PhoneVerificationSettings, ConfigError> {
    dotenvy::dotenv().ok();

    let cfg = Config::builder()
        .add_source(File::with_name("phone_verify").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| ConfigError::Load {
            message: e.to_string(),
        })?;

    settings_from_config(cfg)
}

/// Validates settings out of an already-built [`Config`].
pub fn settings_from_config(cfg: Config) -> Result<PhoneVerificationSettings, ConfigError> {
    let raw: Value = cfg.try_deserialize().map_err(|e| ConfigError::Load {
        message: e.to_string(),
    })?;

    let block = normalize_top_level_keys(raw);
    match block.as_object() {
        Some(map) if !map.is_empty() => PhoneVerificationSettings::from_value(Some(&block)),
        _ => Err(ConfigError::MissingSettings),
    }
}

// The config crate lowercases keys; the canonical settings names are
// uppercase. Option keys stay untouched since they are opaque to the
// core.
fn normalize_top_level_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_uppercase(), value))
                .collect(),
        ),
        other => other,
    }
}
