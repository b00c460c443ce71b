//! Error types for configuration, delivery, and session-token handling.
//!
//! Propagation policy: configuration errors are fatal and surface at
//! service construction; delivery errors are recovered locally by the
//! orchestrator (logged, converted to an absent token); token-decode
//! errors always surface to the caller of `verify_security_code` and are
//! never treated as a successful verification.

use thiserror::Error;

/// Configuration errors, surfaced when the settings block is missing or
/// incomplete. Fatal for the operation that needed the settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please define PHONE_VERIFICATION in settings")]
    MissingSettings,

    #[error("Please specify following settings: {}", .keys.join(", "))]
    MissingKeys { keys: Vec<String> },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Invalid MESSAGE template: {reason}")]
    InvalidTemplate { reason: String },

    #[error("Failed to load settings: {message}")]
    Load { message: String },
}

/// Carrier delivery errors raised by [`SmsBackend::send_sms`].
///
/// The orchestrating service treats every variant the same way: log and
/// degrade to "no token issued". The variants exist for diagnostics.
///
/// [`SmsBackend::send_sms`]: crate::backends::SmsBackend::send_sms
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("carrier rejected the request: {message}")]
    Rejected { message: String },

    #[error("carrier authentication failed: {message}")]
    Auth { message: String },

    #[error("carrier rate limit exceeded: {message}")]
    RateLimited { message: String },

    #[error("carrier request failed: {message}")]
    Transport { message: String },
}

/// Session-token decode and replay errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Session token expired")]
    Expired,

    #[error("Session token signature verification failed")]
    InvalidSignature,

    #[error("Malformed session token")]
    Malformed,

    #[error("Session token already used")]
    Replayed,

    #[error("Session token generation failed")]
    GenerationFailed,
}

/// Top-level error type for the verification service.
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

pub type VerificationResult<T> = Result<T, VerificationError>;
