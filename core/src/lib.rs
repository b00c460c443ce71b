//! # PhoneVerify Core
//!
//! Core verification-token lifecycle for SMS phone verification.
//! This crate contains the security-code generator, the message renderer,
//! the delivery-backend contract, the stateless session-token codec, and
//! the verification service that orchestrates them.
//!
//! No persistence layer is required: all per-verification state lives in
//! the signed session token, plus an optional replay store when tokens
//! must be single-use.

pub mod backends;
pub mod code;
pub mod config;
pub mod errors;
pub mod message;
pub mod replay;
pub mod service;
pub mod token;

// Re-export commonly used types for convenience
pub use backends::SmsBackend;
pub use config::PhoneVerificationSettings;
pub use errors::{ConfigError, DeliveryError, TokenError, VerificationError, VerificationResult};
pub use replay::{InMemoryReplayStore, ReplayStore};
pub use service::PhoneVerificationService;
pub use token::{SessionClaims, SessionToken, SessionTokenCodec};
