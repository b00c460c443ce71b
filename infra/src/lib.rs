//! # PhoneVerify Infrastructure
//!
//! Concrete delivery backends for the verification core, plus the
//! registry that resolves a configured backend identifier to an
//! implementation and the settings loader that reads the
//! `PHONE_VERIFICATION` block from files and the environment.

// Re-export core error types for convenience
pub use pv_core::errors::*;

pub mod settings;
pub mod sms;

pub use sms::{BackendError, BackendRegistry, MockSmsBackend};
