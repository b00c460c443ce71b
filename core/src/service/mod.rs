//! Verification service module.
//!
//! Orchestrates the full verification cycle: code generation, message
//! rendering, carrier delivery, session-token issuance, and the inverse
//! decode/compare/replay-check path.

mod service;

#[cfg(test)]
mod tests;

pub use service::PhoneVerificationService;
