//! Main verification service implementation.

use std::collections::HashMap;
use std::sync::Arc;

use constant_time_eq::constant_time_eq;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::backends::SmsBackend;
use crate::code::generate_security_code;
use crate::config::PhoneVerificationSettings;
use crate::errors::{ConfigError, TokenError, VerificationError, VerificationResult};
use crate::message;
use crate::replay::{InMemoryReplayStore, ReplayStore};
use crate::token::{SessionToken, SessionTokenCodec};

/// Service for sending security codes and verifying them against
/// stateless session tokens.
///
/// Each call is self-contained; the only cross-call state is the
/// immutable settings and signing key, plus the replay store when the
/// once-only policy is enabled. Two processes with matching signing keys
/// can validate each other's tokens without coordination.
pub struct PhoneVerificationService {
    settings: PhoneVerificationSettings,
    backend: Arc<dyn SmsBackend>,
    codec: SessionTokenCodec,
    replay: Arc<dyn ReplayStore>,
}

impl PhoneVerificationService {
    /// Creates a service from already-validated settings.
    ///
    /// `signing_key` is the shared secret for session tokens. The
    /// default replay store is in-memory; hosts running several
    /// processes should swap one in via [`with_replay_store`].
    ///
    /// [`with_replay_store`]: PhoneVerificationService::with_replay_store
    pub fn new(
        settings: PhoneVerificationSettings,
        backend: Arc<dyn SmsBackend>,
        signing_key: &[u8],
    ) -> Self {
        let codec = SessionTokenCodec::new(signing_key);
        Self {
            settings,
            backend,
            codec,
            replay: Arc::new(InMemoryReplayStore::new()),
        }
    }

    /// Creates a service from a raw `PHONE_VERIFICATION` settings block,
    /// failing fast with a [`ConfigError`] when the block is absent or
    /// incomplete.
    pub fn from_settings_value(
        block: Option<&Value>,
        backend: Arc<dyn SmsBackend>,
        signing_key: &[u8],
    ) -> Result<Self, ConfigError> {
        let settings = PhoneVerificationSettings::from_value(block)?;
        Ok(Self::new(settings, backend, signing_key))
    }

    /// Replaces the replay store used for the once-only policy.
    pub fn with_replay_store(mut self, replay: Arc<dyn ReplayStore>) -> Self {
        self.replay = replay;
        self
    }

    pub fn settings(&self) -> &PhoneVerificationSettings {
        &self.settings
    }

    /// Generates a security code of the configured length.
    pub fn generate_security_code(&self) -> String {
        generate_security_code(self.settings.token_length)
    }

    /// Builds the outbound message for `security_code`.
    ///
    /// A backend that implements the message-rendering capability takes
    /// precedence over the configured template.
    pub fn generate_message(
        &self,
        security_code: &str,
        context: &HashMap<String, String>,
    ) -> String {
        if let Some(msg) = self.backend.generate_message(security_code, context) {
            return msg;
        }
        message::render(
            &self.settings.message,
            security_code,
            &self.settings.app_name,
            context,
        )
    }

    /// Renders and delivers a security code to `phone`.
    ///
    /// Low-level operation: delivery failures propagate from here. The
    /// higher-level helper is responsible for degrading them.
    pub async fn send_verification(&self, phone: &str, security_code: &str) -> VerificationResult<()> {
        let msg = self.generate_message(security_code, &HashMap::new());
        self.backend.send_sms(phone, &msg).await?;
        debug!(phone = phone, "verification code delivered");
        Ok(())
    }

    /// Generates a security code, attempts delivery, and on success
    /// returns a signed session token embedding the code.
    ///
    /// Best-effort delivery: a carrier failure is logged and degraded to
    /// `Ok(None)` so an outage never crashes the calling application.
    /// Non-delivery errors still propagate.
    pub async fn send_security_code_and_generate_session_token(
        &self,
        phone: &str,
    ) -> VerificationResult<Option<SessionToken>> {
        let security_code = self.generate_security_code();

        if let Err(e) = self.send_verification(phone, &security_code).await {
            match e {
                VerificationError::Delivery(e) => {
                    error!("Error in sending verification code to {}: {}", phone, e);
                    return Ok(None);
                }
                other => return Err(other),
            }
        }

        let token = self.codec.encode(
            phone,
            &security_code,
            0,
            self.settings.security_code_expiration_time,
        )?;
        info!(phone = phone, "issued session token for security code");
        Ok(Some(token))
    }

    /// Verifies a user-submitted code against a session token.
    ///
    /// Decode errors (expired, bad signature, malformed, replayed)
    /// surface to the caller; they are never silently treated as
    /// success. The code comparison is constant-time. With
    /// `VERIFY_SECURITY_CODE_ONLY_ONCE` enabled, the first successful
    /// verification marks the token's session id consumed in the replay
    /// store and every later attempt fails with
    /// [`TokenError::Replayed`]; with the flag off, repeated correct
    /// verifications succeed until the token expires.
    pub async fn verify_security_code(
        &self,
        token: &SessionToken,
        submitted_code: &str,
    ) -> VerificationResult<bool> {
        let claims = self
            .codec
            .decode(token, self.settings.security_code_expiration_time)?;

        if self.settings.verify_security_code_only_once
            && (claims.attempts > 0 || self.replay.is_used(claims.sid).await)
        {
            return Err(TokenError::Replayed.into());
        }

        let matches = constant_time_eq(claims.code.as_bytes(), submitted_code.as_bytes());

        if matches && self.settings.verify_security_code_only_once {
            // Consuming the session id must be atomic with the replay
            // check: two simultaneous correct submissions race here and
            // only the one that marks the id first may succeed.
            if !self
                .replay
                .try_mark_used(claims.sid, claims.expires_at())
                .await
            {
                return Err(TokenError::Replayed.into());
            }
        }

        Ok(matches)
    }
}
