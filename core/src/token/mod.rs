//! Stateless session-token codec.
//!
//! A session token is a signed, self-contained blob carrying the phone
//! number, the security code, the verification-attempt counter, and the
//! issue/expiry timestamps. Because the token itself is the session, no
//! server-side store is needed: any process holding the signing key can
//! verify a token issued by any other.

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::TokenError;

/// An opaque signed session token.
///
/// Issued once per send-verification call and echoed back by the client
/// alongside the user-entered code. Any tampering with the payload or
/// signature makes decoding fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for SessionToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Claims embedded in a session token. The signature covers all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Phone number the code was sent to (E.164).
    pub phone: String,
    /// The security code itself.
    pub code: String,
    /// Number of successful verifications already performed with this token.
    pub attempts: u32,
    /// Unique session id, used for replay tracking.
    pub sid: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiry timestamp (seconds since epoch), `iat + expires_in`.
    pub exp: i64,
}

impl SessionClaims {
    /// Expiry as a UTC timestamp, for replay-store pruning.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

/// Encodes and decodes session tokens with a keyed HS256 signature.
pub struct SessionTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionTokenCodec {
    /// Creates a codec signing with `signing_key`.
    ///
    /// Expiry is checked explicitly against `max_age` in [`decode`] with
    /// no leeway, so the built-in `exp` validation is disabled.
    ///
    /// [`decode`]: SessionTokenCodec::decode
    pub fn new(signing_key: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            validation,
        }
    }

    /// Issues a token for `(phone, code)` expiring `expires_in` seconds
    /// from now, with the given verification-attempt counter.
    pub fn encode(
        &self,
        phone: &str,
        code: &str,
        attempts: u32,
        expires_in: i64,
    ) -> Result<SessionToken, TokenError> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            phone: phone.to_string(),
            code: code.to_string(),
            attempts,
            sid: Uuid::new_v4(),
            iat: now,
            exp: now + expires_in,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(SessionToken)
            .map_err(|_| TokenError::GenerationFailed)
    }

    /// Verifies and decodes a token.
    ///
    /// Fails with [`TokenError::Expired`] when `now > iat + max_age`,
    /// [`TokenError::InvalidSignature`] when the signature does not
    /// verify (tampering or a mismatched signing key), and
    /// [`TokenError::Malformed`] when the blob cannot be parsed.
    pub fn decode(&self, token: &SessionToken, max_age: i64) -> Result<SessionClaims, TokenError> {
        self.decode_at(token, max_age, Utc::now())
    }

    pub(crate) fn decode_at(
        &self,
        token: &SessionToken,
        max_age: i64,
        now: DateTime<Utc>,
    ) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token.as_str(), &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        let claims = data.claims;
        if now.timestamp() > claims.iat + max_age {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const KEY: &[u8] = b"test-signing-key-0123456789";
    const PHONE: &str = "+13478379634";

    fn codec() -> SessionTokenCodec {
        SessionTokenCodec::new(KEY)
    }

    #[test]
    fn round_trip_preserves_phone_and_code() {
        let codec = codec();
        let token = codec.encode(PHONE, "123456", 0, 300).unwrap();
        let claims = codec.decode(&token, 300).unwrap();

        assert_eq!(claims.phone, PHONE);
        assert_eq!(claims.code, "123456");
        assert_eq!(claims.attempts, 0);
        assert_eq!(claims.exp, claims.iat + 300);
    }

    #[test]
    fn expires_after_max_age() {
        let codec = codec();
        let token = codec.encode(PHONE, "123456", 0, 1).unwrap();
        let claims = codec.decode(&token, 1).unwrap();

        let just_before = claims.expires_at();
        assert!(codec.decode_at(&token, 1, just_before).is_ok());

        let just_after = just_before + Duration::seconds(1);
        assert_eq!(
            codec.decode_at(&token, 1, just_after),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn mismatched_key_fails_signature_check() {
        let token = codec().encode(PHONE, "123456", 0, 300).unwrap();
        let other = SessionTokenCodec::new(b"a-different-signing-key");

        assert_eq!(
            other.decode(&token, 300),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_payload_never_decodes() {
        let codec = codec();
        let token = codec.encode(PHONE, "123456", 0, 300).unwrap();
        let raw = token.as_str();

        // Flip one character in every position of the token; decoding
        // must fail with a signature or parse error, never succeed with
        // altered content.
        for i in 0..raw.len() {
            let mut bytes = raw.as_bytes().to_vec();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let Ok(tampered) = String::from_utf8(bytes) else {
                continue;
            };
            if tampered == raw {
                continue;
            }

            let err = codec
                .decode(&SessionToken::from(tampered), 300)
                .expect_err("tampered token must not decode");
            assert!(matches!(
                err,
                TokenError::InvalidSignature | TokenError::Malformed
            ));
        }
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert_eq!(
            codec.decode(&SessionToken::from("not-a-token".to_string()), 300),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            codec.decode(&SessionToken::from(String::new()), 300),
            Err(TokenError::Malformed)
        );
    }
}
