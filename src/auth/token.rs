// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Symmetric-key token codec.
//!
//! Issues and verifies the compact HS256 tokens shared by the identity
//! endpoints, the edge gateway, and the service-side auth gate. The codec
//! is constructed once at startup from the base64-encoded shared secret
//! and owns no other state; `issue` and `verify` are pure computations.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::TokenClaims;
use super::error::AuthError;

/// Encoder/decoder for the shared-secret bearer tokens.
#[derive(Debug)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from the base64-encoded shared secret.
    ///
    /// Fails when the secret is not valid base64; the caller should treat
    /// that as a fatal startup error.
    pub fn new(base64_secret: &str, ttl: Duration) -> Result<Self, AuthError> {
        let encoding = EncodingKey::from_base64_secret(base64_secret)
            .map_err(|e| AuthError::InternalError(format!("invalid signing secret: {e}")))?;
        let decoding = DecodingKey::from_base64_secret(base64_secret)
            .map_err(|e| AuthError::InternalError(format!("invalid signing secret: {e}")))?;

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced exactly; the issuer and validators share one
        // deployment clock.
        validation.leeway = 0;
        validation.validate_aud = false;

        Ok(Self {
            encoding,
            decoding,
            validation,
            ttl,
        })
    }

    /// Issue a token for `subject`, valid from now for the configured TTL.
    pub fn issue(
        &self,
        subject: &str,
        extra: HashMap<String, serde_json::Value>,
    ) -> Result<String, AuthError> {
        self.issue_at(subject, extra, Utc::now().timestamp())
    }

    /// Issue a token with an explicit issued-at timestamp.
    ///
    /// `exp` is always `issued_at + ttl`, so `exp > iat` holds for any
    /// non-zero TTL.
    pub fn issue_at(
        &self,
        subject: &str,
        extra: HashMap<String, serde_json::Value>,
        issued_at: i64,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl.as_secs() as i64,
            extra,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(format!("token encoding failed: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// The signature is checked before the payload is deserialized, so a
    /// tampered token is rejected without its claims ever being surfaced.
    /// Expiry is checked after the signature; an expired-but-authentic
    /// token reports `TokenExpired`, never `InvalidSignature`.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            })
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};

    fn secret() -> String {
        STANDARD.encode(b"finance-tracker-test-secret-finance-tracker")
    }

    fn codec(ttl: Duration) -> TokenCodec {
        TokenCodec::new(&secret(), ttl).expect("codec builds from valid base64")
    }

    #[test]
    fn rejects_non_base64_secret() {
        let err = TokenCodec::new("not base64!!!", Duration::from_secs(60)).unwrap_err();
        assert!(matches!(err, AuthError::InternalError(_)));
    }

    #[test]
    fn issue_and_verify_round_trips_the_subject() {
        let codec = codec(Duration::from_secs(3600));
        let token = codec.issue("alice@example.com", HashMap::new()).unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.exp, claims.iat + 3600);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn extra_claims_survive_the_round_trip() {
        let codec = codec(Duration::from_secs(3600));
        let mut extra = HashMap::new();
        extra.insert("device".to_string(), serde_json::json!("cli"));

        let token = codec.issue("alice@example.com", extra.clone()).unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.extra, extra);
    }

    #[test]
    fn expired_token_reports_expiry_not_signature() {
        // TTL of one second, issued two seconds in the past.
        let codec = codec(Duration::from_secs(1));
        let issued_at = Utc::now().timestamp() - 2;
        let token = codec
            .issue_at("alice@example.com", HashMap::new(), issued_at)
            .unwrap();

        assert_eq!(codec.verify(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn token_signed_with_another_secret_fails_signature_check() {
        let issuer = codec(Duration::from_secs(3600));
        let other = TokenCodec::new(
            &STANDARD.encode(b"a-completely-different-shared-secret!!"),
            Duration::from_secs(3600),
        )
        .unwrap();

        let token = issuer.issue("alice@example.com", HashMap::new()).unwrap();
        assert_eq!(other.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn tampered_payload_fails_before_claims_are_read() {
        let codec = codec(Duration::from_secs(3600));
        let token = codec.issue("alice@example.com", HashMap::new()).unwrap();

        // Swap the payload segment for another one; the signature no longer
        // matches the message.
        let other = codec.issue("mallory@example.com", HashMap::new()).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        parts[1] = other_parts[1];
        let spliced = parts.join(".");

        assert_eq!(codec.verify(&spliced), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_input_is_malformed() {
        let codec = codec(Duration::from_secs(3600));
        assert_eq!(
            codec.verify("invalid.token.string"),
            Err(AuthError::MalformedToken)
        );
        assert_eq!(codec.verify(""), Err(AuthError::MalformedToken));
    }
}
