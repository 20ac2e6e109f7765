// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(account): Auth) -> impl IntoResponse {
//!     // account is AuthenticatedAccount
//! }
//! ```
//!
//! This is the service-internal half of the two-layer auth design: even
//! though the edge gateway has already validated the token, the extractor
//! verifies it again from scratch and resolves the subject against the
//! account store. A request forged past the edge still fails here. There
//! is no allow-list — every protected operation resolves an identity or
//! fails closed.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedAccount};
use crate::state::AppState;

/// Extractor for authenticated callers.
pub struct Auth(pub AuthenticatedAccount);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A middleware or test may have resolved the caller already.
        if let Some(account) = parts.extensions.get::<AuthenticatedAccount>().cloned() {
            return Ok(Auth(account));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?
            .trim();

        let claims = state.codec.verify(token)?;

        // The subject must resolve to a stored account; handlers never see
        // a raw token, only the resolved identity.
        let account = state
            .db
            .find_account_by_email(&claims.sub)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .ok_or(AuthError::UnknownAccount)?;

        Ok(Auth(AuthenticatedAccount {
            account_id: account.id,
            email: account.email,
            role: account.role,
            expires_at: claims.exp,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenCodec;
    use crate::ledger::LedgerDb;
    use crate::models::AccountRole;
    use axum::http::Request;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let db = LedgerDb::open(&temp_dir.path().join("ledger.redb")).expect("db opens");
        let codec = TokenCodec::new(
            &STANDARD.encode(b"extractor-test-secret-extractor-test"),
            Duration::from_secs(3600),
        )
        .expect("codec builds");
        (AppState::new(db, codec), temp_dir)
    }

    fn parts_with_header(value: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_fails_closed() {
        let (state, _dir) = create_test_state();
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn non_bearer_header_is_rejected() {
        let (state, _dir) = create_test_state();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwdw==".into()));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn valid_token_resolves_the_stored_account() {
        let (state, _dir) = create_test_state();
        let account = state
            .db
            .create_account("alice", "alice@example.com", "hash", AccountRole::User)
            .unwrap();
        let token = state
            .codec
            .issue("alice@example.com", HashMap::new())
            .unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));

        let Auth(resolved) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(resolved.account_id, account.id);
        assert_eq!(resolved.email, "alice@example.com");
    }

    #[tokio::test]
    async fn valid_token_for_unknown_subject_is_rejected() {
        let (state, _dir) = create_test_state();
        let token = state
            .codec
            .issue("ghost@example.com", HashMap::new())
            .unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::UnknownAccount)));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (state, _dir) = create_test_state();
        let mut parts = parts_with_header(Some("Bearer not.a.token".into()));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[tokio::test]
    async fn extractor_prefers_a_preresolved_identity() {
        let (state, _dir) = create_test_state();
        let mut parts = parts_with_header(None);

        let preresolved = AuthenticatedAccount {
            account_id: uuid::Uuid::new_v4(),
            email: "middleware@example.com".into(),
            role: AccountRole::Admin,
            expires_at: 0,
        };
        parts.extensions.insert(preresolved.clone());

        let Auth(resolved) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(resolved.email, "middleware@example.com");
    }
}
