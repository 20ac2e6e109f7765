// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Spending endpoints.
//!
//! Spendings are plain dated records with a free-text currency; they never
//! touch limits.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{SpendingRequest, SpendingResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/spendings",
    request_body = SpendingRequest,
    tag = "Spendings",
    responses(
        (status = 201, body = SpendingResponse),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn create_spending(
    Auth(account): Auth,
    State(state): State<AppState>,
    Json(request): Json<SpendingRequest>,
) -> Result<(StatusCode, Json<SpendingResponse>), ApiError> {
    request.validate()?;

    let today = Utc::now().date_naive();
    let spending = state
        .db
        .record_spending(account.account_id, &request, today)?;
    Ok((StatusCode::CREATED, Json(SpendingResponse::from(&spending))))
}

#[utoipa::path(
    get,
    path = "/v1/spendings",
    tag = "Spendings",
    responses((status = 200, body = [SpendingResponse]), (status = 401))
)]
pub async fn list_spendings(
    Auth(account): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<SpendingResponse>>, ApiError> {
    let spendings = state.db.list_spendings(account.account_id)?;
    Ok(Json(spendings.iter().map(SpendingResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedAccount, TokenCodec};
    use crate::ledger::LedgerDb;
    use crate::models::AccountRole;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use rust_decimal::Decimal;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, AuthenticatedAccount, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let db = LedgerDb::open(&temp_dir.path().join("ledger.redb")).expect("db opens");
        let codec = TokenCodec::new(
            &STANDARD.encode(b"spendings-api-test-secret-spendings"),
            Duration::from_secs(3600),
        )
        .expect("codec builds");
        let state = AppState::new(db, codec);

        let account = state
            .db
            .create_account("alice", "alice@example.com", "hash", AccountRole::User)
            .unwrap();
        let identity = AuthenticatedAccount {
            account_id: account.id,
            email: account.email,
            role: account.role,
            expires_at: 0,
        };
        (state, identity, temp_dir)
    }

    #[tokio::test]
    async fn create_and_list_round_trip() {
        let (state, identity, _dir) = create_test_state();

        let (status, Json(created)) = create_spending(
            Auth(identity.clone()),
            State(state.clone()),
            Json(SpendingRequest {
                title: "lunch".into(),
                description: Some("team lunch".into()),
                amount: Decimal::new(1250, 2),
                currency: "EUR".into(),
            }),
        )
        .await
        .expect("spending creation succeeds");
        assert_eq!(status, StatusCode::CREATED);

        let Json(listed) = list_spendings(Auth(identity), State(state)).await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn blank_currency_is_rejected() {
        let (state, identity, _dir) = create_test_state();

        let err = create_spending(
            Auth(identity),
            State(state),
            Json(SpendingRequest {
                title: "lunch".into(),
                description: None,
                amount: Decimal::ONE,
                currency: "  ".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
