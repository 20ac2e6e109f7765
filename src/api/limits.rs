// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Spending limit endpoints.
//!
//! Setting a limit for an already-limited category supersedes the old one;
//! the ledger reseeds the running total from the expense history, so the
//! response reports the real state of the new window immediately.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::models::{LimitRequest, LimitResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/v1/limits",
    request_body = LimitRequest,
    tag = "Limits",
    responses(
        (status = 201, body = LimitResponse),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn create_limit(
    Auth(account): Auth,
    State(state): State<AppState>,
    Json(request): Json<LimitRequest>,
) -> Result<(StatusCode, Json<LimitResponse>), ApiError> {
    let today = Utc::now().date_naive();
    request.validate(today)?;

    let limit = state.db.create_limit(account.account_id, &request)?;
    Ok((StatusCode::CREATED, Json(LimitResponse::from(&limit))))
}

#[utoipa::path(
    get,
    path = "/v1/limits",
    tag = "Limits",
    responses((status = 200, body = [LimitResponse]), (status = 401))
)]
pub async fn list_limits(
    Auth(account): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<LimitResponse>>, ApiError> {
    let limits = state.db.list_limits(account.account_id)?;
    Ok(Json(limits.iter().map(LimitResponse::from).collect()))
}
