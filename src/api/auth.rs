// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity endpoints: registration, login, token issuance.
//!
//! These are the only routes the edge gateway exempts from its credential
//! check. Passwords are hashed with Argon2 before they reach the store;
//! login issues the HS256 bearer token every other endpoint requires.

use std::collections::HashMap;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::models::{AccountResponse, AccountRole, LoginRequest, LoginResponse, SignUpRequest};
use crate::state::AppState;

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("password hashing failed: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

#[utoipa::path(
    post,
    path = "/v1/auth/signup",
    request_body = SignUpRequest,
    tag = "Auth",
    responses(
        (status = 201, body = AccountResponse),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    request.validate()?;

    let password_hash = hash_password(&request.password)?;
    let account = state.db.create_account(
        &request.username,
        &request.email,
        &password_hash,
        AccountRole::User,
    )?;

    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let account = state
        .db
        .find_account_by_email(&request.email)?
        .ok_or_else(|| {
            warn!(email = %request.email, "login for unknown email");
            ApiError::unauthorized("Invalid email or password")
        })?;

    if !verify_password(&request.password, &account.password_hash) {
        warn!(email = %request.email, "login with wrong password");
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state
        .codec
        .issue(&account.email, HashMap::new())
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(email = %account.email, "login succeeded");
    Ok(Json(LoginResponse { token }))
}
