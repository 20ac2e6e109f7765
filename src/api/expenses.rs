// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Expense endpoints.
//!
//! Every handler requires a resolved caller identity; the ledger is only
//! ever touched on behalf of the authenticated account. Requests are
//! validated before any store operation runs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::ledger::expenses as aggregation;
use crate::models::{AnalyzeQuery, ExpenseRequest, ExpenseResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/v1/expenses",
    tag = "Expenses",
    responses((status = 200, body = [ExpenseResponse]), (status = 401))
)]
pub async fn list_expenses(
    Auth(account): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let expenses = state.db.list_expenses(account.account_id)?;
    Ok(Json(expenses.iter().map(ExpenseResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/v1/expenses",
    request_body = ExpenseRequest,
    tag = "Expenses",
    responses(
        (status = 201, body = ExpenseResponse),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Spending limit exceeded")
    )
)]
pub async fn create_expense(
    Auth(account): Auth,
    State(state): State<AppState>,
    Json(request): Json<ExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), ApiError> {
    let today = Utc::now().date_naive();
    request.validate(today)?;

    let expense = state.db.record_expense(account.account_id, &request, today)?;
    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(&expense))))
}

#[utoipa::path(
    put,
    path = "/v1/expenses/{expense_id}",
    params(("expense_id" = Uuid, Path, description = "Identifier of the expense to update")),
    request_body = ExpenseRequest,
    tag = "Expenses",
    responses(
        (status = 200, body = ExpenseResponse),
        (status = 403, description = "Spending limit exceeded"),
        (status = 404)
    )
)]
pub async fn update_expense(
    Auth(account): Auth,
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
    Json(request): Json<ExpenseRequest>,
) -> Result<Json<ExpenseResponse>, ApiError> {
    let today = Utc::now().date_naive();
    request.validate(today)?;

    let expense = state
        .db
        .update_expense(account.account_id, expense_id, &request, today)?;
    Ok(Json(ExpenseResponse::from(&expense)))
}

#[utoipa::path(
    delete,
    path = "/v1/expenses/{expense_id}",
    params(("expense_id" = Uuid, Path, description = "Identifier of the expense to delete")),
    tag = "Expenses",
    responses((status = 204), (status = 404))
)]
pub async fn delete_expense(
    Auth(account): Auth,
    State(state): State<AppState>,
    Path(expense_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let today = Utc::now().date_naive();
    state.db.delete_expense(account.account_id, expense_id, today)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/expenses/analyze",
    params(AnalyzeQuery),
    tag = "Expenses",
    responses((status = 200, body = [ExpenseResponse]), (status = 401))
)]
pub async fn analyze_expenses(
    Auth(account): Auth,
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
) -> Result<Json<Vec<ExpenseResponse>>, ApiError> {
    let expenses = aggregation::analyze_expenses(&state.db, account.account_id, &query)?;
    Ok(Json(expenses.iter().map(ExpenseResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedAccount, TokenCodec};
    use crate::ledger::LedgerDb;
    use crate::models::{AccountRole, Category};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, AuthenticatedAccount, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir");
        let db = LedgerDb::open(&temp_dir.path().join("ledger.redb")).expect("db opens");
        let codec = TokenCodec::new(
            &STANDARD.encode(b"expenses-api-test-secret-expenses!"),
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

    fn expense_request(amount: i64, category: Category) -> ExpenseRequest {
        ExpenseRequest {
            title: "expense".into(),
            description: None,
            amount: Decimal::new(amount, 0),
            date: None,
            category,
        }
    }

    #[tokio::test]
    async fn create_and_list_round_trip() {
        let (state, identity, _dir) = create_test_state();

        let (status, Json(created)) = create_expense(
            Auth(identity.clone()),
            State(state.clone()),
            Json(expense_request(15, Category::FoodGroceries)),
        )
        .await
        .expect("expense creation succeeds");
        assert_eq!(status, StatusCode::CREATED);

        let Json(listed) = list_expenses(Auth(identity), State(state))
            .await
            .expect("listing succeeds");
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn create_over_an_exhausted_limit_returns_403() {
        let (state, identity, _dir) = create_test_state();
        let today = Utc::now().date_naive();
        state
            .db
            .create_limit(
                identity.account_id,
                &crate::models::LimitRequest {
                    limit_amount: Decimal::new(10, 0),
                    category: Category::FoodGroceries,
                    start_date: today,
                    end_date: today,
                },
            )
            .unwrap();

        let err = create_expense(
            Auth(identity),
            State(state),
            Json(expense_request(11, Category::FoodGroceries)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_with_field_map() {
        let (state, identity, _dir) = create_test_state();

        let err = create_expense(
            Auth(identity),
            State(state),
            Json(expense_request(0, Category::FoodGroceries)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fields.unwrap().contains_key("amount"));
    }

    #[tokio::test]
    async fn update_missing_expense_returns_404() {
        let (state, identity, _dir) = create_test_state();

        let err = update_expense(
            Auth(identity),
            State(state),
            Path(Uuid::new_v4()),
            Json(expense_request(10, Category::FoodGroceries)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_returns_204_and_removes_the_record() {
        let (state, identity, _dir) = create_test_state();
        let (_, Json(created)) = create_expense(
            Auth(identity.clone()),
            State(state.clone()),
            Json(expense_request(15, Category::FoodGroceries)),
        )
        .await
        .unwrap();

        let status = delete_expense(
            Auth(identity.clone()),
            State(state.clone()),
            Path(created.id),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(listed) = list_expenses(Auth(identity), State(state)).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn analyze_applies_the_shared_filter() {
        let (state, identity, _dir) = create_test_state();
        let food = ExpenseRequest {
            date: Some(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap()),
            ..expense_request(10, Category::FoodGroceries)
        };
        let travel = ExpenseRequest {
            date: Some(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()),
            ..expense_request(20, Category::TravelVacations)
        };
        create_expense(Auth(identity.clone()), State(state.clone()), Json(food))
            .await
            .unwrap();
        create_expense(Auth(identity.clone()), State(state.clone()), Json(travel))
            .await
            .unwrap();

        let Json(filtered) = analyze_expenses(
            Auth(identity),
            State(state),
            Query(AnalyzeQuery {
                from: None,
                to: None,
                category: Some(Category::TravelVacations),
            }),
        )
        .await
        .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category, Category::TravelVacations);
    }
}
