// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AccountResponse, ExpenseRequest, ExpenseResponse, LimitRequest, LimitResponse,
        LoginRequest, LoginResponse, SignUpRequest, SpendingRequest, SpendingResponse,
    },
    state::AppState,
};

pub mod auth;
pub mod expenses;
pub mod health;
pub mod limits;
pub mod spendings;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route(
            "/expenses",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route("/expenses/analyze", get(expenses::analyze_expenses))
        .route(
            "/expenses/{expense_id}",
            put(expenses::update_expense).delete(expenses::delete_expense),
        )
        .route(
            "/limits",
            get(limits::list_limits).post(limits::create_limit),
        )
        .route(
            "/spendings",
            get(spendings::list_spendings).post(spendings::create_spending),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup,
        auth::login,
        expenses::list_expenses,
        expenses::create_expense,
        expenses::update_expense,
        expenses::delete_expense,
        expenses::analyze_expenses,
        limits::create_limit,
        limits::list_limits,
        spendings::create_spending,
        spendings::list_spendings,
        health::health
    ),
    components(
        schemas(
            SignUpRequest,
            LoginRequest,
            LoginResponse,
            AccountResponse,
            ExpenseRequest,
            ExpenseResponse,
            LimitRequest,
            LimitResponse,
            SpendingRequest,
            SpendingResponse,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and token issuance"),
        (name = "Expenses", description = "Expense records and analysis"),
        (name = "Limits", description = "Per-category spending limits"),
        (name = "Spendings", description = "Uncategorised spending records"),
        (name = "Health", description = "Liveness probe")
    )
)]
struct ApiDoc;
