// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Models and API Data Types
//!
//! Persisted records (accounts, expenses, limits, spendings), the closed
//! category set, and the request/response structures of the REST API. All
//! API types derive `Serialize`/`Deserialize` plus `ToSchema` for OpenAPI
//! documentation.
//!
//! Monetary amounts are `rust_decimal::Decimal` throughout; floats never
//! touch ledger arithmetic.
//!
//! Request validation lives here as `validate()` methods that collect
//! per-field messages; handlers reject with a 400 field map before any
//! ledger operation runs.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;

// =============================================================================
// Categories
// =============================================================================

/// Closed set of expense categories.
///
/// Limits and expenses correlate through this enum (together with the
/// owning account and the limit's date window); there is no direct
/// reference between the two record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    FoodGroceries,
    Transportation,
    HousingUtilities,
    Entertainment,
    Healthcare,
    Insurance,
    PersonalCare,
    Clothing,
    Education,
    SubscriptionsMemberships,
    TravelVacations,
    GiftsDonations,
    Miscellaneous,
}

impl Category {
    /// Stable wire name, used in composite store keys and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FoodGroceries => "FOOD_GROCERIES",
            Category::Transportation => "TRANSPORTATION",
            Category::HousingUtilities => "HOUSING_UTILITIES",
            Category::Entertainment => "ENTERTAINMENT",
            Category::Healthcare => "HEALTHCARE",
            Category::Insurance => "INSURANCE",
            Category::PersonalCare => "PERSONAL_CARE",
            Category::Clothing => "CLOTHING",
            Category::Education => "EDUCATION",
            Category::SubscriptionsMemberships => "SUBSCRIPTIONS_MEMBERSHIPS",
            Category::TravelVacations => "TRAVEL_VACATIONS",
            Category::GiftsDonations => "GIFTS_DONATIONS",
            Category::Miscellaneous => "MISCELLANEOUS",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Accounts
// =============================================================================

/// Account role. Carried on the token and the stored record; the ledger
/// endpoints do not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountRole {
    User,
    Admin,
}

/// A stored account.
///
/// The status flags mirror the upstream identity model; they are persisted
/// and reported but not enforced by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    /// Display name.
    pub username: String,
    /// Unique login identifier; also the token subject.
    pub email: String,
    /// Argon2 credential hash. Never serialized to API responses.
    pub password_hash: String,
    pub role: AccountRole,
    pub enabled: bool,
    pub account_non_locked: bool,
    pub account_non_expired: bool,
    pub credentials_non_expired: bool,
}

/// Registration request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignUpRequest {
    /// Display name. Required, non-blank.
    pub username: String,
    /// Login email. Required, unique.
    pub email: String,
    /// Plaintext password; hashed with Argon2 before storage.
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.username.trim().is_empty() {
            errors.push(("username", "Username is required.".to_string()));
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            errors.push(("email", "A valid email address is required.".to_string()));
        }
        if self.password.chars().count() < 8 {
            errors.push(("password", "Password must be at least 8 characters.".to_string()));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(errors))
        }
    }
}

/// Login request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response carrying the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Account view returned by the API (credential hash excluded).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AccountResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: AccountRole,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role,
        }
    }
}

// =============================================================================
// Expenses
// =============================================================================

/// A stored expense record, exclusively owned by one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Uuid,
    pub account_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    /// Occurrence date, never in the future.
    pub date: NaiveDate,
    pub category: Category,
}

/// Request to create or update an expense record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExpenseRequest {
    /// Title of the expense. Required, at most 100 characters.
    pub title: String,
    /// Optional free-text description, at most 500 characters.
    #[serde(default)]
    pub description: Option<String>,
    /// Amount, strictly greater than zero.
    pub amount: Decimal,
    /// Occurrence date. Defaults to today when omitted; never in the future.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub category: Category,
}

impl ExpenseRequest {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(("title", "Title is required.".to_string()));
        } else if self.title.chars().count() > 100 {
            errors.push(("title", "Title must be at most 100 characters.".to_string()));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > 500 {
                errors.push((
                    "description",
                    "Description must be at most 500 characters.".to_string(),
                ));
            }
        }
        if self.amount <= Decimal::ZERO {
            errors.push(("amount", "Amount must be greater than zero.".to_string()));
        }
        if let Some(date) = self.date {
            if date > today {
                errors.push(("date", "Date cannot be in the future.".to_string()));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(errors))
        }
    }
}

/// Expense view returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category: Category,
}

impl From<&Expense> for ExpenseResponse {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            title: expense.title.clone(),
            description: expense.description.clone(),
            amount: expense.amount,
            date: expense.date,
            category: expense.category,
        }
    }
}

/// Query parameters of the expense analysis endpoint. Absent bounds impose
/// no constraint; both date bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AnalyzeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<Category>,
}

// =============================================================================
// Limits
// =============================================================================

/// A stored spending limit: a cap on total spending in one category over a
/// date window, owned by one account.
///
/// `current_spent` and `is_exceeded` are derived from the expense history;
/// they are recomputed by the ledger and never accepted from client input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Limit {
    pub id: Uuid,
    pub account_id: Uuid,
    pub category: Category,
    pub limit_amount: Decimal,
    pub current_spent: Decimal,
    pub is_exceeded: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Request to set a spending limit for a category.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LimitRequest {
    /// Maximum allowable spending within the window. Strictly positive.
    pub limit_amount: Decimal,
    pub category: Category,
    /// First day of the window. Must not be in the future.
    pub start_date: NaiveDate,
    /// Last day of the window, inclusive. Must not precede the start date
    /// and must not already be in the past.
    pub end_date: NaiveDate,
}

impl LimitRequest {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.limit_amount <= Decimal::ZERO {
            errors.push((
                "limit_amount",
                "Limit amount must be greater than zero.".to_string(),
            ));
        }
        if self.start_date > today {
            errors.push((
                "start_date",
                "The start date cannot be set to a future date.".to_string(),
            ));
        }
        if self.end_date < today {
            errors.push(("end_date", "The end date cannot be in the past.".to_string()));
        }
        if self.end_date < self.start_date {
            errors.push((
                "end_date",
                "The end date cannot precede the start date.".to_string(),
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(errors))
        }
    }
}

/// Limit view returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct LimitResponse {
    pub id: Uuid,
    pub category: Category,
    pub limit_amount: Decimal,
    pub current_spent: Decimal,
    pub is_exceeded: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&Limit> for LimitResponse {
    fn from(limit: &Limit) -> Self {
        Self {
            id: limit.id,
            category: limit.category,
            limit_amount: limit.limit_amount,
            current_spent: limit.current_spent,
            is_exceeded: limit.is_exceeded,
            start_date: limit.start_date,
            end_date: limit.end_date,
        }
    }
}

// =============================================================================
// Spendings
// =============================================================================

/// A stored uncategorised spending record. Spendings carry a free-text
/// currency code and do not interact with limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spending {
    pub id: Uuid,
    pub account_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
}

/// Request to record a spending.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SpendingRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: Decimal,
    /// Currency code, e.g. "EUR".
    pub currency: String,
}

impl SpendingRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(("title", "Title is required.".to_string()));
        }
        if self.amount <= Decimal::ZERO {
            errors.push(("amount", "Amount must be greater than zero.".to_string()));
        }
        if self.currency.trim().is_empty() {
            errors.push(("currency", "Currency is required.".to_string()));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation(errors))
        }
    }
}

/// Spending view returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SpendingResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub date: NaiveDate,
}

impl From<&Spending> for SpendingResponse {
    fn from(spending: &Spending) -> Self {
        Self {
            id: spending.id,
            title: spending.title.clone(),
            description: spending.description.clone(),
            amount: spending.amount,
            currency: spending.currency.clone(),
            date: spending.date,
        }
    }
}
