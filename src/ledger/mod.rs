// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Expense Ledger
//!
//! Owns the invariant that a limit's `current_spent` always equals the sum
//! of the owning account's expenses in the limit's category whose dates
//! fall inside the limit's window.
//!
//! ## Concurrency
//!
//! There is no in-process cache of limits or expenses; all state lives in
//! the embedded database and is re-read at the start of each operation.
//! Every mutation (record, update, delete, create-limit, sweep) executes
//! inside a single redb write transaction. redb admits one writer at a
//! time, so two concurrent expense writes against the same limit serialize
//! and the second one re-reads the committed `current_spent` — the exceed
//! check can never pass on a stale total. Returning an error before commit
//! drops the transaction and leaves every table untouched, which is what
//! makes `LimitExceeded` a no-partial-state outcome.
//!
//! ## Modules
//!
//! - [`db`] - the redb-backed store and its transactional operations
//! - [`limits`] - pure charge/release/seed arithmetic
//! - [`expenses`] - the shared expense filtering primitive

pub mod db;
pub mod expenses;
pub mod limits;

pub use db::LedgerDb;

use axum::http::StatusCode;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Category;

/// Ledger storage and business errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("account with email {0} already exists")]
    EmailTaken(String),

    #[error("expense {0} not found")]
    ExpenseNotFound(Uuid),

    #[error("spending limit for category {category} exceeded (limit {limit_amount})")]
    LimitExceeded {
        category: Category,
        limit_amount: Decimal,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::EmailTaken(email) => ApiError::conflict(format!(
                "User with provided email: {email} already exists!"
            )),
            LedgerError::ExpenseNotFound(id) => {
                ApiError::not_found(format!("Expense with id {id} not found!"))
            }
            LedgerError::LimitExceeded {
                category,
                limit_amount,
            } => ApiError::forbidden(format!(
                "Spending limit for category {category} has been exceeded! Limit amount: {limit_amount}"
            )),
            // Storage faults carry internal detail; callers get a generic 500.
            other => {
                tracing::error!(error = %other, "ledger storage failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal storage error")
            }
        }
    }
}
