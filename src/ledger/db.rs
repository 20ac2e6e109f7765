// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded ledger database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: email → serialized Account
//! - `expenses`: composite key (account_id|expense_id) → serialized Expense
//! - `limits`: composite key (account_id|category) → serialized Limit
//! - `spendings`: composite key (account_id|spending_id) → serialized Spending
//!
//! The composite keys make owner listings a prefix range scan. Keying the
//! `limits` table by (account, category) also makes "at most one limit per
//! pair" structural: creating a limit for an already-limited category
//! overwrites (supersedes) the old row.
//!
//! Every mutation runs inside one write transaction; see the module docs
//! in [`super`] for the concurrency argument.

use std::path::Path;

use chrono::NaiveDate;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{limits, LedgerError, LedgerResult};
use crate::models::{
    Account, AccountRole, Category, Expense, ExpenseRequest, Limit, LimitRequest, Spending,
    SpendingRequest,
};

// =============================================================================
// Table Definitions
// =============================================================================

/// Accounts: email → serialized Account (JSON bytes).
const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Expenses: `account_id|expense_id` → serialized Expense.
const EXPENSES: TableDefinition<&str, &[u8]> = TableDefinition::new("expenses");

/// Limits: `account_id|category` → serialized Limit.
const LIMITS: TableDefinition<&str, &[u8]> = TableDefinition::new("limits");

/// Spendings: `account_id|spending_id` → serialized Spending.
const SPENDINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("spendings");

// =============================================================================
// Key Helpers
// =============================================================================

/// Build a composite key scoped to one account.
fn owner_key(account_id: Uuid, suffix: &str) -> String {
    format!("{account_id}|{suffix}")
}

/// Inclusive-start / exclusive-end bounds for scanning every row of one
/// account. Suffixes are ASCII (uuids and category names), so a max-char
/// sentinel is past any valid key.
fn owner_range(account_id: Uuid) -> (String, String) {
    let start = format!("{account_id}|");
    let end = format!("{account_id}|\u{10FFFF}");
    (start, end)
}

fn decode_row<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> LedgerResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

// =============================================================================
// LedgerDb
// =============================================================================

/// Embedded ACID ledger database.
pub struct LedgerDb {
    db: Database,
}

impl LedgerDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(EXPENSES)?;
            let _ = write_txn.open_table(LIMITS)?;
            let _ = write_txn.open_table(SPENDINGS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Create an account. The email is the unique key.
    pub fn create_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: AccountRole,
    ) -> LedgerResult<Account> {
        let write_txn = self.db.begin_write()?;
        let account;
        {
            let mut accounts = write_txn.open_table(ACCOUNTS)?;
            if accounts.get(email)?.is_some() {
                return Err(LedgerError::EmailTaken(email.to_string()));
            }

            account = Account {
                id: Uuid::new_v4(),
                username: username.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                role,
                enabled: true,
                account_non_locked: true,
                account_non_expired: true,
                credentials_non_expired: true,
            };
            accounts.insert(email, serde_json::to_vec(&account)?.as_slice())?;
        }
        write_txn.commit()?;

        info!(email = %account.email, account_id = %account.id, "account created");
        Ok(account)
    }

    /// Look up an account by email.
    pub fn find_account_by_email(&self, email: &str) -> LedgerResult<Option<Account>> {
        let read_txn = self.db.begin_read()?;
        let accounts = read_txn.open_table(ACCOUNTS)?;
        match accounts.get(email)? {
            Some(guard) => Ok(Some(decode_row(guard.value())?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Expenses
    // =========================================================================

    /// All expenses owned by the account.
    pub fn list_expenses(&self, account_id: Uuid) -> LedgerResult<Vec<Expense>> {
        let read_txn = self.db.begin_read()?;
        let expenses = read_txn.open_table(EXPENSES)?;
        let (start, end) = owner_range(account_id);

        let mut out = Vec::new();
        for entry in expenses.range(start.as_str()..end.as_str())? {
            let (_, value) = entry?;
            out.push(decode_row(value.value())?);
        }
        Ok(out)
    }

    /// Record an expense, charging the matching limit first.
    ///
    /// The limit lookup, the exceed check, the limit update, and the
    /// expense insert happen in one transaction: on `LimitExceeded` nothing
    /// is persisted.
    pub fn record_expense(
        &self,
        account_id: Uuid,
        request: &ExpenseRequest,
        today: NaiveDate,
    ) -> LedgerResult<Expense> {
        let date = request.date.unwrap_or(today);

        let write_txn = self.db.begin_write()?;
        let expense;
        {
            let mut limit_rows = write_txn.open_table(LIMITS)?;
            let limit_key = owner_key(account_id, request.category.as_str());
            let existing = match limit_rows.get(limit_key.as_str())? {
                Some(guard) => Some(decode_row::<Limit>(guard.value())?),
                None => None,
            };

            if let Some(mut limit) = existing {
                if limits::limit_applies(&limit, date, today) {
                    match limits::check_charge(&limit, request.amount) {
                        Ok(new_spent) => {
                            limit.current_spent = new_spent;
                            limit_rows
                                .insert(limit_key.as_str(), serde_json::to_vec(&limit)?.as_slice())?;
                        }
                        Err(err) => {
                            warn!(
                                account_id = %account_id,
                                category = %request.category,
                                limit_amount = %limit.limit_amount,
                                attempted = %request.amount,
                                "expense rejected: limit exceeded"
                            );
                            return Err(err);
                        }
                    }
                }
            } else {
                debug!(account_id = %account_id, category = %request.category, "no limit for category");
            }

            expense = Expense {
                id: Uuid::new_v4(),
                account_id,
                title: request.title.clone(),
                description: request.description.clone(),
                amount: request.amount,
                date,
                category: request.category,
            };
            let mut expense_rows = write_txn.open_table(EXPENSES)?;
            expense_rows.insert(
                owner_key(account_id, &expense.id.to_string()).as_str(),
                serde_json::to_vec(&expense)?.as_slice(),
            )?;
        }
        write_txn.commit()?;

        info!(
            account_id = %account_id,
            expense_id = %expense.id,
            category = %expense.category,
            amount = %expense.amount,
            "expense recorded"
        );
        Ok(expense)
    }

    /// Update an expense, re-deltaing the matching limit(s) atomically.
    ///
    /// Same category: the limit absorbs `-old +new` in one step, failing if
    /// the result would exceed the cap. Category changed: the old
    /// category's limit releases the old amount and the new category's
    /// limit is charged like a fresh record. Either way the expense change
    /// and every limit change commit together or not at all.
    pub fn update_expense(
        &self,
        account_id: Uuid,
        expense_id: Uuid,
        request: &ExpenseRequest,
        today: NaiveDate,
    ) -> LedgerResult<Expense> {
        let expense_key = owner_key(account_id, &expense_id.to_string());

        let write_txn = self.db.begin_write()?;
        let updated;
        {
            let mut expense_rows = write_txn.open_table(EXPENSES)?;
            let old = match expense_rows.get(expense_key.as_str())? {
                Some(guard) => decode_row::<Expense>(guard.value())?,
                None => return Err(LedgerError::ExpenseNotFound(expense_id)),
            };
            // An omitted date keeps the stored one.
            let new_date = request.date.unwrap_or(old.date);

            let mut limit_rows = write_txn.open_table(LIMITS)?;
            if old.category == request.category {
                let limit_key = owner_key(account_id, old.category.as_str());
                let existing = match limit_rows.get(limit_key.as_str())? {
                    Some(guard) => Some(decode_row::<Limit>(guard.value())?),
                    None => None,
                };
                if let Some(mut limit) = existing {
                    let released =
                        limits::limit_applies(&limit, old.date, today).then_some(old.amount);
                    let charged =
                        limits::limit_applies(&limit, new_date, today).then_some(request.amount);
                    if released.is_some() || charged.is_some() {
                        let final_spent = limits::redelta(&limit, released, charged)?;
                        limit.current_spent = final_spent;
                        limit.is_exceeded =
                            limits::recompute_exceeded(limit.limit_amount, final_spent);
                        limit_rows
                            .insert(limit_key.as_str(), serde_json::to_vec(&limit)?.as_slice())?;
                    }
                }
            } else {
                // Moving categories: the amounts move between the limits.
                let old_key = owner_key(account_id, old.category.as_str());
                let old_limit = match limit_rows.get(old_key.as_str())? {
                    Some(guard) => Some(decode_row::<Limit>(guard.value())?),
                    None => None,
                };
                let new_key = owner_key(account_id, request.category.as_str());
                let new_limit = match limit_rows.get(new_key.as_str())? {
                    Some(guard) => Some(decode_row::<Limit>(guard.value())?),
                    None => None,
                };

                // Check the charge before writing anything.
                let charged_limit = match new_limit {
                    Some(mut limit) if limits::limit_applies(&limit, new_date, today) => {
                        limit.current_spent = limits::check_charge(&limit, request.amount)?;
                        Some((new_key, limit))
                    }
                    _ => None,
                };

                if let Some(mut limit) = old_limit {
                    if limits::limit_applies(&limit, old.date, today) {
                        limit.current_spent = limits::release(&limit, old.amount);
                        limit.is_exceeded =
                            limits::recompute_exceeded(limit.limit_amount, limit.current_spent);
                        limit_rows
                            .insert(old_key.as_str(), serde_json::to_vec(&limit)?.as_slice())?;
                    }
                }
                if let Some((key, limit)) = charged_limit {
                    limit_rows.insert(key.as_str(), serde_json::to_vec(&limit)?.as_slice())?;
                }
            }

            updated = Expense {
                id: old.id,
                account_id,
                title: request.title.clone(),
                description: request.description.clone(),
                amount: request.amount,
                date: new_date,
                category: request.category,
            };
            expense_rows.insert(
                expense_key.as_str(),
                serde_json::to_vec(&updated)?.as_slice(),
            )?;
        }
        write_txn.commit()?;

        info!(
            account_id = %account_id,
            expense_id = %expense_id,
            "expense updated"
        );
        Ok(updated)
    }

    /// Delete an expense, releasing its amount from the matching limit.
    pub fn delete_expense(
        &self,
        account_id: Uuid,
        expense_id: Uuid,
        today: NaiveDate,
    ) -> LedgerResult<()> {
        let expense_key = owner_key(account_id, &expense_id.to_string());

        let write_txn = self.db.begin_write()?;
        {
            let mut expense_rows = write_txn.open_table(EXPENSES)?;
            let expense = match expense_rows.get(expense_key.as_str())? {
                Some(guard) => decode_row::<Expense>(guard.value())?,
                None => return Err(LedgerError::ExpenseNotFound(expense_id)),
            };

            let mut limit_rows = write_txn.open_table(LIMITS)?;
            let limit_key = owner_key(account_id, expense.category.as_str());
            let existing = match limit_rows.get(limit_key.as_str())? {
                Some(guard) => Some(decode_row::<Limit>(guard.value())?),
                None => None,
            };
            if let Some(mut limit) = existing {
                if limits::limit_applies(&limit, expense.date, today) {
                    limit.current_spent = limits::release(&limit, expense.amount);
                    limit.is_exceeded =
                        limits::recompute_exceeded(limit.limit_amount, limit.current_spent);
                    limit_rows.insert(limit_key.as_str(), serde_json::to_vec(&limit)?.as_slice())?;
                }
            }

            expense_rows.remove(expense_key.as_str())?;
        }
        write_txn.commit()?;

        info!(account_id = %account_id, expense_id = %expense_id, "expense deleted");
        Ok(())
    }

    // =========================================================================
    // Limits
    // =========================================================================

    /// Create (or supersede) the limit for a category.
    ///
    /// The seed total is computed from the expense history inside the same
    /// transaction, so a concurrent expense write cannot slip between the
    /// seed and the insert. This operation reports the exceeded state but
    /// never fails on it.
    pub fn create_limit(&self, account_id: Uuid, request: &LimitRequest) -> LedgerResult<Limit> {
        let limit_key = owner_key(account_id, request.category.as_str());

        let write_txn = self.db.begin_write()?;
        let limit;
        let superseded;
        {
            let expense_rows = write_txn.open_table(EXPENSES)?;
            let (start, end) = owner_range(account_id);
            let mut history = Vec::new();
            for entry in expense_rows.range(start.as_str()..end.as_str())? {
                let (_, value) = entry?;
                history.push(decode_row::<Expense>(value.value())?);
            }

            let seed = limits::seed_current_spent(
                &history,
                request.category,
                request.start_date,
                request.end_date,
            );

            limit = Limit {
                id: Uuid::new_v4(),
                account_id,
                category: request.category,
                limit_amount: request.limit_amount,
                current_spent: seed,
                is_exceeded: limits::recompute_exceeded(request.limit_amount, seed),
                start_date: request.start_date,
                end_date: request.end_date,
            };

            let mut limit_rows = write_txn.open_table(LIMITS)?;
            superseded = limit_rows
                .insert(limit_key.as_str(), serde_json::to_vec(&limit)?.as_slice())?
                .is_some();
        }
        write_txn.commit()?;

        info!(
            account_id = %account_id,
            category = %limit.category,
            limit_amount = %limit.limit_amount,
            current_spent = %limit.current_spent,
            superseded,
            "limit created"
        );
        Ok(limit)
    }

    /// All limits owned by the account.
    pub fn list_limits(&self, account_id: Uuid) -> LedgerResult<Vec<Limit>> {
        let read_txn = self.db.begin_read()?;
        let limit_rows = read_txn.open_table(LIMITS)?;
        let (start, end) = owner_range(account_id);

        let mut out = Vec::new();
        for entry in limit_rows.range(start.as_str()..end.as_str())? {
            let (_, value) = entry?;
            out.push(decode_row(value.value())?);
        }
        Ok(out)
    }

    /// Delete every limit whose window closed before `today`, across all
    /// accounts. Returns the number of limits retired; calling it again
    /// with the same date removes nothing further.
    pub fn sweep_expired_limits(&self, today: NaiveDate) -> LedgerResult<usize> {
        let write_txn = self.db.begin_write()?;
        let mut expired = Vec::new();
        {
            let mut limit_rows = write_txn.open_table(LIMITS)?;
            for entry in limit_rows.iter()? {
                let (key, value) = entry?;
                let limit: Limit = decode_row(value.value())?;
                if limit.end_date < today {
                    expired.push(key.value().to_string());
                }
            }
            for key in &expired {
                limit_rows.remove(key.as_str())?;
            }
        }
        write_txn.commit()?;

        Ok(expired.len())
    }

    // =========================================================================
    // Spendings
    // =========================================================================

    /// Record a spending. Spendings never interact with limits.
    pub fn record_spending(
        &self,
        account_id: Uuid,
        request: &SpendingRequest,
        today: NaiveDate,
    ) -> LedgerResult<Spending> {
        let spending = Spending {
            id: Uuid::new_v4(),
            account_id,
            title: request.title.clone(),
            description: request.description.clone(),
            amount: request.amount,
            currency: request.currency.clone(),
            date: today,
        };

        let write_txn = self.db.begin_write()?;
        {
            let mut spending_rows = write_txn.open_table(SPENDINGS)?;
            spending_rows.insert(
                owner_key(account_id, &spending.id.to_string()).as_str(),
                serde_json::to_vec(&spending)?.as_slice(),
            )?;
        }
        write_txn.commit()?;

        info!(account_id = %account_id, spending_id = %spending.id, "spending recorded");
        Ok(spending)
    }

    /// All spendings owned by the account.
    pub fn list_spendings(&self, account_id: Uuid) -> LedgerResult<Vec<Spending>> {
        let read_txn = self.db.begin_read()?;
        let spending_rows = read_txn.open_table(SPENDINGS)?;
        let (start, end) = owner_range(account_id);

        let mut out = Vec::new();
        for entry in spending_rows.range(start.as_str()..end.as_str())? {
            let (_, value) = entry?;
            out.push(decode_row(value.value())?);
        }
        Ok(out)
    }
}
