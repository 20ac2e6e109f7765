// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pure limit arithmetic.
//!
//! These functions carry the exceed-check semantics; the store calls them
//! from inside its write transactions so the decision and the persisted
//! outcome cannot diverge.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::expenses::filter_expenses;
use super::{LedgerError, LedgerResult};
use crate::models::{Category, Expense, Limit};

/// Whether `date` falls inside the limit's window, bounds inclusive.
pub(crate) fn window_contains(limit: &Limit, date: NaiveDate) -> bool {
    limit.start_date <= date && date <= limit.end_date
}

/// Whether the limit is still active (its window has not closed). Expired
/// limits awaiting the sweep constrain nothing.
pub(crate) fn is_active(limit: &Limit, today: NaiveDate) -> bool {
    limit.end_date >= today
}

/// Whether an expense dated `date` counts against the limit: the limit must
/// be active and the date must lie inside its window.
pub(crate) fn limit_applies(limit: &Limit, date: NaiveDate, today: NaiveDate) -> bool {
    is_active(limit, today) && window_contains(limit, date)
}

/// Exceed check for a new charge.
///
/// Fails when the exceeded flag is already set, or when the candidate total
/// strictly exceeds the cap. Equality passes: spending may reach the cap
/// exactly.
pub(crate) fn check_charge(limit: &Limit, amount: Decimal) -> LedgerResult<Decimal> {
    let candidate = limit.current_spent + amount;
    if limit.is_exceeded || candidate > limit.limit_amount {
        return Err(LedgerError::LimitExceeded {
            category: limit.category,
            limit_amount: limit.limit_amount,
        });
    }
    Ok(candidate)
}

/// Release a previously counted amount, clamping the total at zero.
pub(crate) fn release(limit: &Limit, amount: Decimal) -> Decimal {
    (limit.current_spent - amount).max(Decimal::ZERO)
}

/// Re-delta for an in-place expense update against one limit.
///
/// `released` is the old amount when the old record counted against the
/// limit; `charged` is the new amount when the updated record will. Fails
/// when the resulting total would strictly exceed the cap; on success the
/// caller commits the new total and the expense change together.
pub(crate) fn redelta(
    limit: &Limit,
    released: Option<Decimal>,
    charged: Option<Decimal>,
) -> LedgerResult<Decimal> {
    let final_spent = (limit.current_spent - released.unwrap_or(Decimal::ZERO)
        + charged.unwrap_or(Decimal::ZERO))
    .max(Decimal::ZERO);
    if final_spent > limit.limit_amount {
        return Err(LedgerError::LimitExceeded {
            category: limit.category,
            limit_amount: limit.limit_amount,
        });
    }
    Ok(final_spent)
}

/// Exceeded flag recomputed from a total, mirroring the seed rule used at
/// limit creation: reaching the cap marks the limit exceeded.
pub(crate) fn recompute_exceeded(limit_amount: Decimal, current_spent: Decimal) -> bool {
    current_spent >= limit_amount
}

/// Sum of the expenses that fall inside the window for the category — the
/// seed for a freshly created limit. Reuses the shared filtering primitive
/// so the seed and the analysis endpoint can never drift apart.
pub(crate) fn seed_current_spent(
    expenses: &[Expense],
    category: Category,
    start: NaiveDate,
    end: NaiveDate,
) -> Decimal {
    filter_expenses(expenses, Some(start), Some(end), Some(category))
        .map(|expense| expense.amount)
        .sum()
}
