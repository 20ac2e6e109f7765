// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Expense aggregation.
//!
//! [`filter_expenses`] is the single filtering primitive behind both the
//! user-facing analysis endpoint and the limit seed computation. It is
//! implemented once; the two consumers cannot drift apart on what a date
//! window or a category match means.

use chrono::NaiveDate;
use uuid::Uuid;

use super::{LedgerDb, LedgerResult};
use crate::models::{AnalyzeQuery, Category, Expense};

/// Filter expenses by optional inclusive date bounds and category.
///
/// An absent bound imposes no constraint; an absent category matches every
/// category.
pub fn filter_expenses<'a>(
    expenses: &'a [Expense],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    category: Option<Category>,
) -> impl Iterator<Item = &'a Expense> {
    expenses.iter().filter(move |expense| {
        from.map_or(true, |from| expense.date >= from)
            && to.map_or(true, |to| expense.date <= to)
            && category.map_or(true, |category| expense.category == category)
    })
}

/// Ad-hoc filtered view over an account's expense history.
pub fn analyze_expenses(
    db: &LedgerDb,
    account_id: Uuid,
    query: &AnalyzeQuery,
) -> LedgerResult<Vec<Expense>> {
    let expenses = db.list_expenses(account_id)?;
    Ok(filter_expenses(&expenses, query.from, query.to, query.category)
        .cloned()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(day: (i32, u32, u32), category: Category) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            title: "t".into(),
            description: None,
            amount: Decimal::ONE,
            date: date(day.0, day.1, day.2),
            category,
        }
    }

    #[test]
    fn absent_bounds_impose_no_constraint() {
        let expenses = vec![
            expense((2026, 1, 1), Category::FoodGroceries),
            expense((2026, 6, 1), Category::Education),
        ];
        let all: Vec<_> = filter_expenses(&expenses, None, None, None).collect();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn date_bounds_are_inclusive_on_both_ends() {
        let expenses = vec![
            expense((2026, 1, 1), Category::FoodGroceries),
            expense((2026, 1, 15), Category::FoodGroceries),
            expense((2026, 1, 31), Category::FoodGroceries),
            expense((2026, 2, 1), Category::FoodGroceries),
        ];
        let january: Vec<_> = filter_expenses(
            &expenses,
            Some(date(2026, 1, 1)),
            Some(date(2026, 1, 31)),
            None,
        )
        .collect();
        assert_eq!(january.len(), 3);
    }

    #[test]
    fn category_filter_is_exact() {
        let expenses = vec![
            expense((2026, 1, 1), Category::FoodGroceries),
            expense((2026, 1, 2), Category::Education),
            expense((2026, 1, 3), Category::FoodGroceries),
        ];
        let food: Vec<_> =
            filter_expenses(&expenses, None, None, Some(Category::FoodGroceries)).collect();
        assert_eq!(food.len(), 2);
        assert!(food.iter().all(|e| e.category == Category::FoodGroceries));
    }

    #[test]
    fn lone_lower_bound_keeps_everything_after_it() {
        let expenses = vec![
            expense((2026, 1, 1), Category::FoodGroceries),
            expense((2026, 3, 1), Category::FoodGroceries),
        ];
        let recent: Vec<_> =
            filter_expenses(&expenses, Some(date(2026, 2, 1)), None, None).collect();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].date, date(2026, 3, 1));
    }
}
