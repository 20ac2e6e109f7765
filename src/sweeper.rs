// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Limit Sweeper
//!
//! Background task that retires spending limits whose window has closed.
//! Runs on its own timer; each tick is one store transaction, so it never
//! holds anything a request handler is waiting on.
//!
//! A failed sweep is logged and retried on the next tick — it never
//! propagates to a caller and never stops the loop.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::DEFAULT_SWEEP_INTERVAL;
use crate::ledger::LedgerDb;

/// Background sweeper that deletes expired limits.
pub struct LimitSweeper {
    db: Arc<LedgerDb>,
    interval: Duration,
}

impl LimitSweeper {
    /// Create a sweeper with the default (daily) interval.
    pub fn new(db: Arc<LedgerDb>) -> Self {
        Self {
            db,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Override the sweep interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "limit sweeper starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("limit sweeper shutting down");
                return;
            }

            self.sweep_step();

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("limit sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Execute one sweep: delete every limit whose end date has passed.
    fn sweep_step(&self) {
        let today = Utc::now().date_naive();
        match self.db.sweep_expired_limits(today) {
            Ok(0) => {}
            Ok(removed) => {
                info!(%today, removed, "limit sweeper: retired expired limits");
            }
            Err(e) => {
                warn!(%today, error = %e, "limit sweeper: sweep failed, retrying next tick");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountRole, Category, LimitRequest};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn temp_db() -> (Arc<LedgerDb>, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = LedgerDb::open(&dir.path().join("ledger.redb")).unwrap();
        (Arc::new(db), dir)
    }

    #[tokio::test]
    async fn sweep_step_retires_closed_windows_only() {
        let (db, _dir) = temp_db();
        let account = db
            .create_account("alice", "alice@example.com", "hash", AccountRole::User)
            .unwrap();

        let yesterday = Utc::now().date_naive().pred_opt().unwrap();
        let far_future = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap();

        // One closed window, one still open. Window validation is a
        // handler concern; the store accepts historical windows.
        db.create_limit(
            account.id,
            &LimitRequest {
                limit_amount: Decimal::new(100, 0),
                category: Category::FoodGroceries,
                start_date: yesterday,
                end_date: yesterday,
            },
        )
        .unwrap();
        db.create_limit(
            account.id,
            &LimitRequest {
                limit_amount: Decimal::new(100, 0),
                category: Category::Education,
                start_date: yesterday,
                end_date: far_future,
            },
        )
        .unwrap();

        let sweeper = LimitSweeper::new(db.clone()).with_interval(Duration::from_secs(1));
        sweeper.sweep_step();

        let remaining = db.list_limits(account.id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].category, Category::Education);

        // Sweeping again removes nothing further.
        sweeper.sweep_step();
        assert_eq!(db.list_limits(account.id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let (db, _dir) = temp_db();
        let sweeper = LimitSweeper::new(db).with_interval(Duration::from_secs(3600));
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn(sweeper.run(shutdown.clone()));
        shutdown.cancel();
        handle.await.expect("sweeper task exits cleanly");
    }
}
