// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenCodec;
use crate::ledger::LedgerDb;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<LedgerDb>,
    pub codec: Arc<TokenCodec>,
}

impl AppState {
    pub fn new(db: LedgerDb, codec: TokenCodec) -> Self {
        Self {
            db: Arc::new(db),
            codec: Arc::new(codec),
        }
    }
}
