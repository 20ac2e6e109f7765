// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use finance_tracker_server::api::router;
use finance_tracker_server::auth::TokenCodec;
use finance_tracker_server::config::AppConfig;
use finance_tracker_server::ledger::LedgerDb;
use finance_tracker_server::state::AppState;
use finance_tracker_server::sweeper::LimitSweeper;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env().expect("configuration is incomplete");

    let db = LedgerDb::open(&config.ledger_db_path()).expect("failed to open ledger database");
    let codec = TokenCodec::new(&config.token_secret, config.token_ttl)
        .expect("TOKEN_SECRET is not valid base64");

    let state = AppState::new(db, codec);
    let app = router(state.clone());

    // Background retirement of expired limits.
    let shutdown = CancellationToken::new();
    let sweeper = LimitSweeper::new(state.db.clone()).with_interval(config.sweep_interval);
    tokio::spawn(sweeper.run(shutdown.clone()));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("failed to parse bind address");

    info!(%addr, "tracker server listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                tokio::signal::ctrl_c()
                    .await
                    .expect("failed to install ctrl-c handler");
                shutdown.cancel();
            }
        })
        .await
        .expect("server failed");

    info!("tracker server stopped");
}
