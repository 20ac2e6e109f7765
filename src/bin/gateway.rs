// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Edge Gateway
//!
//! Validates bearer credentials at the network edge and forwards requests
//! to the tracker service. Validation here is the first of two independent
//! checks: the tracker re-validates every forwarded token with its own
//! gate, so a request forged past this edge still fails inside the
//! service. The Authorization header is forwarded untouched for exactly
//! that reason; the resolved subject additionally travels in the
//! `x-account-email` header.
//!
//! Open path prefixes (signup/login, health) skip the credential check —
//! a client cannot present a token before it has obtained one.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GATEWAY_HOST` | Bind address | `0.0.0.0` |
//! | `GATEWAY_PORT` | Bind port | `8000` |
//! | `TRACKER_UPSTREAM` | Base URL of the tracker service | `http://127.0.0.1:8080` |
//! | `TOKEN_SECRET` | Base64 HS256 secret, same as the tracker's | Required |

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{
        header::{CONTENT_LENGTH, TRANSFER_ENCODING},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use finance_tracker_server::auth::TokenCodec;
use finance_tracker_server::config::{DEFAULT_TOKEN_TTL, TOKEN_SECRET_ENV};

/// Path prefixes reachable without a credential.
const OPEN_PATH_PREFIXES: &[&str] = &["/v1/auth/", "/health"];

/// Upper bound on buffered request bodies.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Header carrying the resolved subject downstream.
const ACCOUNT_EMAIL_HEADER: &str = "x-account-email";

#[derive(Clone)]
struct GatewayState {
    codec: Arc<TokenCodec>,
    client: reqwest::Client,
    upstream: String,
}

/// Edge rejection. Missing credentials and invalid credentials are
/// distinguished here (401 vs 403); the service collapses both to 401.
#[derive(Debug, PartialEq, Eq)]
struct EdgeRejection {
    status: StatusCode,
    message: &'static str,
}

#[derive(Serialize)]
struct RejectionBody {
    error: String,
}

impl IntoResponse for EdgeRejection {
    fn into_response(self) -> Response {
        let body = Json(RejectionBody {
            error: self.message.to_string(),
        });
        (self.status, body).into_response()
    }
}

fn is_open_path(path: &str) -> bool {
    OPEN_PATH_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// The edge credential check.
///
/// Returns the verified subject email for protected paths, `None` for open
/// ones. Missing credential → 401; anything wrong with a present
/// credential → 403.
fn edge_guard(
    codec: &TokenCodec,
    path: &str,
    auth_header: Option<&str>,
) -> Result<Option<String>, EdgeRejection> {
    if is_open_path(path) {
        return Ok(None);
    }

    let header = auth_header.ok_or(EdgeRejection {
        status: StatusCode::UNAUTHORIZED,
        message: "Please login first",
    })?;

    let invalid = EdgeRejection {
        status: StatusCode::FORBIDDEN,
        message: "Invalid token",
    };

    let token = header.strip_prefix("Bearer ").ok_or(invalid)?.trim();
    match codec.verify(token) {
        Ok(claims) => Ok(Some(claims.sub)),
        Err(_) => Err(EdgeRejection {
            status: StatusCode::FORBIDDEN,
            message: "Invalid token",
        }),
    }
}

/// Forward a vetted request to the tracker service.
async fn proxy(State(state): State<GatewayState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let path = parts.uri.path().to_string();
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let subject = match edge_guard(&state.codec, &path, auth_header) {
        Ok(subject) => subject,
        Err(rejection) => {
            warn!(%path, status = %rejection.status, "edge gateway rejected request");
            return rejection.into_response();
        }
    };

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return EdgeRejection {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "Request body too large",
            }
            .into_response()
        }
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", state.upstream, path_and_query);

    let mut headers = parts.headers.clone();
    headers.remove(axum::http::header::HOST);
    if let Some(subject) = &subject {
        match subject.parse() {
            Ok(value) => {
                headers.insert(ACCOUNT_EMAIL_HEADER, value);
            }
            Err(_) => {
                return EdgeRejection {
                    status: StatusCode::FORBIDDEN,
                    message: "Invalid token",
                }
                .into_response()
            }
        }
    }

    let upstream_response = match state
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(%url, error = %e, "upstream request failed");
            return EdgeRejection {
                status: StatusCode::BAD_GATEWAY,
                message: "Upstream unavailable",
            }
            .into_response();
        }
    };

    let status = upstream_response.status();
    let response_headers = upstream_response.headers().clone();
    let bytes = match upstream_response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%url, error = %e, "failed to read upstream response");
            return EdgeRejection {
                status: StatusCode::BAD_GATEWAY,
                message: "Upstream unavailable",
            }
            .into_response();
        }
    };

    let mut builder = Response::builder().status(status);
    for (name, value) in response_headers.iter() {
        // Recomputed by the server for the buffered body.
        if name == &CONTENT_LENGTH || name == &TRANSFER_ENCODING {
            continue;
        }
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

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

    let token_secret =
        std::env::var(TOKEN_SECRET_ENV).expect("TOKEN_SECRET must be set for the gateway");
    // The gateway only verifies; the TTL is the issuer's concern.
    let codec =
        TokenCodec::new(&token_secret, DEFAULT_TOKEN_TTL).expect("TOKEN_SECRET is not valid base64");

    let state = GatewayState {
        codec: Arc::new(codec),
        client: reqwest::Client::new(),
        upstream: std::env::var("TRACKER_UPSTREAM")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string()),
    };

    let app = Router::new().fallback(proxy).with_state(state);

    let host = std::env::var("GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("GATEWAY_PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(8000);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("failed to parse bind address");

    info!(%addr, "edge gateway listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install ctrl-c handler");
        })
        .await
        .expect("gateway failed");
}
