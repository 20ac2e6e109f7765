// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the resolved caller identity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::AccountRole;

/// Claim set carried by an issued token.
///
/// The subject is the owning account's email. Extra claims are flattened
/// into the payload and round-trip untouched; the core never branches on
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject: the account email.
    pub sub: String,

    /// Issued-at timestamp (Unix seconds).
    pub iat: i64,

    /// Expiration timestamp (Unix seconds). Always greater than `iat`.
    pub exp: i64,

    /// Additional claims, if any.
    #[serde(flatten, default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Caller identity resolved by the service-side auth gate.
///
/// Handlers receive this instead of the raw token: the gate has already
/// verified the signature and expiry and resolved the subject against the
/// account store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedAccount {
    /// Canonical account id.
    pub account_id: Uuid,

    /// Account email (the token subject).
    pub email: String,

    /// Account role, from the stored record.
    pub role: AccountRole,

    /// Token expiration (Unix timestamp, kept for logging, not serialized).
    #[serde(skip)]
    pub expires_at: i64,
}
