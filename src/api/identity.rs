// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{http::StatusCode, response::Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthorizedId;
use crate::responder;

/// Identity resolved from the presented token.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    /// Decrypted user id
    pub authorized_id: String,
}

/// Return the caller's user id (ACCESS token required).
#[utoipa::path(
    get,
    path = "/v1/whoami",
    tag = "Identity",
    responses(
        (status = 200, description = "Token accepted", body = IdentityResponse),
        (status = 401, description = "Missing, invalid, expired or non-access token")
    )
)]
pub async fn whoami(id: AuthorizedId) -> Response {
    identity(id)
}

/// Confirm an activation token and return its user id (ACTIVATION token required).
#[utoipa::path(
    get,
    path = "/v1/activation",
    tag = "Identity",
    responses(
        (status = 200, description = "Activation token accepted", body = IdentityResponse),
        (status = 401, description = "Missing, invalid, expired or non-activation token")
    )
)]
pub async fn activation(id: AuthorizedId) -> Response {
    identity(id)
}

fn identity(id: AuthorizedId) -> Response {
    responder::success(
        StatusCode::OK,
        IdentityResponse {
            authorized_id: id.into_inner(),
        },
    )
}
