// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response envelope shared by all handlers.
//!
//! ```json
//! { "status": "success", "data": { ... } }
//! { "status": "fail", "error": "TokenInvalid", "message": "...", "code": "token_invalid" }
//! { "status": "error" }
//! ```
//!
//! `fail` is for errors the client is allowed to understand; `error` carries
//! no detail at all.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Envelope<T> {
    Success {
        data: T,
    },
    Fail {
        error: &'static str,
        message: String,
        code: &'static str,
    },
    Error,
}

/// Successful response carrying `data`.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(Envelope::Success { data })).into_response()
}

/// Client-facing failure with a name, message and code.
pub fn fail(
    status: StatusCode,
    error: &'static str,
    message: impl Into<String>,
    code: &'static str,
) -> Response {
    let body: Envelope<()> = Envelope::Fail {
        error,
        message: message.into(),
        code,
    };
    (status, Json(body)).into_response()
}

/// Opaque failure; nothing beyond the status is disclosed.
pub fn error(status: StatusCode) -> Response {
    (status, Json(Envelope::<()>::Error)).into_response()
}
