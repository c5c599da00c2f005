// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the identity resolved by the tokenwall.
//!
//! ```rust,ignore
//! async fn my_handler(id: AuthorizedId) -> impl IntoResponse {
//!     // id.as_str() is the decrypted user id
//! }
//! ```
//!
//! The extractor only reads request extensions; it never decodes tokens
//! itself, so handlers must sit behind [`super::middleware::tokenwall`].

use axum::{extract::FromRequestParts, http::request::Parts};

use super::AuthError;

/// Decrypted user id of the token holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedId(String);

impl AuthorizedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for AuthorizedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for AuthorizedId
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthorizedId>()
            .cloned()
            .ok_or_else(|| AuthError::Internal("handler mounted without tokenwall".to_string()))
    }
}
