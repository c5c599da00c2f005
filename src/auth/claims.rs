// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the token type discriminator.

use serde::{Deserialize, Serialize};

/// Token type discriminator, carried on the wire as an integer.
///
/// `None` exists only so that an unset type is representable; it is never
/// issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TokenType {
    None = 0,
    /// Single-purpose token for account activation
    Activation = 1,
    /// Token for protected API routes
    Access = 2,
}

impl TryFrom<u8> for TokenType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TokenType::None),
            1 => Ok(TokenType::Activation),
            2 => Ok(TokenType::Access),
            other => Err(format!("unknown token type {other}")),
        }
    }
}

impl From<TokenType> for u8 {
    fn from(value: TokenType) -> Self {
        value as u8
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::None => write!(f, "none"),
            TokenType::Activation => write!(f, "activation"),
            TokenType::Access => write!(f, "access"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClaimsError {
    #[error("subject is required")]
    EmptySubject,

    #[error("token type is required")]
    MissingType,
}

/// Claims carried inside a token.
///
/// `subject` is the cipher envelope of the user id, not the id itself.
/// Timestamps are milliseconds since the Unix epoch.
///
/// Wire shape: `{ "id": .., "type": 0|1|2, "iat": .., "ttl": .. }`
/// (`ttl` holds the absolute expiry instant). Deserialization applies the
/// same checks as [`Claims::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct Claims {
    /// Encrypted subject
    #[serde(rename = "id")]
    pub subject: String,

    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued at (ms)
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Expires at (ms)
    #[serde(rename = "ttl")]
    pub expires_at: i64,
}

/// Unchecked wire form of [`Claims`].
#[derive(Deserialize)]
struct RawClaims {
    id: String,
    #[serde(rename = "type")]
    token_type: TokenType,
    iat: i64,
    ttl: i64,
}

impl TryFrom<RawClaims> for Claims {
    type Error = ClaimsError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        Claims::new(raw.id, raw.token_type, raw.iat, raw.ttl)
    }
}

impl Claims {
    /// Build claims for issuance.
    pub fn new(
        subject: String,
        token_type: TokenType,
        issued_at: i64,
        expires_at: i64,
    ) -> Result<Self, ClaimsError> {
        if subject.is_empty() {
            return Err(ClaimsError::EmptySubject);
        }
        if token_type == TokenType::None {
            return Err(ClaimsError::MissingType);
        }

        Ok(Self {
            subject,
            token_type,
            issued_at,
            expires_at,
        })
    }

    /// Whether the token is past its expiry at `now_ms`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}
