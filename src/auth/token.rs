// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token service: issues and decodes identity tokens.
//!
//! ## Lifecycle
//!
//! `Issued -> (Valid | Expired | Tampered)`. There is no revocation; a token
//! stops working when it expires or when the signing secret / cipher key is
//! rotated.
//!
//! `decode` only proves the token was issued by this process and returns its
//! claims with the subject still encrypted. Type and expiry checks belong to
//! the caller (see [`crate::auth::middleware`]).

use chrono::{TimeDelta, Utc};

use super::cipher::{CipherError, SubjectCipher};
use super::claims::{Claims, ClaimsError, TokenType};
use super::codec::{ClaimsCodec, CodecError};
use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("token signature is invalid: {0}")]
    SignatureInvalid(#[source] jsonwebtoken::errors::Error),

    #[error("token payload is malformed: {0}")]
    MalformedPayload(#[source] jsonwebtoken::errors::Error),

    #[error("subject cipher failure: {0}")]
    Cipher(#[from] CipherError),

    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Stable error name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            TokenError::Config(_) => "ConfigError",
            TokenError::InvalidArgument(_) => "InvalidArgument",
            TokenError::SignatureInvalid(_) => "SignatureInvalid",
            TokenError::MalformedPayload(_) => "MalformedPayload",
            TokenError::Cipher(_) => "DecryptionError",
            TokenError::Encoding(_) => "EncodingError",
        }
    }
}

impl From<CodecError> for TokenError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::EmptySecret => TokenError::Config(e.to_string()),
            CodecError::Sign(source) => TokenError::Encoding(source),
            CodecError::Envelope(source) => TokenError::SignatureInvalid(source),
            CodecError::Payload(source) => TokenError::MalformedPayload(source),
        }
    }
}

impl From<ClaimsError> for TokenError {
    fn from(e: ClaimsError) -> Self {
        match e {
            ClaimsError::EmptySubject => TokenError::InvalidArgument("user id is required"),
            ClaimsError::MissingType => TokenError::InvalidArgument("token type is required"),
        }
    }
}

/// Issues and decodes tokens.
///
/// Built once at startup and shared read-only (`Arc<TokenService>`) by all
/// request handlers.
#[derive(Debug)]
pub struct TokenService {
    codec: ClaimsCodec,
    cipher: SubjectCipher,
    default_ttl: TimeDelta,
}

impl TokenService {
    /// Create a token service.
    ///
    /// # Errors
    /// `TokenError::Config` if the secret is empty or the TTL is not positive.
    pub fn new(
        secret_key: &str,
        cipher: SubjectCipher,
        default_ttl: TimeDelta,
    ) -> Result<Self, TokenError> {
        if default_ttl <= TimeDelta::zero() {
            return Err(TokenError::Config("default token TTL must be positive".to_string()));
        }

        Ok(Self {
            codec: ClaimsCodec::new(secret_key.as_bytes())?,
            cipher,
            default_ttl,
        })
    }

    /// Build the service from process configuration.
    pub fn from_config(config: &Config) -> Result<Self, TokenError> {
        let cipher = SubjectCipher::new(&config.cipher_key, config.iv_length)
            .map_err(|e| TokenError::Config(e.to_string()))?;
        Self::new(&config.secret_key, cipher, config.token_ttl)
    }

    pub fn default_ttl(&self) -> TimeDelta {
        self.default_ttl
    }

    /// Issue a token for `user_id`.
    ///
    /// `expires_at` (ms since epoch) overrides the default lifetime.
    pub fn encode(
        &self,
        user_id: &str,
        token_type: TokenType,
        expires_at: Option<i64>,
    ) -> Result<String, TokenError> {
        self.encode_at(user_id, token_type, expires_at, Utc::now().timestamp_millis())
    }

    fn encode_at(
        &self,
        user_id: &str,
        token_type: TokenType,
        expires_at: Option<i64>,
        now: i64,
    ) -> Result<String, TokenError> {
        if user_id.is_empty() {
            return Err(TokenError::InvalidArgument("user id is required"));
        }
        if token_type == TokenType::None {
            return Err(TokenError::InvalidArgument("token type is required"));
        }

        let expires_at =
            expires_at.unwrap_or_else(|| now.saturating_add(self.default_ttl.num_milliseconds()));
        let subject = self.cipher.encrypt(user_id)?;
        let claims = Claims::new(subject, token_type, now, expires_at)?;

        Ok(self.codec.serialize(&claims)?)
    }

    /// Issue an access token with the default lifetime.
    pub fn issue_access(&self, user_id: &str) -> Result<String, TokenError> {
        self.encode(user_id, TokenType::Access, None)
    }

    /// Issue an activation token with the default lifetime.
    pub fn issue_activation(&self, user_id: &str) -> Result<String, TokenError> {
        self.encode(user_id, TokenType::Activation, None)
    }

    /// Verify a token and return its claims, subject still encrypted.
    ///
    /// Does not check expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::InvalidArgument("token is required"));
        }
        Ok(self.codec.deserialize(token)?)
    }

    /// Decrypt the subject of decoded claims into the user id.
    pub fn decrypt_subject(&self, claims: &Claims) -> Result<String, TokenError> {
        Ok(self.cipher.decrypt(&claims.subject)?)
    }
}
