// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Claims codec: packs [`Claims`] into a signed compact token and back.
//!
//! The envelope is a standard three-segment JWS signed with HMAC-SHA-256.
//! Decoding is split in two stages so that callers can tell a forged or
//! damaged envelope apart from a correctly signed payload with the wrong
//! shape:
//!
//! 1. signature and envelope checks ([`CodecError::Envelope`])
//! 2. claims deserialization ([`CodecError::Payload`])
//!
//! The codec never decrypts the subject.

use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};

use super::claims::Claims;

/// Fixed signing algorithm.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("failed to sign claims: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("token envelope rejected: {0}")]
    Envelope(#[source] jsonwebtoken::errors::Error),

    #[error("claims payload is malformed: {0}")]
    Payload(#[source] jsonwebtoken::errors::Error),
}

pub struct ClaimsCodec {
    header: Header,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl ClaimsCodec {
    pub fn new(secret: &[u8]) -> Result<Self, CodecError> {
        if secret.is_empty() {
            return Err(CodecError::EmptySecret);
        }

        // Expiry lives in the millisecond `ttl` claim and is enforced by the
        // caller, so none of the registered claims are required here.
        let mut validation = Validation::new(ALGORITHM);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Ok(Self {
            header: Header::new(ALGORITHM),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Sign `claims` into a compact token.
    pub fn serialize(&self, claims: &Claims) -> Result<String, CodecError> {
        encode(&self.header, claims, &self.encoding_key).map_err(CodecError::Sign)
    }

    /// Verify the envelope and deserialize its claims.
    pub fn deserialize(&self, token: &str) -> Result<Claims, CodecError> {
        // With the header already parsed, a JSON error out of `decode` can
        // only come from the signed payload.
        decode_header(token).map_err(CodecError::Envelope)?;

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::Json(_) => CodecError::Payload(e),
                _ => CodecError::Envelope(e),
            })
    }
}

impl std::fmt::Debug for ClaimsCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimsCodec")
            .field("algorithm", &self.header.alg)
            .finish_non_exhaustive()
    }
}
