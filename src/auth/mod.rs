// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Identity tokens and the tokenwall that enforces them.
//!
//! ## Token Anatomy
//!
//! ```text
//! HS256( { "id": AES-256-CBC(user_id), "type": 1|2, "iat": ms, "ttl": ms } )
//! ```
//!
//! ## Auth Flow
//!
//! 1. An account collaborator calls [`TokenService::encode`] and hands the
//!    token to the client
//! 2. Client sends `Authorization: Bearer <token>`
//! 3. Tokenwall:
//!    - verifies the HMAC signature and payload shape
//!    - requires the route's token type (ACCESS for the API)
//!    - rejects expired tokens
//!    - decrypts `id` → [`AuthorizedId`] in request extensions
//!
//! ## Security
//!
//! - Signing secret and cipher key are loaded once at startup and never
//!   mutated; rotating either invalidates all outstanding tokens
//! - There is no revocation list
//! - Cryptographic failures are logged in full but answered with an opaque
//!   `401`

pub mod cipher;
pub mod claims;
pub mod codec;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod token;

pub use cipher::SubjectCipher;
pub use claims::{Claims, TokenType};
pub use error::AuthError;
pub use extractor::AuthorizedId;
pub use middleware::{tokenwall, Tokenwall};
pub use token::{TokenError, TokenService};
