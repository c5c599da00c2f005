// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tokenwall Server - Bearer Token Issuance and Request Gating
//!
//! Issues signed identity tokens whose subject is encrypted, and gates
//! protected HTTP routes on them.
//!
//! ## Modules
//!
//! - `auth` - Token cipher, claims codec, token service, tokenwall middleware
//! - `api` - HTTP routes (Axum)
//! - `config` - Environment configuration, loaded once at startup
//! - `responder` - JSON success / fail / error envelope
//! - `telemetry` - Logging setup
//! - `tls` - Optional HTTPS

pub mod api;
pub mod auth;
pub mod config;
pub mod responder;
pub mod state;
pub mod telemetry;
pub mod tls;
