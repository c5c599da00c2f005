// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tokenwall errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::claims::TokenType;
use super::token::TokenError;
use crate::responder;

/// Reasons the tokenwall refuses a request.
///
/// Every variant maps to `401 Unauthorized`. Client-facing variants expose
/// their name and message; `Internal` exposes nothing. Details carried in
/// the variants are for server-side logs only.
#[derive(Debug)]
pub enum AuthError {
    /// No credential on the request
    TokenwallUndefined,
    /// Credential present but not a usable bearer token
    TokenInvalid(Option<String>),
    /// Token of the wrong type for this route
    TokenwallTypeMismatch {
        expected: TokenType,
        found: TokenType,
    },
    /// Token is past its expiry
    TokenExpired,
    /// Failure whose detail must not reach the client
    Internal(String),
}

impl AuthError {
    /// Error name, as logged and returned to clients.
    pub fn name(&self) -> &'static str {
        match self {
            AuthError::TokenwallUndefined => "TokenwallUndefined",
            AuthError::TokenInvalid(_) => "TokenInvalid",
            AuthError::TokenwallTypeMismatch { .. } => "TokenwallTypeMismatch",
            AuthError::TokenExpired => "TokenExpired",
            AuthError::Internal(_) => "InternalError",
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::TokenwallUndefined => "tokenwall_undefined",
            AuthError::TokenInvalid(_) => "token_invalid",
            AuthError::TokenwallTypeMismatch { .. } => "tokenwall_type_mismatch",
            AuthError::TokenExpired => "token_expired",
            AuthError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    /// Whether the name and message may be shown to the client.
    pub fn is_client_facing(&self) -> bool {
        !matches!(self, AuthError::Internal(_))
    }

    /// Server-side detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AuthError::TokenInvalid(detail) => detail.as_deref(),
            AuthError::Internal(detail) => Some(detail),
            _ => None,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::TokenwallUndefined => write!(f, "Authorization token is required"),
            AuthError::TokenInvalid(_) => write!(f, "Token is invalid"),
            AuthError::TokenwallTypeMismatch { expected, .. } => {
                write!(f, "Token type is not accepted here (expected {expected} token)")
            }
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::Internal(_) => write!(f, "Internal authentication error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<TokenError> for AuthError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::SignatureInvalid(_)
            | TokenError::MalformedPayload(_)
            | TokenError::InvalidArgument(_) => {
                AuthError::TokenInvalid(Some(format!("{}: {e}", e.name())))
            }
            TokenError::Cipher(_) | TokenError::Config(_) | TokenError::Encoding(_) => {
                AuthError::Internal(format!("{}: {e}", e.name()))
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_facing() {
            responder::fail(status, self.name(), self.to_string(), self.error_code())
        } else {
            responder::error(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::cipher::CipherError;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn undefined_returns_401_with_code() {
        let response = AuthError::TokenwallUndefined.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["error"], "TokenwallUndefined");
        assert_eq!(body["code"], "tokenwall_undefined");
    }

    #[tokio::test]
    async fn type_mismatch_names_expected_type() {
        let response = AuthError::TokenwallTypeMismatch {
            expected: TokenType::Access,
            found: TokenType::Activation,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"], "TokenwallTypeMismatch");
        assert!(body["message"].as_str().unwrap().contains("access"));
    }

    #[tokio::test]
    async fn token_invalid_hides_detail() {
        let err = AuthError::TokenInvalid(Some("SignatureInvalid: InvalidSignature".into()));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "TokenInvalid");
        assert!(!body.to_string().contains("SignatureInvalid"));
    }

    #[tokio::test]
    async fn internal_returns_opaque_401() {
        let err: AuthError = TokenError::Cipher(CipherError::Decrypt).into();
        assert!(!err.is_client_facing());
        assert!(err.detail().unwrap().contains("DecryptionError"));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, serde_json::json!({ "status": "error" }));
    }

    #[test]
    fn token_errors_are_classified() {
        let invalid: AuthError = TokenError::InvalidArgument("token is required").into();
        assert!(matches!(invalid, AuthError::TokenInvalid(Some(_))));

        let config: AuthError = TokenError::Config("missing".into()).into();
        assert!(matches!(config, AuthError::Internal(_)));
    }
}
