// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tokenwall: request-gating middleware for Axum.
//!
//! ## Gate
//!
//! 1. Read `Authorization: Bearer <token>` (scheme case-insensitive).
//!    No header, or an empty one, is `TokenwallUndefined`; any other shape
//!    is `TokenInvalid`.
//! 2. Decode the token (signature and payload shape).
//! 3. Require the configured token type (`TokenwallTypeMismatch`).
//! 4. Require `now < expiresAt` (`TokenExpired`).
//! 5. Decrypt the subject and attach it as [`AuthorizedId`].
//!
//! Rejections are logged at `warn` and answered with `401`.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/whoami", get(whoami))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         Tokenwall::access(tokens),
//!         tokenwall,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::warn;

use super::claims::TokenType;
use super::extractor::AuthorizedId;
use super::token::TokenService;
use super::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Gate configuration: the token service plus the token type a route accepts.
#[derive(Debug, Clone)]
pub struct Tokenwall {
    tokens: Arc<TokenService>,
    required: TokenType,
}

impl Tokenwall {
    pub fn new(tokens: Arc<TokenService>, required: TokenType) -> Self {
        Self { tokens, required }
    }

    /// Gate for access-protected routes.
    pub fn access(tokens: Arc<TokenService>) -> Self {
        Self::new(tokens, TokenType::Access)
    }

    /// Gate for activation-only routes.
    pub fn activation(tokens: Arc<TokenService>) -> Self {
        Self::new(tokens, TokenType::Activation)
    }

    pub fn required(&self) -> TokenType {
        self.required
    }

    /// Run the gate against request headers.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<AuthorizedId, AuthError> {
        self.authorize_at(headers, Utc::now().timestamp_millis())
    }

    fn authorize_at(&self, headers: &HeaderMap, now_ms: i64) -> Result<AuthorizedId, AuthError> {
        let token = extract_bearer(headers)?;
        let claims = self.tokens.decode(token)?;

        if claims.token_type != self.required {
            return Err(AuthError::TokenwallTypeMismatch {
                expected: self.required,
                found: claims.token_type,
            });
        }
        if claims.is_expired_at(now_ms) {
            return Err(AuthError::TokenExpired);
        }

        let user_id = self.tokens.decrypt_subject(&claims)?;
        Ok(AuthorizedId::new(user_id))
    }
}

/// Extract the bearer token from the `Authorization` header.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let mut values = headers.get_all(AUTHORIZATION).iter();
    let header = match (values.next(), values.next()) {
        (None, _) => return Err(AuthError::TokenwallUndefined),
        (Some(header), None) => header,
        (Some(_), Some(_)) => {
            return Err(AuthError::TokenInvalid(Some(
                "multiple authorization headers".to_string(),
            )))
        }
    };

    let value = header
        .to_str()
        .map_err(|_| AuthError::TokenInvalid(Some("non-ASCII authorization header".to_string())))?;
    if value.trim().is_empty() {
        return Err(AuthError::TokenwallUndefined);
    }

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case(BEARER_SCHEME)
                && !token.is_empty()
                && !token.contains(',') =>
        {
            Ok(token)
        }
        _ => Err(AuthError::TokenInvalid(Some(
            "authorization header is not 'Bearer <token>'".to_string(),
        ))),
    }
}

/// Tokenwall middleware function.
pub async fn tokenwall(
    State(wall): State<Tokenwall>,
    mut request: Request,
    next: Next,
) -> Response {
    match wall.authorize(request.headers()) {
        Ok(id) => {
            request.extensions_mut().insert(id);
            next.run(request).await
        }
        Err(err) => {
            warn!(
                error = err.name(),
                message = %err,
                detail = err.detail().unwrap_or_default(),
                path = %request.uri().path(),
                "Tokenwall rejected request"
            );
            err.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::tests::service;
    use axum::{
        body::{to_bytes, Body},
        http::{header::HeaderValue, Request, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn user_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(|id: AuthorizedId| async move { id.into_inner() }),
            )
            .route_layer(from_fn_with_state(Tokenwall::access(tokens), tokenwall))
    }

    async fn send(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn access_token_reaches_handler_with_id() {
        let tokens = Arc::new(service());
        let id = user_id();
        let token = tokens.issue_access(&id).unwrap();

        let (status, body) = send(app(tokens), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, id);
    }

    #[tokio::test]
    async fn scheme_is_case_insensitive() {
        let tokens = Arc::new(service());
        let token = tokens.issue_access("user_123").unwrap();

        let (status, body) = send(app(tokens), Some(&format!("bEaReR {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user_123");
    }

    #[tokio::test]
    async fn missing_header_is_undefined() {
        let (status, body) = send(app(Arc::new(service())), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "TokenwallUndefined");
    }

    #[tokio::test]
    async fn basic_scheme_is_token_invalid() {
        let (status, body) = send(app(Arc::new(service())), Some("Basic abcdef")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["status"], "fail");
        assert_eq!(body["error"], "TokenInvalid");
        assert_eq!(body["code"], "token_invalid");
    }

    #[tokio::test]
    async fn activation_token_is_type_mismatch() {
        let tokens = Arc::new(service());
        let token = tokens.issue_activation(&user_id()).unwrap();

        let (status, body) = send(app(tokens), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "TokenwallTypeMismatch");
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let tokens = Arc::new(service());
        let expired_at = Utc::now().timestamp_millis() - 1_000;
        let token = tokens
            .encode(&user_id(), TokenType::Access, Some(expired_at))
            .unwrap();

        let (status, body) = send(app(tokens), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "TokenExpired");
    }

    #[tokio::test]
    async fn tampered_token_leaks_no_crypto_detail() {
        let tokens = Arc::new(service());
        let token = tokens.issue_access(&user_id()).unwrap();
        let tampered = format!("{token}x");

        let (status, body) = send(app(tokens), Some(&format!("Bearer {tampered}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "TokenInvalid");
        let rendered = body.to_string();
        assert!(!rendered.contains("Signature"));
        assert!(!rendered.contains("signature"));
    }

    #[tokio::test]
    async fn undecryptable_subject_is_opaque() {
        // Same signing secret, different cipher key: the signature verifies
        // but the subject cannot be recovered.
        use crate::auth::cipher::{SubjectCipher, IV_LENGTH};
        use crate::auth::token::tests::SECRET;

        let foreign_cipher =
            SubjectCipher::new(b"fedcba9876543210fedcba9876543210", IV_LENGTH).unwrap();
        let foreign =
            TokenService::new(SECRET, foreign_cipher, chrono::TimeDelta::hours(1)).unwrap();
        let token = foreign.issue_access("user_123").unwrap();

        let (status, body) =
            send(app(Arc::new(service())), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        // Wrong-key CBC decryption occasionally yields valid padding; either
        // way the real id must never come back.
        assert_ne!(body, "user_123");
    }

    #[test]
    fn extract_bearer_shapes() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc")).unwrap(), "abc");
        assert!(matches!(
            extract_bearer(&HeaderMap::new()),
            Err(AuthError::TokenwallUndefined)
        ));
        assert!(matches!(
            extract_bearer(&headers_with("")),
            Err(AuthError::TokenwallUndefined)
        ));

        for bad in [
            "Bearer",
            "Bearer ",
            "Bearer  abc",
            "Bearer abc def",
            "Bearer abc,def",
            "Token abc",
            "abc",
        ] {
            assert!(
                matches!(extract_bearer(&headers_with(bad)), Err(AuthError::TokenInvalid(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn multiple_authorization_headers_are_invalid() {
        let mut headers = HeaderMap::new();
        headers.append(AUTHORIZATION, HeaderValue::from_static("Bearer a"));
        headers.append(AUTHORIZATION, HeaderValue::from_static("Bearer b"));
        assert!(matches!(
            extract_bearer(&headers),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn expiry_is_checked_against_supplied_clock() {
        let tokens = Arc::new(service());
        let token = tokens
            .encode("user_123", TokenType::Access, Some(10_000))
            .unwrap();
        let wall = Tokenwall::access(tokens);
        let headers = headers_with(&format!("Bearer {token}"));

        assert_eq!(
            wall.authorize_at(&headers, 9_999).unwrap().as_str(),
            "user_123"
        );
        assert!(matches!(
            wall.authorize_at(&headers, 10_000),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn activation_gate_accepts_activation_tokens() {
        let tokens = Arc::new(service());
        let token = tokens.issue_activation("user_123").unwrap();
        let wall = Tokenwall::activation(tokens.clone());
        assert_eq!(wall.required(), TokenType::Activation);

        let headers = headers_with(&format!("Bearer {token}"));
        assert_eq!(wall.authorize(&headers).unwrap().as_str(), "user_123");

        let access = tokens.issue_access("user_123").unwrap();
        assert!(matches!(
            wall.authorize(&headers_with(&format!("Bearer {access}"))),
            Err(AuthError::TokenwallTypeMismatch { .. })
        ));
    }
}
