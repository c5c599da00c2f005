// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{TokenError, TokenService, Tokenwall};
use crate::config::Config;

/// Services shared by every request. Read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(tokens: TokenService) -> Self {
        Self {
            tokens: Arc::new(tokens),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, TokenError> {
        Ok(Self::new(TokenService::from_config(config)?))
    }

    /// Gate for ACCESS-protected routes.
    pub fn access_wall(&self) -> Tokenwall {
        Tokenwall::access(self.tokens.clone())
    }

    /// Gate for ACTIVATION-only routes.
    pub fn activation_wall(&self) -> Tokenwall {
        Tokenwall::activation(self.tokens.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenType;

    #[test]
    fn builds_from_config() {
        let config = Config::from_lookup(|name| match name {
            "TOKEN_SECRET_KEY" => Some("state-secret".to_string()),
            "CIPHER_KEY" => Some("0123456789abcdef0123456789abcdef".to_string()),
            _ => None,
        })
        .unwrap();

        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.tokens.default_ttl(), config.token_ttl);
        assert_eq!(state.access_wall().required(), TokenType::Access);
        assert_eq!(state.activation_wall().required(), TokenType::Activation);
    }
}
