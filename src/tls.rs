// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Optional HTTPS termination with rustls.

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsPaths;

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("failed to install rustls crypto provider")]
    Provider,

    #[error("failed to load TLS material from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Install the ring crypto provider. Must run before any TLS config is built.
pub fn install_crypto_provider() -> Result<(), TlsError> {
    match rustls::crypto::ring::default_provider().install_default() {
        Ok(()) => Ok(()),
        // Already installed by an earlier call.
        Err(_) if rustls::crypto::CryptoProvider::get_default().is_some() => Ok(()),
        Err(_) => Err(TlsError::Provider),
    }
}

/// Load a PEM certificate chain and private key.
pub async fn load_rustls_config(paths: &TlsPaths) -> Result<RustlsConfig, TlsError> {
    RustlsConfig::from_pem_file(&paths.cert_path, &paths.key_path)
        .await
        .map_err(|source| TlsError::Load {
            path: paths.cert_path.display().to_string(),
            source,
        })
}
