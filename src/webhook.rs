// Copyright 2026 Multicluster Operator Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Validating admission webhook for ClusterRegistration.
//!
//! The API server calls this endpoint before persisting a mutation; the
//! decision itself is computed by pure functions in
//! [`cluster_registration`], this module only owns the HTTP/TLS plumbing.

pub mod cluster_registration;

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_server::tls_rustls::RustlsConfig;
use snafu::{ResultExt, Snafu};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("failed to read TLS material from '{}': {}", path.display(), source))]
    ReadTlsMaterial {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(transparent)]
    Tls { source: crate::utils::tls::Error },

    #[snafu(display("invalid TLS configuration: {}", source))]
    TlsConfig { source: std::io::Error },

    #[snafu(display("webhook server error: {}", source))]
    Serve { source: std::io::Error },
}

#[derive(Clone, Debug)]
pub struct Options {
    pub addr: SocketAddr,
    pub tls_cert: PathBuf,
    pub tls_key: PathBuf,
}

/// Serve the admission endpoints over TLS until the process shuts down.
pub async fn serve(options: Options) -> Result<(), Error> {
    let cert = tokio::fs::read(&options.tls_cert)
        .await
        .context(ReadTlsMaterialSnafu {
            path: options.tls_cert.clone(),
        })?;
    let key = tokio::fs::read(&options.tls_key)
        .await
        .context(ReadTlsMaterialSnafu {
            path: options.tls_key.clone(),
        })?;

    // fail fast on a mismatched serving pair instead of at first handshake
    crate::utils::tls::x509_key_pair(&cert, &key)?;

    let config = RustlsConfig::from_pem(cert, key)
        .await
        .context(TlsConfigSnafu)?;

    info!("admission webhook listening on https://{}", options.addr);

    axum_server::bind_rustls(options.addr, config)
        .serve(router().into_make_service())
        .await
        .context(ServeSnafu)
}

/// Admission routes plus the probe endpoints the deployment expects.
pub fn router() -> Router {
    Router::new()
        .route(
            "/validate/clusterregistrations",
            post(cluster_registration::validate_handler),
        )
        .route("/healthz", get(health_check))
        .route("/readyz", get(ready_check))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn ready_check() -> impl IntoResponse {
    (StatusCode::OK, "Ready")
}
