mod api;
pub mod awsed;
pub mod cli;
pub mod config;
pub mod kubernetes;
pub mod tracing;

use ::tracing::info;
use anyhow::{anyhow, Result};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use dsmlp_policy_engine::{logger::TracingLogger, Validator};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::Semaphore;

use crate::{
    api::state::ApiServerState,
    awsed::AwsedClient,
    config::{Config, TlsConfig},
    kubernetes::KubeClusterState,
};

/// The validating admission webhook: an HTTP(S) server handing the
/// AdmissionReviews sent by the API server to the policy [`Validator`]
pub struct AdmissionServer {
    router: Router,
    addr: SocketAddr,
    tls_config: Option<TlsConfig>,
}

impl AdmissionServer {
    /// Build the server together with the production clients of AWSEd and
    /// of the Kubernetes API
    pub async fn new_from_config(config: Config) -> Result<Self> {
        let identity = AwsedClient::new(&config.awsed)
            .map_err(|e| anyhow!("Cannot create the AWSEd client: {e}"))?;

        let kube_client = kube::Client::try_default()
            .await
            .map_err(|e| anyhow!("Cannot connect to Kubernetes cluster: {e}"))?;
        let cluster = KubeClusterState::new(
            kube_client,
            &config.policy_settings.gpu_resource,
            &config.gpu_quota_annotation,
        );

        let validator = Validator::new(
            Arc::new(identity),
            Arc::new(cluster),
            Arc::new(TracingLogger),
            config.policy_settings.clone(),
        );

        Ok(Self::new(config, validator))
    }

    pub fn new(config: Config, validator: Validator) -> Self {
        let state = Arc::new(ApiServerState {
            semaphore: Semaphore::new(config.max_concurrent_requests),
            validator,
        });

        AdmissionServer {
            router: api::router(state),
            addr: config.addr,
            tls_config: config.tls_config,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn run(self) -> Result<()> {
        match self.tls_config {
            None => {
                let listener = tokio::net::TcpListener::bind(self.addr).await?;
                info!(address = self.addr.to_string().as_str(), "started HTTP server");
                axum::serve(listener, self.router).await?;
            }
            Some(tls_config) => {
                let rustls_config =
                    RustlsConfig::from_pem_file(&tls_config.cert_file, &tls_config.key_file)
                        .await
                        .map_err(|e| anyhow!("Cannot load the TLS certificate: {e}"))?;
                info!(address = self.addr.to_string().as_str(), "started HTTPS server");
                axum_server::bind_rustls(self.addr, rustls_config)
                    .serve(self.router.into_make_service())
                    .await?;
            }
        }

        Ok(())
    }
}
