use anyhow::{anyhow, Result};
use tracing::{debug, info};

use dsmlp_policy_server::{cli, config::Config, tracing::setup_tracing, AdmissionServer};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;
    debug!("tracing system ready");

    // both the Kubernetes and the AWSEd clients rely on rustls, pick the
    // crypto provider once for the whole process
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Cannot install the rustls crypto provider"))?;

    let server = AdmissionServer::new_from_config(config).await?;
    info!(status = "ready", "admission server");

    server.run().await
}
