use anyhow::{anyhow, Result};
use clap::ArgMatches;
use dsmlp_policy_engine::settings::PolicySettings;
use lazy_static::lazy_static;
use std::net::SocketAddr;
use url::Url;

lazy_static! {
    pub(crate) static ref HOSTNAME: String =
        std::env::var("HOSTNAME").unwrap_or_else(|_| String::from("unknown"));
}

pub struct Config {
    pub addr: SocketAddr,
    pub tls_config: Option<TlsConfig>,
    pub awsed: AwsedConfig,
    pub gpu_quota_annotation: String,
    pub policy_settings: PolicySettings,
    pub max_concurrent_requests: usize,
    pub log_level: String,
    pub log_fmt: String,
    pub log_no_color: bool,
}

pub struct TlsConfig {
    pub cert_file: String,
    pub key_file: String,
}

pub struct AwsedConfig {
    pub endpoint: Url,
    pub api_key: String,
}

impl Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        let addr = api_bind_address(matches)?;

        let (cert_file, key_file) = tls_files(matches)?;
        let tls_config = if cert_file.is_empty() {
            None
        } else {
            Some(TlsConfig {
                cert_file,
                key_file,
            })
        };

        let awsed = awsed_config(matches)?;

        let policy_settings = PolicySettings {
            gpu_resource: required_string(matches, "gpu-resource")?,
            low_priority_class: required_string(matches, "low-priority-class")?,
            namespace_label_gate: matches
                .get_one::<String>("namespace-label-gate")
                .filter(|label| !label.is_empty())
                .cloned(),
            ..Default::default()
        };
        let gpu_quota_annotation = required_string(matches, "gpu-quota-annotation")?;

        let max_concurrent_requests = match matches.get_one::<String>("max-concurrent-requests") {
            Some(value) => value
                .parse::<usize>()
                .map_err(|e| anyhow!("error parsing the maximum number of requests: {e}"))?,
            None => num_cpus::get(),
        };
        if max_concurrent_requests == 0 {
            return Err(anyhow!(
                "error parsing arguments: --max-concurrent-requests must be greater than zero"
            ));
        }

        let log_level = required_string(matches, "log-level")?;
        let log_fmt = required_string(matches, "log-fmt")?;
        let log_no_color = matches.get_flag("log-no-color");

        Ok(Self {
            addr,
            tls_config,
            awsed,
            gpu_quota_annotation,
            policy_settings,
            max_concurrent_requests,
            log_level,
            log_fmt,
            log_no_color,
        })
    }
}

fn required_string(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .ok_or_else(|| anyhow!("error parsing arguments: missing value for {id}"))
}

fn api_bind_address(matches: &ArgMatches) -> Result<SocketAddr> {
    format!(
        "{}:{}",
        required_string(matches, "address")?,
        required_string(matches, "port")?
    )
    .parse()
    .map_err(|e| anyhow!("error parsing arguments: {}", e))
}

fn tls_files(matches: &ArgMatches) -> Result<(String, String)> {
    let cert_file = required_string(matches, "cert-file")?;
    let key_file = required_string(matches, "key-file")?;
    if cert_file.is_empty() != key_file.is_empty() {
        Err(anyhow!("error parsing arguments: either both --cert-file and --key-file must be provided, or neither"))
    } else {
        Ok((cert_file, key_file))
    }
}

fn awsed_config(matches: &ArgMatches) -> Result<AwsedConfig> {
    let endpoint = required_string(matches, "awsed-endpoint")?;
    let endpoint = Url::parse(&endpoint)
        .map_err(|e| anyhow!("error parsing the AWSEd endpoint {endpoint}: {e}"))?;
    let api_key = required_string(matches, "awsed-api-key")?;

    Ok(AwsedConfig { endpoint, api_key })
}
