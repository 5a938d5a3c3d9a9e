use async_trait::async_trait;
use axum::Router;
use dsmlp_policy_engine::{
    clients::{ClusterState, IdentityProvider, Namespace, Team, User},
    errors::ClientError,
    logger::TracingLogger,
    settings::PolicySettings,
    Validator,
};
use dsmlp_policy_server::{
    config::{AwsedConfig, Config},
    AdmissionServer,
};
use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};
use url::Url;

/// AWSEd knows a single user: `user10`, uid 10, member of the team 1000
struct StaticIdentityProvider;

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn describe_user(&self, username: &str) -> Result<Option<User>, ClientError> {
        Ok((username == "user10").then(|| User {
            uid: 10,
            enrollments: vec!["course1".to_owned()],
        }))
    }

    async fn list_user_teams(&self, username: &str) -> Result<Vec<Team>, ClientError> {
        if username == "user10" {
            Ok(vec![Team { gid: 1000 }])
        } else {
            Err(ClientError::not_found("Teams", username))
        }
    }

    async fn get_user_gpu_quota(&self, _username: &str) -> Result<Option<i64>, ClientError> {
        Ok(None)
    }
}

/// The cluster holds the `user10` Namespace, with a quota of 10 GPUs and
/// 5 of them in use, and the `tritongpt` Namespace
struct StaticClusterState;

#[async_trait]
impl ClusterState for StaticClusterState {
    async fn get_namespace(&self, name: &str) -> Result<Namespace, ClientError> {
        match name {
            "user10" => Ok(Namespace {
                name: name.to_owned(),
                labels: BTreeMap::new(),
                gpu_quota: Some(10),
            }),
            "tritongpt" => Ok(Namespace {
                name: name.to_owned(),
                labels: BTreeMap::from([
                    ("tgpt-validator".to_owned(), "enabled".to_owned()),
                    ("permitted-uids".to_owned(), "30,3000".to_owned()),
                ]),
                gpu_quota: None,
            }),
            _ => Err(ClientError::not_found("Namespace", name)),
        }
    }

    async fn get_gpus_in_namespace(&self, name: &str) -> Result<i64, ClientError> {
        Ok(if name == "user10" { 5 } else { 0 })
    }
}

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
        tls_config: None,
        awsed: AwsedConfig {
            endpoint: Url::parse("http://awsed.test/api").unwrap(),
            api_key: "secret".to_owned(),
        },
        gpu_quota_annotation: "gpu-quota".to_owned(),
        policy_settings: PolicySettings::default(),
        max_concurrent_requests: 2,
        log_level: "info".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

pub(crate) fn app(config: Config) -> Router {
    let validator = Validator::new(
        Arc::new(StaticIdentityProvider),
        Arc::new(StaticClusterState),
        Arc::new(TracingLogger),
        config.policy_settings.clone(),
    );

    AdmissionServer::new(config, validator).router()
}
