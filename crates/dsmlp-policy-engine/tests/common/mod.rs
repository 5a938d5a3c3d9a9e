#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use dsmlp_policy_engine::{
    clients::{ClusterState, IdentityProvider, Namespace, Team, User},
    errors::ClientError,
    logger::Logger,
    settings::PolicySettings,
    Validator,
};

pub(crate) const REQUEST_UID: &str = "705ab4f5-6393-11e8-b7cc-42010a800002";

/// In-memory identity provider
#[derive(Default)]
pub(crate) struct FakeIdentityProvider {
    users: HashMap<String, User>,
    teams: HashMap<String, Vec<Team>>,
    gpu_quotas: HashMap<String, i64>,
    unavailable: bool,
}

impl FakeIdentityProvider {
    pub(crate) fn with_user(mut self, username: &str, uid: i64, enrollments: &[&str]) -> Self {
        self.users.insert(
            username.to_owned(),
            User {
                uid,
                enrollments: enrollments.iter().map(|c| c.to_string()).collect(),
            },
        );
        self
    }

    pub(crate) fn with_teams(mut self, username: &str, gids: &[i64]) -> Self {
        self.teams.insert(
            username.to_owned(),
            gids.iter().map(|gid| Team { gid: *gid }).collect(),
        );
        self
    }

    pub(crate) fn with_gpu_quota(mut self, username: &str, quota: i64) -> Self {
        self.gpu_quotas.insert(username.to_owned(), quota);
        self
    }

    pub(crate) fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    fn check_available(&self) -> Result<(), ClientError> {
        if self.unavailable {
            return Err(ClientError::Request("connection refused".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn describe_user(&self, username: &str) -> Result<Option<User>, ClientError> {
        self.check_available()?;
        Ok(self.users.get(username).cloned())
    }

    async fn list_user_teams(&self, username: &str) -> Result<Vec<Team>, ClientError> {
        self.check_available()?;
        self.teams
            .get(username)
            .cloned()
            .ok_or_else(|| ClientError::not_found("Teams", username))
    }

    async fn get_user_gpu_quota(&self, username: &str) -> Result<Option<i64>, ClientError> {
        self.check_available()?;
        Ok(self.gpu_quotas.get(username).copied())
    }
}

/// In-memory view of the cluster
#[derive(Default)]
pub(crate) struct FakeClusterState {
    namespaces: HashMap<String, Namespace>,
    gpus_in_use: HashMap<String, i64>,
}

impl FakeClusterState {
    pub(crate) fn with_namespace(
        mut self,
        name: &str,
        labels: &[(&str, &str)],
        gpu_quota: Option<i64>,
    ) -> Self {
        self.namespaces.insert(
            name.to_owned(),
            Namespace {
                name: name.to_owned(),
                labels: labels
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect::<BTreeMap<_, _>>(),
                gpu_quota,
            },
        );
        self
    }

    pub(crate) fn with_gpus_in_use(mut self, name: &str, gpus: i64) -> Self {
        self.gpus_in_use.insert(name.to_owned(), gpus);
        self
    }
}

#[async_trait]
impl ClusterState for FakeClusterState {
    async fn get_namespace(&self, name: &str) -> Result<Namespace, ClientError> {
        self.namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::not_found("Namespace", name))
    }

    async fn get_gpus_in_namespace(&self, name: &str) -> Result<i64, ClientError> {
        Ok(self.gpus_in_use.get(name).copied().unwrap_or_default())
    }
}

/// Keeps every log line, prefixed by its level
#[derive(Default)]
pub(crate) struct RecordingLogger {
    lines: Mutex<Vec<String>>,
}

impl RecordingLogger {
    pub(crate) fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// The lines logged at info level, without their prefix
    pub(crate) fn info_lines(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter_map(|line| line.strip_prefix("INFO ").map(str::to_owned))
            .collect()
    }

    pub(crate) fn exceptions(&self) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.starts_with("EXCEPTION "))
            .count()
    }

    fn push(&self, line: String) {
        self.lines.lock().unwrap().push(line);
    }
}

impl Logger for RecordingLogger {
    fn debug(&self, message: &str) {
        self.push(format!("DEBUG {message}"));
    }

    fn info(&self, message: &str) {
        self.push(format!("INFO {message}"));
    }

    fn exception(&self, error: &(dyn std::error::Error + 'static)) {
        self.push(format!("EXCEPTION {error}"));
    }
}

pub(crate) struct TestValidator {
    pub(crate) validator: Validator,
    pub(crate) logger: Arc<RecordingLogger>,
}

pub(crate) fn validator(
    identity: FakeIdentityProvider,
    cluster: FakeClusterState,
    settings: PolicySettings,
) -> TestValidator {
    let logger = Arc::new(RecordingLogger::default());
    let validator = Validator::new(
        Arc::new(identity),
        Arc::new(cluster),
        logger.clone(),
        settings,
    );
    TestValidator { validator, logger }
}

/// Build the admission review sent by the API server when `username`
/// creates a Pod inside of the `namespace` Namespace
pub(crate) fn admission_review(
    username: &str,
    namespace: &str,
    labels: serde_json::Value,
    spec: serde_json::Value,
) -> serde_json::Value {
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": REQUEST_UID,
            "kind": {"group": "", "version": "v1", "kind": "Pod"},
            "operation": "CREATE",
            "namespace": namespace,
            "userInfo": {"username": username, "groups": ["system:authenticated"]},
            "object": {
                "apiVersion": "v1",
                "kind": "Pod",
                "metadata": {"name": "pod", "labels": labels},
                "spec": spec,
            }
        }
    })
}

pub(crate) fn gpu_container(gpus: i64) -> serde_json::Value {
    json!({
        "name": "main",
        "resources": {"requests": {"nvidia.com/gpu": gpus}, "limits": {"nvidia.com/gpu": gpus}},
    })
}
