//! Read-only interfaces towards the services consulted while validating a
//! request. Production implementations live in the server crate, tests
//! provide in-memory ones.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::errors::ClientError;

#[cfg(test)]
use mockall::automock;

/// A user known by the identity provider
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    pub uid: i64,
    pub enrollments: Vec<String>,
}

/// A team the user belongs to, each team grants its GID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Team {
    pub gid: i64,
}

/// The Kubernetes Namespace the Pod is being created into
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    /// GPU quota stored on the cluster side
    pub gpu_quota: Option<i64>,
}

impl Namespace {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up a user, `None` when the user does not exist
    async fn describe_user(&self, username: &str) -> Result<Option<User>, ClientError>;

    /// The teams of the user, empty when the user has none
    async fn list_user_teams(&self, username: &str) -> Result<Vec<Team>, ClientError>;

    /// The GPU quota assigned to the user, if any
    async fn get_user_gpu_quota(&self, username: &str) -> Result<Option<i64>, ClientError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterState: Send + Sync {
    async fn get_namespace(&self, name: &str) -> Result<Namespace, ClientError>;

    /// Sum of the GPUs claimed by the Pods already running inside of the
    /// Namespace
    async fn get_gpus_in_namespace(&self, name: &str) -> Result<i64, ClientError>;
}
