use async_trait::async_trait;
use dsmlp_policy_engine::{
    clients::{ClusterState, Namespace},
    errors::ClientError,
    quantity,
};
use k8s_openapi::{
    api::core::v1::{Container, Namespace as KubeNamespace, Pod},
    apimachinery::pkg::api::resource::Quantity,
};
use kube::{api::ListParams, Api, Client};
use std::collections::BTreeMap;
use tracing::debug;

/// Phases of the Pods that no longer hold their resources
const TERMINATED_POD_PHASES: [&str; 2] = ["Succeeded", "Failed"];

/// Reads the state of the cluster through the Kubernetes API
pub struct KubeClusterState {
    client: Client,
    gpu_resource: String,
    gpu_quota_annotation: String,
}

impl KubeClusterState {
    pub fn new(
        client: Client,
        gpu_resource: impl Into<String>,
        gpu_quota_annotation: impl Into<String>,
    ) -> Self {
        KubeClusterState {
            client,
            gpu_resource: gpu_resource.into(),
            gpu_quota_annotation: gpu_quota_annotation.into(),
        }
    }
}

#[async_trait]
impl ClusterState for KubeClusterState {
    async fn get_namespace(&self, name: &str) -> Result<Namespace, ClientError> {
        let api: Api<KubeNamespace> = Api::all(self.client.clone());
        let namespace = api
            .get_opt(name)
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?
            .ok_or_else(|| ClientError::not_found("Namespace", name))?;

        let metadata = namespace.metadata;
        let gpu_quota = metadata
            .annotations
            .as_ref()
            .and_then(|annotations| annotations.get(&self.gpu_quota_annotation))
            .and_then(|quota| quota.trim().parse::<i64>().ok());

        Ok(Namespace {
            name: metadata.name.unwrap_or_else(|| name.to_owned()),
            labels: metadata.labels.unwrap_or_default(),
            gpu_quota,
        })
    }

    async fn get_gpus_in_namespace(&self, name: &str) -> Result<i64, ClientError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), name);
        let pods = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        let gpus: i64 = pods
            .items
            .iter()
            .filter(|pod| !is_terminated(pod))
            .flat_map(|pod| pod.spec.iter().flat_map(|spec| spec.containers.iter()))
            .map(|container| container_gpus(container, &self.gpu_resource))
            .fold(0, i64::saturating_add);
        debug!(namespace = name, gpus, "GPUs in use");

        Ok(gpus)
    }
}

fn is_terminated(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|status| status.phase.as_deref())
        .is_some_and(|phase| TERMINATED_POD_PHASES.iter().any(|terminated| *terminated == phase))
}

fn container_gpus(container: &Container, gpu_resource: &str) -> i64 {
    let Some(resources) = &container.resources else {
        return 0;
    };
    let units = |quantities: Option<&BTreeMap<String, Quantity>>| {
        quantities
            .and_then(|quantities| quantities.get(gpu_resource))
            .map(|quantity| quantity::units_from_str(&quantity.0))
            .unwrap_or_default()
    };

    units(resources.requests.as_ref()).max(units(resources.limits.as_ref()))
}
