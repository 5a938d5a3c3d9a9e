use std::sync::Arc;

use tracing::debug;

use crate::{
    admission_request::AdmissionRequest,
    clients::{ClusterState, IdentityProvider, Namespace},
    constants::DEFAULT_GPU_QUOTA,
    errors::{Result, ValidationError},
    settings::PolicySettings,
};

/// Keeps the GPUs claimed inside of a Namespace below the quota of its owner
pub struct GpuQuotaValidator {
    identity: Arc<dyn IdentityProvider>,
    cluster: Arc<dyn ClusterState>,
    settings: Arc<PolicySettings>,
}

impl GpuQuotaValidator {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        cluster: Arc<dyn ClusterState>,
        settings: Arc<PolicySettings>,
    ) -> Self {
        GpuQuotaValidator {
            identity,
            cluster,
            settings,
        }
    }

    /// `namespace` is the Namespace already fetched by the caller, it's
    /// looked up again when missing.
    pub async fn validate(
        &self,
        request: &AdmissionRequest,
        namespace: Option<&Namespace>,
    ) -> Result<()> {
        let spec = &request.object.spec;
        if spec.priority_class_name.as_deref() == Some(self.settings.low_priority_class.as_str()) {
            debug!(
                namespace = request.namespace.as_str(),
                "low priority pod, skipping GPU quota"
            );
            return Ok(());
        }

        let fetched;
        let namespace = match namespace {
            Some(namespace) => namespace,
            None => {
                fetched = self
                    .cluster
                    .get_namespace(&request.namespace)
                    .await
                    .map_err(ValidationError::ClusterState)?;
                &fetched
            }
        };
        let curr_gpus = self
            .cluster
            .get_gpus_in_namespace(&request.namespace)
            .await
            .map_err(ValidationError::ClusterState)?;
        let awsed_quota = self
            .identity
            .get_user_gpu_quota(&request.namespace)
            .await
            .map_err(ValidationError::IdentityProvider)?;

        let utilized_gpus = utilized_gpus(request, &self.settings.gpu_resource);
        if utilized_gpus == 0 {
            return Ok(());
        }

        let quota = effective_gpu_quota(awsed_quota, namespace.gpu_quota);
        debug!(
            namespace = namespace.name.as_str(),
            utilized_gpus, curr_gpus, quota, "checking GPU quota"
        );
        if utilized_gpus.saturating_add(curr_gpus) > quota {
            return Err(ValidationError::Denied(format!(
                "GPU quota exceeded. Wanted {utilized_gpus} but with {curr_gpus} already in use, the quota of {quota} would be exceeded."
            )));
        }
        Ok(())
    }
}

/// GPUs claimed by the Pod: the sum over its containers of the larger
/// between the request and the limit. Init containers are not accounted.
/// The total saturates at `i64::MAX`.
pub fn utilized_gpus(request: &AdmissionRequest, gpu_resource: &str) -> i64 {
    request
        .object
        .spec
        .containers
        .iter()
        .map(|container| container.resource_units(gpu_resource))
        .fold(0, i64::saturating_add)
}

/// The quota coming from the identity provider wins over the one of the
/// Namespace. Values that are not positive are ignored.
pub fn effective_gpu_quota(identity_quota: Option<i64>, namespace_quota: Option<i64>) -> i64 {
    identity_quota
        .filter(|quota| *quota > 0)
        .or(namespace_quota.filter(|quota| *quota > 0))
        .unwrap_or(DEFAULT_GPU_QUOTA)
}
