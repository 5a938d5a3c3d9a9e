//! The policy units applied to a Pod.
//!
//! Each validator is independent: it either returns `Ok(())` or stops at the
//! first violation it finds. Sequencing is left to [`crate::Validator`].

mod gpu_quota;
mod identity;
mod tritongpt;

pub use gpu_quota::{effective_gpu_quota, utilized_gpus, GpuQuotaValidator};
pub use identity::IdentityValidator;
pub use tritongpt::{permitted_uids, TritonGptValidator};

use crate::{admission_request::AdmissionRequest, clients::Namespace, errors::Result};

/// Everything a validator can look at while evaluating a request
pub struct ValidationContext<'a> {
    pub request: &'a AdmissionRequest,

    /// The Namespace of the request, `None` when it could not be fetched
    /// ahead of the validation
    pub namespace: Option<&'a Namespace>,
}

pub enum ComponentValidator {
    Identity(IdentityValidator),
    GpuQuota(GpuQuotaValidator),
}

impl ComponentValidator {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentValidator::Identity(_) => "identity",
            ComponentValidator::GpuQuota(_) => "gpu-quota",
        }
    }

    pub async fn validate(&self, ctx: &ValidationContext<'_>) -> Result<()> {
        match self {
            ComponentValidator::Identity(validator) => validator.validate(ctx.request).await,
            ComponentValidator::GpuQuota(validator) => {
                validator.validate(ctx.request, ctx.namespace).await
            }
        }
    }
}
