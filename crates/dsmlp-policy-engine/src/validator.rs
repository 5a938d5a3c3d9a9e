use serde::Deserialize;
use std::sync::Arc;

use crate::{
    admission_request::{AdmissionRequest, AdmissionReview},
    admission_response::{AdmissionResponse, AdmissionReviewResponse},
    clients::{ClusterState, IdentityProvider, Namespace},
    errors::{Result, ValidationError},
    logger::Logger,
    settings::PolicySettings,
    validators::{
        ComponentValidator, GpuQuotaValidator, IdentityValidator, TritonGptValidator,
        ValidationContext,
    },
};

/// The validations run against a request, chosen once the Namespace of the
/// request has been probed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ValidationPath {
    /// The Namespace opted into TritonGPT, only its UID allowlist applies
    TritonOnly,
    /// Identity checks followed by the GPU quota
    StandardChain,
    /// The Namespace is not managed by DSMLP
    Skipped,
}

/// Entry point of the admission policy.
///
/// Every request goes through the same pipeline: decode the admission
/// review, probe the Namespace, run the selected validators and turn the
/// first failure into a denial. Policy violations are reported verbatim,
/// every other failure is logged and reported as a generic error.
pub struct Validator {
    cluster: Arc<dyn ClusterState>,
    logger: Arc<dyn Logger>,
    settings: Arc<PolicySettings>,
    tritongpt: TritonGptValidator,
    standard_chain: Vec<ComponentValidator>,
}

impl Validator {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        cluster: Arc<dyn ClusterState>,
        logger: Arc<dyn Logger>,
        settings: PolicySettings,
    ) -> Self {
        let settings = Arc::new(settings);
        let standard_chain = vec![
            ComponentValidator::Identity(IdentityValidator::new(
                identity.clone(),
                settings.clone(),
            )),
            ComponentValidator::GpuQuota(GpuQuotaValidator::new(
                identity,
                cluster.clone(),
                settings.clone(),
            )),
        ];

        Validator {
            cluster,
            logger,
            tritongpt: TritonGptValidator::new(settings.clone()),
            settings,
            standard_chain,
        }
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    /// Evaluate a raw admission review. A response is always produced, even
    /// when the payload cannot be decoded.
    pub async fn validate_request(&self, raw: &serde_json::Value) -> AdmissionReviewResponse {
        self.logger.debug(&format!(
            "request={}",
            serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string())
        ));

        let response = match AdmissionReview::deserialize(raw) {
            Ok(review) => self.handle_request(&review.request).await,
            Err(error) => {
                self.logger
                    .exception(&ValidationError::InvalidRequest(error));
                let uid = pointer_str(raw, "/request/uid");
                self.logger.info(&format!(
                    "Denied request username={} namespace={} reason={} uid={uid}",
                    pointer_str(raw, "/request/userInfo/username"),
                    pointer_str(raw, "/request/namespace"),
                    crate::constants::ERROR_MESSAGE,
                ));
                AdmissionResponse::reject_internal_error(uid.to_owned())
            }
        };

        AdmissionReviewResponse::new(response)
    }

    async fn handle_request(&self, request: &AdmissionRequest) -> AdmissionResponse {
        let username = request.user_info.username.as_str();
        let namespace = request.namespace.as_str();
        let uid = request.uid.as_str();

        self.logger.info(&format!(
            "Validating request username={username} namespace={namespace} uid={uid}"
        ));

        match self.validate_pod(request).await {
            Ok(()) => {
                self.logger.info(&format!(
                    "Allowed request username={username} namespace={namespace} uid={uid}"
                ));
                AdmissionResponse::allow(request.uid.clone())
            }
            Err(ValidationError::Denied(message)) => {
                self.logger.info(&format!(
                    "Denied request username={username} namespace={namespace} reason={message} uid={uid}"
                ));
                AdmissionResponse::reject(request.uid.clone(), message)
            }
            Err(error) => {
                self.logger.exception(&error);
                self.logger.info(&format!(
                    "Denied request username={username} namespace={namespace} reason={} uid={uid}",
                    crate::constants::ERROR_MESSAGE,
                ));
                AdmissionResponse::reject_internal_error(request.uid.clone())
            }
        }
    }

    async fn validate_pod(&self, request: &AdmissionRequest) -> Result<()> {
        let namespace = self.probe_namespace(request).await;
        let ctx = ValidationContext {
            request,
            namespace: namespace.as_ref(),
        };

        match self.validation_path(namespace.as_ref()) {
            ValidationPath::TritonOnly => {
                self.logger
                    .info("Triton GPT Mode Activated. Only running TritonGPT Validator.");
                self.tritongpt.validate(request, ctx.namespace)
            }
            ValidationPath::Skipped => {
                self.logger.debug(&format!(
                    "namespace {} is not managed, skipping validation",
                    request.namespace
                ));
                Ok(())
            }
            ValidationPath::StandardChain => {
                for validator in &self.standard_chain {
                    self.logger
                        .debug(&format!("running {} validator", validator.name()));
                    validator.validate(&ctx).await?;
                }
                Ok(())
            }
        }
    }

    /// Fetch the Namespace of the request. Failures are logged and never
    /// deny the request on their own.
    async fn probe_namespace(&self, request: &AdmissionRequest) -> Option<Namespace> {
        match self.cluster.get_namespace(&request.namespace).await {
            Ok(namespace) => Some(namespace),
            Err(error) => {
                self.logger.exception(&error);
                None
            }
        }
    }

    fn validation_path(&self, namespace: Option<&Namespace>) -> ValidationPath {
        let Some(namespace) = namespace else {
            return ValidationPath::StandardChain;
        };
        if self.tritongpt.is_enabled(namespace) {
            return ValidationPath::TritonOnly;
        }
        match &self.settings.namespace_label_gate {
            Some(gate) if namespace.label(gate).is_none() => ValidationPath::Skipped,
            _ => ValidationPath::StandardChain,
        }
    }
}

fn pointer_str<'a>(raw: &'a serde_json::Value, pointer: &str) -> &'a str {
    raw.pointer(pointer)
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
}
