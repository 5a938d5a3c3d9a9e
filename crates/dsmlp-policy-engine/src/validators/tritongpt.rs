use std::sync::Arc;

use crate::{
    admission_request::AdmissionRequest,
    clients::Namespace,
    constants::TGPT_VALIDATOR_ENABLED,
    errors::{Result, ValidationError},
    message::render_names,
    settings::PolicySettings,
};

/// UID allowlist applied to the Namespaces running TritonGPT. It replaces
/// every other check, the identity provider is never consulted.
pub struct TritonGptValidator {
    settings: Arc<PolicySettings>,
}

impl TritonGptValidator {
    pub fn new(settings: Arc<PolicySettings>) -> Self {
        TritonGptValidator { settings }
    }

    /// Whether the Namespace opted into the TritonGPT validation
    pub fn is_enabled(&self, namespace: &Namespace) -> bool {
        namespace.label(&self.settings.tgpt_label) == Some(TGPT_VALIDATOR_ENABLED)
    }

    pub fn validate(&self, request: &AdmissionRequest, namespace: Option<&Namespace>) -> Result<()> {
        let permitted = namespace
            .map(|namespace| permitted_uids(namespace, &self.settings.permitted_uids_label))
            .unwrap_or_default();
        let requested = request.object.spec.run_as_user();

        let is_permitted = requested
            .map(|uid| uid.to_string())
            .is_some_and(|uid| permitted.iter().any(|allowed| *allowed == uid));
        if is_permitted {
            return Ok(());
        }

        let requested = requested
            .map(|uid| uid.to_string())
            .unwrap_or_else(|| "unspecified".to_owned());
        Err(ValidationError::Denied(format!(
            "TritonGPT Validator: user with access to UIDs {} attempted to run a pod as {requested}. Pod denied.",
            render_names(&permitted)
        )))
    }
}

/// The UIDs listed, comma separated, inside of the `label` of the Namespace
pub fn permitted_uids<'a>(namespace: &'a Namespace, label: &str) -> Vec<&'a str> {
    namespace
        .label(label)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|uid| !uid.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
