use serde::Deserialize;

use crate::constants::{
    COURSE_LABEL, DEFAULT_GPU_RESOURCE, DEFAULT_LOW_PRIORITY_CLASS, PERMITTED_UIDS_LABEL,
    TGPT_VALIDATOR_LABEL,
};

/// Knobs of the admission policy. The defaults match the DSMLP cluster.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicySettings {
    /// Name of the extended resource accounted against the GPU quota
    pub gpu_resource: String,

    /// Pods using this priority class are never blocked by the GPU quota
    pub low_priority_class: String,

    /// Pod label restricting the Pod to the students of a course
    pub course_label: String,

    /// Namespace label that, when set to `enabled`, replaces the standard
    /// validation with the TritonGPT UID allowlist
    pub tgpt_label: String,

    /// Namespace label holding the comma separated TritonGPT UID allowlist
    pub permitted_uids_label: String,

    /// When set, only Namespaces carrying this label go through the
    /// standard validation, Pods created elsewhere are allowed.
    pub namespace_label_gate: Option<String>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        PolicySettings {
            gpu_resource: DEFAULT_GPU_RESOURCE.to_owned(),
            low_priority_class: DEFAULT_LOW_PRIORITY_CLASS.to_owned(),
            course_label: COURSE_LABEL.to_owned(),
            tgpt_label: TGPT_VALIDATOR_LABEL.to_owned(),
            permitted_uids_label: PERMITTED_UIDS_LABEL.to_owned(),
            namespace_label_gate: None,
        }
    }
}
