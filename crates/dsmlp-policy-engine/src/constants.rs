pub const ADMISSION_REVIEW_API_VERSION: &str = "admission.k8s.io/v1";
pub const ADMISSION_REVIEW_KIND: &str = "AdmissionReview";

pub const ALLOWED_MESSAGE: &str = "Allowed";
/// Message returned to the API server whenever the evaluation fails for
/// reasons other than a policy violation. Details only go to the logs.
pub const ERROR_MESSAGE: &str = "Error";

pub const DEFAULT_GPU_RESOURCE: &str = "nvidia.com/gpu";
pub const DEFAULT_LOW_PRIORITY_CLASS: &str = "low";
pub const DEFAULT_GPU_QUOTA: i64 = 1;

pub const COURSE_LABEL: &str = "dsmlp/course";
pub const TGPT_VALIDATOR_LABEL: &str = "tgpt-validator";
pub const TGPT_VALIDATOR_ENABLED: &str = "enabled";
pub const PERMITTED_UIDS_LABEL: &str = "permitted-uids";

/// Group IDs every user may run as, on top of the GIDs of their teams.
pub const ALWAYS_ALLOWED_GIDS: [i64; 2] = [0, 100];

pub const AUDIT_LOG_TARGET: &str = "audit";
