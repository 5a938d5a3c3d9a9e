use serde::{Deserialize, Serialize};

use crate::constants::{
    ADMISSION_REVIEW_API_VERSION, ADMISSION_REVIEW_KIND, ALLOWED_MESSAGE, ERROR_MESSAGE,
};

/// This models the subset of the admission/v1/AdmissionResponse object of
/// Kubernetes produced by this webhook.
/// See https://pkg.go.dev/k8s.io/kubernetes/pkg/apis/admission#AdmissionResponse
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionResponse {
    /// UID is an identifier for the individual request/response.
    /// This must be copied over from the corresponding AdmissionRequest.
    pub uid: String,

    /// Allowed indicates whether or not the admission request was permitted.
    pub allowed: bool,

    /// Status is always filled, allowed requests carry the "Allowed" message.
    pub status: AdmissionResponseStatus,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq, Clone)]
pub struct AdmissionResponseStatus {
    /// A human-readable description of the decision.
    pub message: String,
}

impl AdmissionResponse {
    pub fn allow(uid: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: true,
            status: AdmissionResponseStatus {
                message: ALLOWED_MESSAGE.to_owned(),
            },
        }
    }

    pub fn reject(uid: String, message: String) -> AdmissionResponse {
        AdmissionResponse {
            uid,
            allowed: false,
            status: AdmissionResponseStatus { message },
        }
    }

    /// Rejection used for every failure that is not a policy violation
    pub fn reject_internal_error(uid: String) -> AdmissionResponse {
        AdmissionResponse::reject(uid, ERROR_MESSAGE.to_owned())
    }
}

/// The envelope sent back to the API server
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    pub api_version: String,
    pub kind: String,
    pub response: AdmissionResponse,
}

impl AdmissionReviewResponse {
    pub fn new(response: AdmissionResponse) -> Self {
        AdmissionReviewResponse {
            api_version: ADMISSION_REVIEW_API_VERSION.to_owned(),
            kind: ADMISSION_REVIEW_KIND.to_owned(),
            response,
        }
    }
}
