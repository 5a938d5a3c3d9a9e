//! Typed view of the `admission.k8s.io/v1` AdmissionReview sent by the API
//! server for Pod creations.
//!
//! Only the fields consumed by the validators are modelled, everything else
//! inside of the payload is ignored. Optional fields stay `Option` all the
//! way down: each read site decides which default applies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::quantity;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    pub request: AdmissionRequest,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRequest {
    pub uid: String,
    pub namespace: String,
    pub user_info: UserInfo,
    pub object: PodObject,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PodObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    pub spec: PodSpec,
}

impl PodObject {
    /// Value of the given Pod label, `None` when the Pod has no metadata,
    /// no labels or not that label.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.labels.as_ref())
            .and_then(|labels| labels.get(key))
            .map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    pub containers: Vec<Container>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_containers: Option<Vec<Container>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<PodSecurityContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,
}

impl PodSpec {
    /// The init containers of the Pod, empty when the field is missing
    pub fn init_containers(&self) -> &[Container] {
        self.init_containers.as_deref().unwrap_or_default()
    }

    /// The `runAsUser` declared at Pod level, if any
    pub fn run_as_user(&self) -> Option<i64> {
        self.security_context
            .as_ref()
            .and_then(|context| context.run_as_user)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

impl Container {
    /// Units of `resource` claimed by the container: the largest between the
    /// requested amount and the limit. Missing or unparseable values count
    /// as zero.
    pub fn resource_units(&self, resource: &str) -> i64 {
        let Some(resources) = &self.resources else {
            return 0;
        };
        let requested = resources
            .requests
            .as_ref()
            .and_then(|requests| requests.get(resource))
            .map_or(0, quantity::units_from_value);
        let limit = resources
            .limits
            .as_ref()
            .and_then(|limits| limits.get(resource))
            .map_or(0, quantity::units_from_value);

        requested.max(limit)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSecurityContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_group: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplemental_groups: Option<Vec<i64>>,
}

/// Resource quantities are kept as raw JSON values: the API server sends
/// them as strings (`"1"`), hand written payloads often use plain numbers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<BTreeMap<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<BTreeMap<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    const GPU: &str = "nvidia.com/gpu";
    const COURSE: &str = "dsmlp/course";

    #[test]
    fn deserialize_minimal_review() {
        let review: AdmissionReview = serde_json::from_value(json!({
            "request": {
                "uid": "705ab4f5-6393-11e8-b7cc-42010a800002",
                "namespace": "user10",
                "userInfo": {"username": "user10"},
                "object": {
                    "spec": {"containers": [{}]}
                }
            }
        }))
        .expect("cannot deserialize review");

        let request = review.request;
        assert_eq!(request.namespace, "user10");
        assert_eq!(request.user_info.username, "user10");
        assert!(request.object.metadata.is_none());
        assert!(request.object.label(COURSE).is_none());
        assert!(request.object.spec.init_containers().is_empty());
        assert!(request.object.spec.run_as_user().is_none());
        assert_eq!(request.object.spec.containers.len(), 1);
    }

    #[test]
    fn deserialize_ignores_unknown_fields() {
        let review: AdmissionReview = serde_json::from_value(json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "abc",
                "namespace": "user1",
                "operation": "CREATE",
                "userInfo": {"username": "user1", "groups": ["system:authenticated"]},
                "object": {
                    "apiVersion": "v1",
                    "kind": "Pod",
                    "metadata": {"name": "pod", "labels": {"dsmlp/course": "course1"}},
                    "spec": {
                        "containers": [{"name": "main", "image": "busybox"}],
                        "initContainers": [{"securityContext": {"runAsUser": 1}}],
                        "securityContext": {"runAsUser": 1, "supplementalGroups": [100]},
                        "priorityClassName": "low"
                    }
                }
            }
        }))
        .expect("cannot deserialize review");

        let object = review.request.object;
        assert_eq!(object.label(COURSE), Some("course1"));
        assert_eq!(object.spec.init_containers().len(), 1);
        assert_eq!(object.spec.run_as_user(), Some(1));
        assert_eq!(object.spec.priority_class_name.as_deref(), Some("low"));
    }

    #[test]
    fn deserialize_without_containers_fails() {
        let result = serde_json::from_value::<AdmissionReview>(json!({
            "request": {
                "uid": "abc",
                "namespace": "user1",
                "userInfo": {"username": "user1"},
                "object": {"spec": {}}
            }
        }));

        assert!(result.is_err());
    }

    #[test]
    fn null_labels_are_accepted() {
        let object: PodObject = serde_json::from_value(json!({
            "metadata": {"labels": null},
            "spec": {"containers": []}
        }))
        .expect("cannot deserialize pod");

        assert!(object.label(COURSE).is_none());
    }

    #[rstest]
    #[case::no_resources(json!({}), 0)]
    #[case::only_request(json!({"resources": {"requests": {"nvidia.com/gpu": 2}}}), 2)]
    #[case::only_limit(json!({"resources": {"limits": {"nvidia.com/gpu": "3"}}}), 3)]
    #[case::limit_wins(json!({"resources": {"requests": {"nvidia.com/gpu": 1}, "limits": {"nvidia.com/gpu": "2"}}}), 2)]
    #[case::request_wins(json!({"resources": {"requests": {"nvidia.com/gpu": 4}, "limits": {"nvidia.com/gpu": 1}}}), 4)]
    #[case::unparseable(json!({"resources": {"requests": {"nvidia.com/gpu": "lots"}}}), 0)]
    #[case::other_resource(json!({"resources": {"requests": {"cpu": "2"}}}), 0)]
    fn container_resource_units(#[case] container: serde_json::Value, #[case] expected: i64) {
        let container: Container =
            serde_json::from_value(container).expect("cannot deserialize container");

        assert_eq!(container.resource_units(GPU), expected);
    }
}
