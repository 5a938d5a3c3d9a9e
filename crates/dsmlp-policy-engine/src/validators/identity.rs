use std::sync::Arc;

use tracing::debug;

use crate::{
    admission_request::{AdmissionRequest, Container, PodSecurityContext},
    clients::{IdentityProvider, Team, User},
    constants::ALWAYS_ALLOWED_GIDS,
    errors::{Result, ValidationError},
    message::{render_ids, render_names},
    settings::PolicySettings,
};

/// Ensures the Pod only runs with the UID and GIDs granted to the owner of
/// the Namespace, and only for the courses the owner is enrolled in.
pub struct IdentityValidator {
    identity: Arc<dyn IdentityProvider>,
    settings: Arc<PolicySettings>,
}

/// The identities the owner of the Namespace may run Pods as
struct AllowedIds {
    uid: i64,
    gids: Vec<i64>,
}

impl AllowedIds {
    fn new(user: &User, teams: &[Team]) -> Self {
        let gids = teams
            .iter()
            .map(|team| team.gid)
            .chain(ALWAYS_ALLOWED_GIDS)
            .collect();
        AllowedIds { uid: user.uid, gids }
    }

    fn check_uid(&self, field: &str, uid: Option<i64>) -> Result<()> {
        match uid {
            Some(uid) if uid != self.uid => Err(ValidationError::Denied(format!(
                "{field}: uid must be in range [{}]",
                self.uid
            ))),
            _ => Ok(()),
        }
    }

    fn check_gid(&self, field: &str, gid: Option<i64>) -> Result<()> {
        match gid {
            Some(gid) if !self.gids.contains(&gid) => Err(ValidationError::Denied(format!(
                "{field}: gid must be in range {}",
                render_ids(&self.gids)
            ))),
            _ => Ok(()),
        }
    }
}

impl IdentityValidator {
    pub fn new(identity: Arc<dyn IdentityProvider>, settings: Arc<PolicySettings>) -> Self {
        IdentityValidator { identity, settings }
    }

    pub async fn validate(&self, request: &AdmissionRequest) -> Result<()> {
        // the Namespace of a user is named after the user
        let username = request.namespace.as_str();

        let user = match self.identity.describe_user(username).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(unknown_user(username)),
            Err(error) if error.is_not_found() => return Err(unknown_user(username)),
            Err(error) => return Err(ValidationError::IdentityProvider(error)),
        };

        let teams = match self.identity.list_user_teams(username).await {
            Ok(teams) => teams,
            Err(error) if error.is_not_found() => {
                debug!(username, "user has no teams");
                Vec::new()
            }
            Err(error) => return Err(ValidationError::IdentityProvider(error)),
        };

        let allowed = AllowedIds::new(&user, &teams);

        self.validate_course(request, &user)?;

        let spec = &request.object.spec;
        if let Some(security_context) = &spec.security_context {
            validate_pod_security_context(&allowed, security_context)?;
        }
        validate_containers(&allowed, "containers", &spec.containers)?;
        validate_containers(&allowed, "initContainers", spec.init_containers())
    }

    fn validate_course(&self, request: &AdmissionRequest, user: &User) -> Result<()> {
        let course_label = self.settings.course_label.as_str();
        match request.object.label(course_label) {
            Some(course) if !user.enrollments.iter().any(|e| e == course) => {
                Err(ValidationError::Denied(format!(
                    "metadata.labels: {course_label} must be in range {}",
                    render_names(&user.enrollments)
                )))
            }
            _ => Ok(()),
        }
    }
}

fn unknown_user(username: &str) -> ValidationError {
    ValidationError::Denied(format!(
        "namespace: no AWSEd user found with username {username}"
    ))
}

fn validate_pod_security_context(
    allowed: &AllowedIds,
    security_context: &PodSecurityContext,
) -> Result<()> {
    let field = "spec.securityContext";

    allowed.check_uid(field, security_context.run_as_user)?;
    allowed.check_gid(field, security_context.run_as_group)?;
    allowed.check_gid(field, security_context.fs_group)?;
    for gid in security_context.supplemental_groups.iter().flatten() {
        allowed.check_gid(field, Some(*gid))?;
    }
    Ok(())
}

fn validate_containers(allowed: &AllowedIds, context: &str, containers: &[Container]) -> Result<()> {
    for (index, container) in containers.iter().enumerate() {
        let Some(security_context) = &container.security_context else {
            continue;
        };
        let field = format!("spec.{context}[{index}].securityContext");
        allowed.check_uid(&field, security_context.run_as_user)?;
        allowed.check_gid(&field, security_context.run_as_group)?;
    }
    Ok(())
}
