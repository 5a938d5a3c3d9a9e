use thiserror::Error;

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Failures reported by the identity provider and cluster state clients
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{kind} \"{name}\" not found")]
    NotFound { kind: String, name: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        ClientError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }
}

/// Outcome of a failed validation.
///
/// `Denied` is the only variant whose text reaches the API server, all the
/// others are logged and reported with a generic message.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Denied(String),

    #[error("identity provider failure")]
    IdentityProvider(#[source] ClientError),

    #[error("cluster state failure")]
    ClusterState(#[source] ClientError),

    #[error("cannot decode admission review")]
    InvalidRequest(#[from] serde_json::Error),
}

/// Render an error followed by all its sources, separated by `: `
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
