use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;

/// Failures happening before a request reaches the validator. They are not
/// admission decisions, hence they are reported outside of an AdmissionReview.
#[derive(Debug)]
pub(crate) enum ApiError {
    /// The body is not a JSON document, or it's not declared as one
    InvalidBody(JsonRejection),
    /// The server is shutting down and no longer evaluates requests
    Unavailable,
}

/// Body of the error responses: `{"message": "...", "status": 400}`
#[derive(Debug, Serialize)]
struct ErrorPayload {
    message: String,
    status: u16,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidBody(rejection) => {
                format!("Cannot decode the AdmissionReview: {}", rejection.body_text())
            }
            ApiError::Unavailable => "The admission server is shutting down".to_owned(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        warn!(status = status.as_u16(), message = message.as_str(), "request rejected");

        (
            status,
            Json(ErrorPayload {
                message,
                status: status.as_u16(),
            }),
        )
            .into_response()
    }
}
