use axum::{
    extract::{self, FromRequest},
    Json,
};
use dsmlp_policy_engine::admission_response::{AdmissionResponse, AdmissionReviewResponse};
use std::sync::Arc;
use tracing::{debug, error, Span};

use crate::api::{api_error::ApiError, state::ApiServerState};

// create an extractor that internally uses `axum::Json` but has a custom rejection
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub(crate) struct JsonExtractor<T>(T);

/// Validate the Pod carried by an AdmissionReview.
///
/// The review is handed over undecoded: malformed reviews still get an
/// AdmissionReview response, denying the request.
#[tracing::instrument(
    name = "validation",
    fields(
        request_uid=tracing::field::Empty,
        host=crate::config::HOSTNAME.as_str(),
        username=tracing::field::Empty,
        namespace=tracing::field::Empty,
        allowed=tracing::field::Empty,
        response_message=tracing::field::Empty,
    ),
    skip_all)]
pub(crate) async fn validate_handler(
    extract::State(state): extract::State<Arc<ApiServerState>>,
    JsonExtractor(admission_review): JsonExtractor<serde_json::Value>,
) -> Result<Json<AdmissionReviewResponse>, ApiError> {
    populate_span_with_admission_request_data(&admission_review);

    let _permit = state.semaphore.acquire().await.map_err(|e| {
        error!(error = %e, "cannot acquire evaluation permit");
        ApiError::Unavailable
    })?;

    let response = state.validator.validate_request(&admission_review).await;
    debug!(response =? &response.response, "request validated");

    populate_span_with_validation_results(&response.response);

    Ok(Json(response))
}

pub(crate) async fn readiness_handler() -> &'static str {
    "OK"
}

fn populate_span_with_admission_request_data(admission_review: &serde_json::Value) {
    let span = Span::current();
    let field = |pointer: &str| {
        admission_review
            .pointer(pointer)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
    };

    span.record("request_uid", field("/request/uid"));
    span.record("username", field("/request/userInfo/username"));
    span.record("namespace", field("/request/namespace"));
}

fn populate_span_with_validation_results(response: &AdmissionResponse) {
    Span::current().record("allowed", response.allowed);
    Span::current().record("response_message", response.status.message.as_str());
}
