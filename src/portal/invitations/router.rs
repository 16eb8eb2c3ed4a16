use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::domain::{CompleteInvitationRequest, CreateInvitationRequest, InvitationId};
use super::service::{InvitationService, InvitationServiceError};

/// Router builder exposing the invitation workflow endpoints.
pub fn invitation_router(service: Arc<InvitationService>) -> Router {
    Router::new()
        .route(
            "/api/v1/invitations",
            post(create_handler).get(list_handler),
        )
        .route("/api/v1/invitations/validate/:token", get(validate_handler))
        .route("/api/v1/invitations/details/:token", get(details_handler))
        .route("/api/v1/invitations/complete/:token", post(complete_handler))
        .route("/api/v1/invitations/:id/resend", post(resend_handler))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(default = "default_page")]
    page: usize,
    #[serde(default = "default_page_size")]
    page_size: usize,
    #[serde(default)]
    status: Option<String>,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

async fn create_handler(
    State(service): State<Arc<InvitationService>>,
    axum::Json(request): axum::Json<CreateInvitationRequest>,
) -> Response {
    // No authentication layer; the acting approver is mocked.
    let invited_by = Uuid::new_v4();
    let invited_by_name = "System Admin";

    match service.create(request, invited_by, invited_by_name) {
        Ok(created) => (StatusCode::CREATED, axum::Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_handler(
    State(service): State<Arc<InvitationService>>,
    Query(params): Query<ListParams>,
) -> Response {
    match service.list(params.page, params.page_size, params.status.as_deref()) {
        Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn validate_handler(
    State(service): State<Arc<InvitationService>>,
    Path(token): Path<String>,
) -> Response {
    match service.validate(&token) {
        Ok(verdict) => (StatusCode::OK, axum::Json(verdict)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn details_handler(
    State(service): State<Arc<InvitationService>>,
    Path(token): Path<String>,
) -> Response {
    match service.details(&token) {
        Ok(details) => (StatusCode::OK, axum::Json(details)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn complete_handler(
    State(service): State<Arc<InvitationService>>,
    Path(token): Path<String>,
    axum::Json(request): axum::Json<CompleteInvitationRequest>,
) -> Response {
    match service.complete(&token, request) {
        Ok(completed) => (StatusCode::OK, axum::Json(completed)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn resend_handler(
    State(service): State<Arc<InvitationService>>,
    Path(id): Path<Uuid>,
) -> Response {
    let requested_by = Uuid::new_v4();
    match service.resend(&InvitationId(id), requested_by) {
        Ok(outcome) => (
            StatusCode::OK,
            axum::Json(json!({
                "invitation_id": outcome.invitation_id,
                "expires_at": outcome.expires_at,
                "side_effects": outcome.side_effects,
                "message": "Invitation has been resent successfully",
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: InvitationServiceError) -> Response {
    let status = match &error {
        InvitationServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        InvitationServiceError::NotFound => StatusCode::NOT_FOUND,
        InvitationServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
