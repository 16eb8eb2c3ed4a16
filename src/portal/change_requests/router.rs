use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use uuid::Uuid;

use super::domain::{ChangeRequestId, CreateChangeRequest};
use super::service::{ChangeRequestService, ChangeRequestServiceError};

/// Router builder exposing the change request endpoints.
pub fn change_request_router(service: Arc<ChangeRequestService>) -> Router {
    Router::new()
        .route("/api/v1/change-requests", post(create_handler))
        .route("/api/v1/change-requests/:id", get(get_handler))
        .route("/api/v1/change-requests/:id/approve", post(approve_handler))
        .with_state(service)
}

async fn create_handler(
    State(service): State<Arc<ChangeRequestService>>,
    axum::Json(request): axum::Json<CreateChangeRequest>,
) -> Response {
    match service.create(request) {
        Ok(created) => (StatusCode::CREATED, axum::Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn get_handler(
    State(service): State<Arc<ChangeRequestService>>,
    Path(id): Path<Uuid>,
) -> Response {
    match service.get(&ChangeRequestId(id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn approve_handler(
    State(service): State<Arc<ChangeRequestService>>,
    Path(id): Path<Uuid>,
) -> Response {
    // Approver identity is mocked; there is no authentication layer.
    let approver_id = Uuid::new_v4();
    match service.approve(&ChangeRequestId(id), approver_id) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ChangeRequestServiceError) -> Response {
    let status = match &error {
        ChangeRequestServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ChangeRequestServiceError::NotFound => StatusCode::NOT_FOUND,
        ChangeRequestServiceError::Repository(_) | ChangeRequestServiceError::Metadata(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
