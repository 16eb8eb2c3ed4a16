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

use super::domain::{RegisterVendorRequest, VendorApplicationId};
use super::service::{RegistrationService, RegistrationServiceError};

/// Router builder exposing vendor registration and lookup endpoints.
pub fn registration_router(service: Arc<RegistrationService>) -> Router {
    Router::new()
        .route("/api/v1/vendors/register", post(register_handler))
        .route(
            "/api/v1/vendors/applications/:id",
            get(application_handler),
        )
        .route("/api/v1/vendors/:id", get(lookup_handler))
        .with_state(service)
}

async fn register_handler(
    State(service): State<Arc<RegistrationService>>,
    axum::Json(request): axum::Json<RegisterVendorRequest>,
) -> Response {
    match service.register(request) {
        Ok(registered) => (StatusCode::CREATED, axum::Json(registered)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn application_handler(
    State(service): State<Arc<RegistrationService>>,
    Path(id): Path<Uuid>,
) -> Response {
    match service.get_application(&VendorApplicationId(id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn lookup_handler(
    State(service): State<Arc<RegistrationService>>,
    Path(id): Path<String>,
) -> Response {
    let snapshot = service.lookup_vendor(&id);
    (StatusCode::OK, axum::Json(snapshot)).into_response()
}

fn error_response(error: RegistrationServiceError) -> Response {
    let status = match &error {
        RegistrationServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        RegistrationServiceError::NotFound => StatusCode::NOT_FOUND,
        RegistrationServiceError::Repository(_) | RegistrationServiceError::Metadata(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
