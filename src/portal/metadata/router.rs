use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

use super::domain::{ReferenceDataItem, ValidationRule};
use super::service::{MetadataService, MetadataServiceError};
use super::store::MetadataStoreError;

/// Router builder for reference data and validation-rule administration.
pub fn metadata_router(service: Arc<MetadataService>) -> Router {
    Router::new()
        .route(
            "/api/v1/metadata/reference/:category",
            get(reference_list_handler),
        )
        .route("/api/v1/metadata/reference", post(reference_upsert_handler))
        .route(
            "/api/v1/metadata/reference/:category/:id",
            delete(reference_delete_handler),
        )
        .route(
            "/api/v1/metadata/rules/:entity_type",
            get(rules_list_handler),
        )
        .route("/api/v1/metadata/rules", post(rule_upsert_handler))
        .route(
            "/api/v1/metadata/rules/:entity_type/:id",
            delete(rule_delete_handler),
        )
        .with_state(service)
}

async fn reference_list_handler(
    State(service): State<Arc<MetadataService>>,
    Path(category): Path<String>,
) -> Response {
    match service.reference_data(&category) {
        Ok(items) => (StatusCode::OK, axum::Json(items)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn reference_upsert_handler(
    State(service): State<Arc<MetadataService>>,
    axum::Json(item): axum::Json<ReferenceDataItem>,
) -> Response {
    match service.upsert_reference(item) {
        Ok(stored) => (StatusCode::OK, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn reference_delete_handler(
    State(service): State<Arc<MetadataService>>,
    Path((category, id)): Path<(String, String)>,
) -> Response {
    match service.delete_reference(&id, &category) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

async fn rules_list_handler(
    State(service): State<Arc<MetadataService>>,
    Path(entity_type): Path<String>,
) -> Response {
    match service.validation_rules(&entity_type) {
        Ok(rules) => (StatusCode::OK, axum::Json(rules)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn rule_upsert_handler(
    State(service): State<Arc<MetadataService>>,
    axum::Json(rule): axum::Json<ValidationRule>,
) -> Response {
    match service.upsert_rule(rule) {
        Ok(stored) => (StatusCode::OK, axum::Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn rule_delete_handler(
    State(service): State<Arc<MetadataService>>,
    Path((entity_type, id)): Path<(String, String)>,
) -> Response {
    match service.delete_rule(&id, &entity_type) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: MetadataServiceError) -> Response {
    let status = match &error {
        MetadataServiceError::Violation(_) | MetadataServiceError::Compile(_) => {
            StatusCode::BAD_REQUEST
        }
        MetadataServiceError::Store(MetadataStoreError::NotFound) => StatusCode::NOT_FOUND,
        MetadataServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
