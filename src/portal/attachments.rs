//! Attachment metadata linked to a change request or vendor application. The
//! link is polymorphic by convention only; files themselves live in blob
//! storage and are referenced by URL.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::RepositoryError;

/// Identifier wrapper for attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(pub Uuid);

impl AttachmentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub linked_entity_id: Uuid,
    pub file_name: String,
    pub blob_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Storage abstraction over the attachment table.
pub trait AttachmentRepository: Send + Sync {
    fn insert(&self, attachment: Attachment) -> Result<(), RepositoryError>;
    fn for_entity(&self, entity_id: &Uuid) -> Result<Vec<Attachment>, RepositoryError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterAttachmentRequest {
    pub linked_entity_id: Uuid,
    pub file_name: String,
    pub blob_url: String,
}

/// Thin service over the repository; attachments have no secondary writes.
pub struct AttachmentService {
    repository: Arc<dyn AttachmentRepository>,
}

impl AttachmentService {
    pub fn new(repository: Arc<dyn AttachmentRepository>) -> Self {
        Self { repository }
    }

    pub fn register(
        &self,
        request: RegisterAttachmentRequest,
    ) -> Result<Attachment, RepositoryError> {
        let attachment = Attachment {
            id: AttachmentId::generate(),
            linked_entity_id: request.linked_entity_id,
            file_name: request.file_name,
            blob_url: request.blob_url,
            uploaded_at: Utc::now(),
        };
        self.repository.insert(attachment.clone())?;
        Ok(attachment)
    }

    pub fn list(&self, entity_id: &Uuid) -> Result<Vec<Attachment>, RepositoryError> {
        self.repository.for_entity(entity_id)
    }
}

/// Router builder exposing attachment registration and listing.
pub fn attachment_router(service: Arc<AttachmentService>) -> Router {
    Router::new()
        .route("/api/v1/attachments", post(register_handler))
        .route("/api/v1/attachments/:entity_id", get(list_handler))
        .with_state(service)
}

async fn register_handler(
    State(service): State<Arc<AttachmentService>>,
    axum::Json(request): axum::Json<RegisterAttachmentRequest>,
) -> Response {
    match service.register(request) {
        Ok(attachment) => (StatusCode::CREATED, axum::Json(attachment)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_handler(
    State(service): State<Arc<AttachmentService>>,
    Path(entity_id): Path<Uuid>,
) -> Response {
    match service.list(&entity_id) {
        Ok(attachments) => (StatusCode::OK, axum::Json(attachments)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: RepositoryError) -> Response {
    let status = match &error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict => StatusCode::BAD_REQUEST,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
