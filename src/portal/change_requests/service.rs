use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::portal::audit::{Artifact, ArtifactStore, DomainEvent, EventLog};
use crate::portal::effects::EffectReport;
use crate::portal::metadata::{MetadataService, MetadataServiceError};
use crate::portal::queue::QueuePublisher;
use crate::portal::RepositoryError;

use super::domain::{
    ApprovalOutcome, ChangeRequest, ChangeRequestId, ChangeRequestStatus, ChangeRequestView,
    CreateChangeRequest, CreatedChangeRequest,
};
use super::repository::ChangeRequestRepository;

/// Entity type under which change request payload rules are declared.
pub const CHANGE_REQUEST_ENTITY: &str = "ChangeRequest";

/// Service composing the change request repository with the audit and queue
/// channels.
pub struct ChangeRequestService {
    repository: Arc<dyn ChangeRequestRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    events: Arc<dyn EventLog>,
    queue: Arc<dyn QueuePublisher>,
    metadata: Arc<MetadataService>,
}

impl ChangeRequestService {
    pub fn new(
        repository: Arc<dyn ChangeRequestRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        events: Arc<dyn EventLog>,
        queue: Arc<dyn QueuePublisher>,
        metadata: Arc<MetadataService>,
    ) -> Self {
        Self {
            repository,
            artifacts,
            events,
            queue,
            metadata,
        }
    }

    /// Create a request at Draft. The payload is validated against the
    /// declared rules before any write.
    pub fn create(
        &self,
        request: CreateChangeRequest,
    ) -> Result<CreatedChangeRequest, ChangeRequestServiceError> {
        self.metadata
            .validate_payload(CHANGE_REQUEST_ENTITY, &request.payload)
            .map_err(reject_invalid_payload)?;

        let record = ChangeRequest {
            id: ChangeRequestId::generate(),
            status: ChangeRequestStatus::Draft,
            vendor_id: request.vendor_id.clone(),
            requester_id: request.requester_id,
            created_at: Utc::now(),
            updated_at: None,
        };

        self.repository.insert(record.clone())?;
        info!(request_id = %record.id, requester_id = %record.requester_id, "change request created");

        let mut report = EffectReport::new();
        report.record(
            "payload_artifact",
            self.artifacts.upsert(Artifact::for_entity(
                record.id.to_string(),
                json!({
                    "request_id": record.id,
                    "payload": request.payload,
                    "new_value": request.payload,
                }),
            )),
        );
        report.record(
            "domain_event",
            self.events.append(DomainEvent::new(
                "ChangeRequestCreated",
                record.id.to_string(),
                json!({
                    "request_id": record.id,
                    "vendor_id": record.vendor_id,
                    "requester_id": record.requester_id,
                }),
            )),
        );

        Ok(CreatedChangeRequest {
            request_id: record.id,
            status: record.status.label(),
            side_effects: report,
        })
    }

    /// Hybrid read: relational metadata plus the archived payload when the
    /// document store still has it.
    pub fn get(
        &self,
        id: &ChangeRequestId,
    ) -> Result<ChangeRequestView, ChangeRequestServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(ChangeRequestServiceError::NotFound)?;

        // Artifact reads are best-effort like artifact writes; a missing or
        // unreachable document store degrades to metadata-only.
        let payload = self
            .artifacts
            .fetch(&record.id.to_string())
            .ok()
            .flatten()
            .and_then(|artifact| artifact.payload.get("payload").cloned());

        Ok(ChangeRequestView {
            request_id: record.id,
            status: record.status.label(),
            vendor_id: record.vendor_id,
            requester_id: record.requester_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            payload,
        })
    }

    /// Approve a request. A missing id is reported before any write. Two
    /// racing approvals may both succeed; that race is accepted.
    pub fn approve(
        &self,
        id: &ChangeRequestId,
        approver_id: Uuid,
    ) -> Result<ApprovalOutcome, ChangeRequestServiceError> {
        let mut record = self
            .repository
            .fetch(id)?
            .ok_or(ChangeRequestServiceError::NotFound)?;

        record.status = ChangeRequestStatus::Approved;
        record.updated_at = Some(Utc::now());
        self.repository.update(record.clone())?;
        info!(request_id = %record.id, %approver_id, "change request approved");

        let mut report = EffectReport::new();
        report.record(
            "domain_event",
            self.events.append(DomainEvent::new(
                "RequestApproved",
                record.id.to_string(),
                json!({
                    "request_id": record.id,
                    "approver_id": approver_id,
                    "approved_at": record.updated_at,
                }),
            )),
        );
        report.record(
            "queue_publish",
            self.queue.publish(
                "RequestApproved",
                json!({
                    "request_id": record.id,
                    "vendor_id": record.vendor_id,
                }),
            ),
        );

        Ok(ApprovalOutcome {
            request_id: record.id,
            status: record.status.label(),
            side_effects: report,
        })
    }
}

fn reject_invalid_payload(error: MetadataServiceError) -> ChangeRequestServiceError {
    match error {
        MetadataServiceError::Violation(violation) => {
            ChangeRequestServiceError::Validation(violation.to_string())
        }
        other => ChangeRequestServiceError::Metadata(other),
    }
}

/// Error raised by the change request service.
#[derive(Debug, thiserror::Error)]
pub enum ChangeRequestServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("change request not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Metadata(MetadataServiceError),
}
