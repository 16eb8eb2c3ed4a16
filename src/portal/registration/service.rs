use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::portal::audit::{Artifact, ArtifactStore, DomainEvent, EventLog};
use crate::portal::change_requests::domain::{
    ChangeRequest, ChangeRequestId, ChangeRequestStatus,
};
use crate::portal::change_requests::repository::ChangeRequestRepository;
use crate::portal::effects::EffectReport;
use crate::portal::metadata::{MetadataService, MetadataServiceError};
use crate::portal::queue::{QueuePublisher, VENDOR_APPLICATION_SUBMITTED_EVENT};
use crate::portal::RepositoryError;

use super::domain::{
    ApplicationStatus, RegisterVendorRequest, RegistrationSource, VendorApplication,
    VendorApplicationId, VendorMasterData,
};
use super::repository::ApplicationRepository;

/// Entity type under which vendor application rules are declared.
pub const VENDOR_APPLICATION_ENTITY: &str = "VendorApplication";

/// Self-service onboarding: a vendor application plus a linked change request
/// that carries the proposal through the approval workflow.
pub struct RegistrationService {
    applications: Arc<dyn ApplicationRepository>,
    change_requests: Arc<dyn ChangeRequestRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    events: Arc<dyn EventLog>,
    queue: Arc<dyn QueuePublisher>,
    metadata: Arc<MetadataService>,
}

/// Outcome of a self-service registration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegisteredVendor {
    pub application_id: VendorApplicationId,
    pub change_request_id: ChangeRequestId,
    pub status: &'static str,
    pub side_effects: EffectReport,
}

impl RegistrationService {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        change_requests: Arc<dyn ChangeRequestRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        events: Arc<dyn EventLog>,
        queue: Arc<dyn QueuePublisher>,
        metadata: Arc<MetadataService>,
    ) -> Self {
        Self {
            applications,
            change_requests,
            artifacts,
            events,
            queue,
            metadata,
        }
    }

    /// Register a vendor without an invitation. Duplicate-email and rule
    /// checks run before any write.
    pub fn register(
        &self,
        request: RegisterVendorRequest,
    ) -> Result<RegisteredVendor, RegistrationServiceError> {
        let email = request.contact_email.trim().to_string();

        if self.applications.find_by_email(&email)?.is_some() {
            return Err(RegistrationServiceError::Validation(format!(
                "a vendor application already exists for {email}"
            )));
        }
        self.metadata
            .validate_payload(VENDOR_APPLICATION_ENTITY, &request.details)
            .map_err(reject_invalid_payload)?;

        let application = VendorApplication {
            id: VendorApplicationId::generate(),
            company_name: request.company_name.clone(),
            tax_id: request.tax_id.clone(),
            contact_name: request.contact_name.clone(),
            contact_email: email.clone(),
            status: ApplicationStatus::Pending,
            source: RegistrationSource::SelfService,
            invitation_id: None,
            created_at: Utc::now(),
        };
        self.applications.insert(application.clone())?;

        // New-vendor onboarding rides the change request workflow; there is
        // no known requester identity for self-service submissions.
        let change_request = ChangeRequest {
            id: ChangeRequestId::generate(),
            status: ChangeRequestStatus::Submitted,
            vendor_id: None,
            requester_id: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: None,
        };
        self.change_requests.insert(change_request.clone())?;
        info!(
            application_id = %application.id,
            change_request_id = %change_request.id,
            company = %application.company_name,
            "vendor application submitted"
        );

        let mut report = EffectReport::new();
        report.record(
            "payload_artifact",
            self.artifacts.upsert(Artifact::for_entity(
                change_request.id.to_string(),
                json!({
                    "request_id": change_request.id,
                    "application_id": application.id,
                    "payload": request.details,
                    "new_value": request.details,
                }),
            )),
        );
        report.record(
            "domain_event",
            self.events.append(DomainEvent::new(
                "VendorApplicationSubmitted",
                change_request.id.to_string(),
                json!({
                    "application_id": application.id,
                    "company_name": application.company_name,
                }),
            )),
        );
        report.record(
            "queue_publish",
            self.queue.publish(
                VENDOR_APPLICATION_SUBMITTED_EVENT,
                json!({
                    "application_id": application.id,
                    "change_request_id": change_request.id,
                    "company_name": application.company_name,
                    "contact_email": application.contact_email,
                }),
            ),
        );

        Ok(RegisteredVendor {
            application_id: application.id,
            change_request_id: change_request.id,
            status: application.status.label(),
            side_effects: report,
        })
    }

    pub fn get_application(
        &self,
        id: &VendorApplicationId,
    ) -> Result<VendorApplication, RegistrationServiceError> {
        self.applications
            .fetch(id)?
            .ok_or(RegistrationServiceError::NotFound)
    }

    /// Mocked upstream master-data lookup; no live ERP integration exists.
    pub fn lookup_vendor(&self, vendor_id: &str) -> VendorMasterData {
        VendorMasterData::mocked(vendor_id)
    }
}

fn reject_invalid_payload(error: MetadataServiceError) -> RegistrationServiceError {
    match error {
        MetadataServiceError::Violation(violation) => {
            RegistrationServiceError::Validation(violation.to_string())
        }
        other => RegistrationServiceError::Metadata(other),
    }
}

/// Error raised by the registration service.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("vendor application not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Metadata(MetadataServiceError),
}
