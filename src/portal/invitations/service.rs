use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::PortalConfig;
use crate::portal::audit::{Artifact, ArtifactStore, DomainEvent, EventLog};
use crate::portal::effects::EffectReport;
use crate::portal::notifications::InvitationEmailPayload;
use crate::portal::queue::{QueuePublisher, INVITATION_CREATED_EVENT};
use crate::portal::registration::domain::{
    ApplicationStatus, RegistrationSource, VendorApplication, VendorApplicationId,
};
use crate::portal::registration::repository::ApplicationRepository;
use crate::portal::RepositoryError;

use super::domain::{
    CompleteInvitationRequest, CompletedRegistration, CreateInvitationRequest, CreatedInvitation,
    InvitationDetails, InvitationId, InvitationListItem, InvitationListPage, InvitationStatus,
    ResendOutcome, ValidateInvitationResponse, VendorInvitation,
};
use super::repository::InvitationRepository;
use super::token;

const MAX_PAGE_SIZE: usize = 100;

/// Service composing the invitation repository with the best-effort audit and
/// queue channels. Business-rule checks run before the primary write; the
/// secondary writes never fail the request once it has committed.
pub struct InvitationService {
    repository: Arc<dyn InvitationRepository>,
    applications: Arc<dyn ApplicationRepository>,
    artifacts: Arc<dyn ArtifactStore>,
    events: Arc<dyn EventLog>,
    queue: Arc<dyn QueuePublisher>,
    portal: PortalConfig,
}

impl InvitationService {
    pub fn new(
        repository: Arc<dyn InvitationRepository>,
        applications: Arc<dyn ApplicationRepository>,
        artifacts: Arc<dyn ArtifactStore>,
        events: Arc<dyn EventLog>,
        queue: Arc<dyn QueuePublisher>,
        portal: PortalConfig,
    ) -> Self {
        Self {
            repository,
            applications,
            artifacts,
            events,
            queue,
            portal,
        }
    }

    /// Create an invitation. Duplicate checks run before any write so a
    /// rejection leaves no orphan rows.
    pub fn create(
        &self,
        request: CreateInvitationRequest,
        invited_by: Uuid,
        invited_by_name: &str,
    ) -> Result<CreatedInvitation, InvitationServiceError> {
        let email = request.primary_contact_email.trim().to_string();

        if self.repository.active_for_email(&email)?.is_some() {
            return Err(InvitationServiceError::Validation(format!(
                "an active invitation already exists for {email}"
            )));
        }
        if self.applications.find_by_email(&email)?.is_some() {
            return Err(InvitationServiceError::Validation(format!(
                "a vendor application already exists for {email}"
            )));
        }

        let now = Utc::now();
        let expiry_days = request
            .expiration_days
            .filter(|days| *days > 0)
            .unwrap_or(self.portal.invitation_expiry_days);
        // Caller-controlled; an unrepresentable window must reject, not panic.
        let expires_at = Duration::try_days(expiry_days)
            .and_then(|window| now.checked_add_signed(window))
            .ok_or_else(|| {
                InvitationServiceError::Validation(format!(
                    "expiration_days {expiry_days} is out of range"
                ))
            })?;

        let invitation = VendorInvitation {
            id: InvitationId::generate(),
            token: token::generate(),
            vendor_legal_name: request.vendor_legal_name.clone(),
            primary_contact_email: email.clone(),
            invited_by,
            invited_by_name: invited_by_name.to_string(),
            expires_at,
            status: InvitationStatus::Pending,
            notes: request.notes.clone(),
            vendor_application_id: None,
            created_at: now,
            completed_at: None,
        };

        // Primary write; failures here do fail the request.
        self.repository.insert(invitation.clone())?;
        info!(
            invitation_id = %invitation.id,
            email = %email,
            invited_by = invited_by_name,
            "invitation created"
        );

        let mut report = EffectReport::new();
        report.record(
            "invitation_artifact",
            self.artifacts.upsert(Artifact::for_entity(
                invitation.id.to_string(),
                json!({
                    "invitation_id": invitation.id,
                    "vendor_legal_name": invitation.vendor_legal_name,
                    "primary_contact_email": invitation.primary_contact_email,
                    "invited_by": invitation.invited_by,
                    "invited_by_name": invitation.invited_by_name,
                    "token": invitation.token,
                    "expires_at": invitation.expires_at,
                    "expiration_days": expiry_days,
                    "notes": invitation.notes,
                    "status": invitation.status.label(),
                    "created_at": invitation.created_at,
                    "original_request": request,
                }),
            )),
        );
        report.record(
            "domain_event",
            self.events.append(DomainEvent::new(
                "InvitationCreated",
                invitation.id.to_string(),
                json!({
                    "invitation_id": invitation.id,
                    "vendor_name": invitation.vendor_legal_name,
                    "email": invitation.primary_contact_email,
                    "invited_by": invitation.invited_by,
                    "invited_by_name": invitation.invited_by_name,
                    "expires_at": invitation.expires_at,
                }),
            )),
        );
        report.record(
            "queue_publish",
            self.publish_email(&invitation),
        );

        Ok(CreatedInvitation {
            invitation_id: invitation.id,
            invitation_token: invitation.token.clone(),
            invitation_link: format!("/invitation/register/{}", invitation.token),
            expires_at,
            side_effects: report,
        })
    }

    /// Validate a token for the registration front door. An overdue Pending
    /// invitation is lazily flipped to Expired here.
    pub fn validate(
        &self,
        token: &str,
    ) -> Result<ValidateInvitationResponse, InvitationServiceError> {
        let Some(mut invitation) = self.repository.find_by_token(token)? else {
            return Ok(ValidateInvitationResponse::invalid("Invalid invitation link"));
        };

        let now = Utc::now();
        if invitation.status == InvitationStatus::Expired || invitation.is_expired(now) {
            if invitation.status != InvitationStatus::Expired {
                invitation.status = InvitationStatus::Expired;
                self.repository.update(invitation.clone())?;
                info!(invitation_id = %invitation.id, "invitation lazily expired");
            }
            return Ok(ValidateInvitationResponse::invalid(
                "This invitation has expired. Please contact support for a new invitation.",
            ));
        }

        if invitation.status == InvitationStatus::Completed {
            return Ok(ValidateInvitationResponse::invalid(
                "This invitation has already been used.",
            ));
        }
        if invitation.status == InvitationStatus::Cancelled {
            return Ok(ValidateInvitationResponse::invalid(
                "This invitation is no longer active.",
            ));
        }

        Ok(ValidateInvitationResponse::valid(&invitation))
    }

    /// Non-sensitive details for pre-filling the registration form.
    pub fn details(&self, token: &str) -> Result<InvitationDetails, InvitationServiceError> {
        let invitation = self
            .repository
            .find_by_token(token)?
            .ok_or(InvitationServiceError::NotFound)?;
        Ok(InvitationDetails {
            vendor_legal_name: invitation.vendor_legal_name,
            primary_contact_email: invitation.primary_contact_email,
            expires_at: invitation.expires_at,
            status: invitation.status.label(),
        })
    }

    /// Complete registration against a valid token: create the vendor
    /// application, then flip the invitation to Completed (single-use).
    pub fn complete(
        &self,
        token: &str,
        request: CompleteInvitationRequest,
    ) -> Result<CompletedRegistration, InvitationServiceError> {
        let verdict = self.validate(token)?;
        if !verdict.is_valid {
            let message = verdict
                .error_message
                .unwrap_or_else(|| "Invalid invitation link".to_string());
            return Err(InvitationServiceError::Validation(message));
        }

        let mut invitation = self
            .repository
            .find_by_token(token)?
            .ok_or(InvitationServiceError::NotFound)?;

        let application = VendorApplication {
            id: VendorApplicationId::generate(),
            company_name: request.company_name.clone(),
            tax_id: request.tax_id.clone(),
            contact_name: request.contact_name.clone(),
            contact_email: request.email.clone(),
            status: ApplicationStatus::Submitted,
            source: RegistrationSource::Invitation,
            invitation_id: Some(invitation.id),
            created_at: Utc::now(),
        };
        self.applications.insert(application.clone())?;

        invitation.status = InvitationStatus::Completed;
        invitation.completed_at = Some(Utc::now());
        invitation.vendor_application_id = Some(application.id);
        self.repository.update(invitation.clone())?;
        info!(
            invitation_id = %invitation.id,
            application_id = %application.id,
            "invitation completed"
        );

        let mut report = EffectReport::new();
        report.record(
            "completion_artifact",
            self.artifacts.upsert(Artifact::appended(
                invitation.id.to_string(),
                json!({
                    "invitation_id": invitation.id,
                    "vendor_application_id": application.id,
                    "completed_at": invitation.completed_at,
                }),
            )),
        );
        report.record(
            "domain_event",
            self.events.append(DomainEvent::new(
                "InvitationCompleted",
                invitation.id.to_string(),
                json!({
                    "invitation_id": invitation.id,
                    "vendor_application_id": application.id,
                    "completed_at": invitation.completed_at,
                    "vendor_name": invitation.vendor_legal_name,
                    "email": invitation.primary_contact_email,
                }),
            )),
        );

        Ok(CompletedRegistration {
            application_id: application.id,
            status: application.status.label(),
            side_effects: report,
        })
    }

    /// Rotate the token and extend the expiry; rejected once Completed.
    pub fn resend(
        &self,
        id: &InvitationId,
        requested_by: Uuid,
    ) -> Result<ResendOutcome, InvitationServiceError> {
        let mut invitation = self
            .repository
            .fetch(id)?
            .ok_or(InvitationServiceError::NotFound)?;

        if invitation.status == InvitationStatus::Completed {
            return Err(InvitationServiceError::Validation(
                "invitation has already been completed".to_string(),
            ));
        }

        invitation.token = token::generate();
        invitation.expires_at = Utc::now() + Duration::days(self.portal.invitation_expiry_days);
        invitation.status = InvitationStatus::Pending;
        self.repository.update(invitation.clone())?;
        info!(invitation_id = %invitation.id, %requested_by, "invitation resent");

        let mut report = EffectReport::new();
        report.record("queue_publish", self.publish_email(&invitation));

        Ok(ResendOutcome {
            invitation_id: invitation.id,
            expires_at: invitation.expires_at,
            side_effects: report,
        })
    }

    /// Newest-first page of invitations with an optional status filter.
    pub fn list(
        &self,
        page: usize,
        page_size: usize,
        status: Option<&str>,
    ) -> Result<InvitationListPage, InvitationServiceError> {
        let status = match status {
            Some(raw) => Some(InvitationStatus::parse(raw).ok_or_else(|| {
                InvitationServiceError::Validation(format!("unknown status filter '{raw}'"))
            })?),
            None => None,
        };

        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let (invitations, total_count) = self.repository.page(page, page_size, status)?;

        Ok(InvitationListPage {
            invitations: invitations
                .iter()
                .map(InvitationListItem::from_invitation)
                .collect(),
            total_count,
            page,
            page_size,
        })
    }

    /// Eagerly flip every overdue Pending invitation to Expired. Returns the
    /// number of rows changed.
    pub fn expire_overdue(&self) -> Result<usize, InvitationServiceError> {
        let now = Utc::now();
        let overdue = self.repository.pending_expired(now)?;
        let count = overdue.len();

        for mut invitation in overdue {
            invitation.status = InvitationStatus::Expired;
            self.repository.update(invitation)?;
        }

        if count > 0 {
            info!(count, "expired overdue invitations");
        }
        Ok(count)
    }

    fn publish_email(
        &self,
        invitation: &VendorInvitation,
    ) -> Result<(), crate::portal::queue::QueueError> {
        let payload = InvitationEmailPayload {
            invitation_id: invitation.id.to_string(),
            vendor_name: invitation.vendor_legal_name.clone(),
            email: invitation.primary_contact_email.clone(),
            token: invitation.token.clone(),
            expires_at: invitation.expires_at,
            invited_by_name: invitation.invited_by_name.clone(),
            notes: invitation.notes.clone(),
        };
        let data = serde_json::to_value(&payload)
            .map_err(|err| crate::portal::queue::QueueError::Transport(err.to_string()))?;
        self.queue.publish(INVITATION_CREATED_EVENT, data)
    }
}

/// Error raised by the invitation service.
#[derive(Debug, thiserror::Error)]
pub enum InvitationServiceError {
    /// Business-rule rejection detected before any write.
    #[error("{0}")]
    Validation(String),
    #[error("invitation not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
