use std::sync::Arc;

use axum::body::to_bytes;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::config::PortalConfig;
use crate::portal::audit::{Artifact, ArtifactStore, AuditError};
use crate::portal::effects::EffectStatus;
use crate::portal::memory::{
    MemoryApplications, MemoryArtifacts, MemoryBroker, MemoryEventLog, MemoryInvitations,
};
use crate::portal::queue::INVITATION_EMAILS_QUEUE;
use crate::portal::registration::repository::ApplicationRepository;

use super::domain::{CompleteInvitationRequest, CreateInvitationRequest, InvitationStatus};
use super::repository::InvitationRepository;
use super::router::invitation_router;
use super::service::{InvitationService, InvitationServiceError};
use super::token;

struct Fixture {
    service: Arc<InvitationService>,
    invitations: Arc<MemoryInvitations>,
    applications: Arc<MemoryApplications>,
    artifacts: Arc<MemoryArtifacts>,
    events: Arc<MemoryEventLog>,
    broker: Arc<MemoryBroker>,
}

fn fixture() -> Fixture {
    let invitations = Arc::new(MemoryInvitations::default());
    let applications = Arc::new(MemoryApplications::default());
    let artifacts = Arc::new(MemoryArtifacts::default());
    let events = Arc::new(MemoryEventLog::default());
    let broker = Arc::new(MemoryBroker::new());

    let service = Arc::new(InvitationService::new(
        invitations.clone(),
        applications.clone(),
        artifacts.clone(),
        events.clone(),
        broker.clone(),
        portal_config(),
    ));

    Fixture {
        service,
        invitations,
        applications,
        artifacts,
        events,
        broker,
    }
}

fn portal_config() -> PortalConfig {
    PortalConfig {
        base_url: "https://portal.example.com".to_string(),
        company_name: "Example Co".to_string(),
        invitation_expiry_days: 14,
        sweep_interval_secs: 3600,
    }
}

fn create_request(email: &str) -> CreateInvitationRequest {
    CreateInvitationRequest {
        vendor_legal_name: "Acme Supplies Ltd".to_string(),
        primary_contact_email: email.to_string(),
        expiration_days: None,
        notes: Some("preferred packaging vendor".to_string()),
    }
}

fn complete_request(email: &str) -> CompleteInvitationRequest {
    CompleteInvitationRequest {
        company_name: "Acme Supplies Ltd".to_string(),
        tax_id: Some("TAX-123".to_string()),
        contact_name: Some("Jo Vendor".to_string()),
        email: email.to_string(),
    }
}

#[test]
fn create_issues_url_safe_token_and_link() {
    let fx = fixture();

    let created = fx
        .service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();

    assert_eq!(created.invitation_token.len(), token::TOKEN_CHARS);
    assert_eq!(
        created.invitation_link,
        format!("/invitation/register/{}", created.invitation_token)
    );
    assert!(created.side_effects.is_clean());
    assert_eq!(fx.events.of_type("InvitationCreated").len(), 1);
    assert!(fx
        .artifacts
        .fetch(&created.invitation_id.to_string())
        .unwrap()
        .is_some());
}

#[test]
fn create_rejects_duplicate_active_invitation() {
    let fx = fixture();
    fx.service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();

    let error = fx
        .service
        .create(create_request("JO@ACME.TEST"), Uuid::new_v4(), "Pat Admin")
        .unwrap_err();

    assert!(matches!(error, InvitationServiceError::Validation(_)));

    // The rejection left no orphan writes; only the first create persisted.
    let (_, total) = fx.invitations.page(1, 10, None).unwrap();
    assert_eq!(total, 1);
    assert_eq!(fx.artifacts.len(), 1);
    assert_eq!(fx.events.len(), 1);
}

#[test]
fn create_rejects_out_of_range_expiration_days() {
    let fx = fixture();
    let mut request = create_request("jo@acme.test");
    request.expiration_days = Some(i64::MAX);

    let error = fx
        .service
        .create(request, Uuid::new_v4(), "Pat Admin")
        .unwrap_err();

    assert!(matches!(error, InvitationServiceError::Validation(_)));
    let (_, total) = fx.invitations.page(1, 10, None).unwrap();
    assert_eq!(total, 0);
}

#[test]
fn create_rejects_email_with_existing_application() {
    let fx = fixture();
    let created = fx
        .service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();
    fx.service
        .complete(&created.invitation_token, complete_request("jo@acme.test"))
        .unwrap();

    // The completed invitation no longer blocks, but the application does.
    let error = fx
        .service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap_err();

    assert!(matches!(error, InvitationServiceError::Validation(_)));
}

#[test]
fn validate_unknown_token_is_invalid_not_error() {
    let fx = fixture();

    let verdict = fx.service.validate("no-such-token").unwrap();

    assert!(!verdict.is_valid);
    assert_eq!(
        verdict.error_message.as_deref(),
        Some("Invalid invitation link")
    );
}

#[test]
fn validate_lazily_expires_overdue_invitation() {
    let fx = fixture();
    let created = fx
        .service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();

    let mut stored = fx.invitations.fetch(&created.invitation_id).unwrap().unwrap();
    stored.expires_at = Utc::now() - Duration::days(1);
    fx.invitations.update(stored).unwrap();

    let verdict = fx.service.validate(&created.invitation_token).unwrap();
    assert!(!verdict.is_valid);

    let after = fx.invitations.fetch(&created.invitation_id).unwrap().unwrap();
    assert_eq!(after.status, InvitationStatus::Expired);
}

#[test]
fn complete_is_single_use() {
    let fx = fixture();
    let created = fx
        .service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();

    let completed = fx
        .service
        .complete(&created.invitation_token, complete_request("jo@acme.test"))
        .unwrap();

    let application = fx.applications.fetch(&completed.application_id).unwrap();
    assert!(application.is_some());

    let invitation = fx.invitations.fetch(&created.invitation_id).unwrap().unwrap();
    assert_eq!(invitation.status, InvitationStatus::Completed);
    assert_eq!(invitation.vendor_application_id, Some(completed.application_id));
    assert!(invitation.completed_at.is_some());
    assert_eq!(fx.events.of_type("InvitationCompleted").len(), 1);

    let error = fx
        .service
        .complete(&created.invitation_token, complete_request("jo@acme.test"))
        .unwrap_err();
    assert!(matches!(error, InvitationServiceError::Validation(_)));
}

#[test]
fn resend_rotates_token_and_revives_expired_invitation() {
    let fx = fixture();
    let created = fx
        .service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();

    let mut stored = fx.invitations.fetch(&created.invitation_id).unwrap().unwrap();
    stored.status = InvitationStatus::Expired;
    stored.expires_at = Utc::now() - Duration::days(1);
    fx.invitations.update(stored).unwrap();

    let outcome = fx
        .service
        .resend(&created.invitation_id, Uuid::new_v4())
        .unwrap();

    let after = fx.invitations.fetch(&created.invitation_id).unwrap().unwrap();
    assert_eq!(after.status, InvitationStatus::Pending);
    assert_ne!(after.token, created.invitation_token);
    assert!(after.expires_at > Utc::now());
    assert_eq!(outcome.invitation_id, created.invitation_id);
}

#[test]
fn resend_rejects_completed_invitation() {
    let fx = fixture();
    let created = fx
        .service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();
    fx.service
        .complete(&created.invitation_token, complete_request("jo@acme.test"))
        .unwrap();

    let error = fx
        .service
        .resend(&created.invitation_id, Uuid::new_v4())
        .unwrap_err();

    assert!(matches!(error, InvitationServiceError::Validation(_)));
}

#[test]
fn list_filters_by_status_and_rejects_unknown_filter() {
    let fx = fixture();
    for i in 0..3 {
        fx.service
            .create(
                create_request(&format!("vendor{i}@acme.test")),
                Uuid::new_v4(),
                "Pat Admin",
            )
            .unwrap();
    }

    let page = fx.service.list(1, 2, Some("pending")).unwrap();
    assert_eq!(page.total_count, 3);
    assert_eq!(page.invitations.len(), 2);
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, 2);

    let empty = fx.service.list(1, 20, Some("completed")).unwrap();
    assert_eq!(empty.total_count, 0);

    let error = fx.service.list(1, 20, Some("bogus")).unwrap_err();
    assert!(matches!(error, InvitationServiceError::Validation(_)));
}

#[test]
fn expire_overdue_flips_only_pending_rows() {
    let fx = fixture();
    let overdue = fx
        .service
        .create(create_request("old@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();
    fx.service
        .create(create_request("fresh@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();

    let mut stored = fx.invitations.fetch(&overdue.invitation_id).unwrap().unwrap();
    stored.expires_at = Utc::now() - Duration::hours(1);
    fx.invitations.update(stored).unwrap();

    let count = fx.service.expire_overdue().unwrap();
    assert_eq!(count, 1);

    let flipped = fx.invitations.fetch(&overdue.invitation_id).unwrap().unwrap();
    assert_eq!(flipped.status, InvitationStatus::Expired);

    // Second sweep finds nothing.
    assert_eq!(fx.service.expire_overdue().unwrap(), 0);
}

#[test]
fn create_publishes_email_payload_to_invitation_queue() {
    let fx = fixture();
    let mut rx = fx.broker.subscribe(INVITATION_EMAILS_QUEUE);

    let created = fx
        .service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();

    let envelope = rx.try_recv().unwrap();
    assert_eq!(envelope.event_type, "invitation-created");
    assert_eq!(
        envelope.data["token"].as_str(),
        Some(created.invitation_token.as_str())
    );
    assert_eq!(envelope.data["email"].as_str(), Some("jo@acme.test"));
}

struct FailingArtifacts;

impl ArtifactStore for FailingArtifacts {
    fn upsert(&self, _artifact: Artifact) -> Result<(), AuditError> {
        Err(AuditError::Unavailable("document store offline".to_string()))
    }

    fn fetch(&self, _entity_id: &str) -> Result<Option<Artifact>, AuditError> {
        Err(AuditError::Unavailable("document store offline".to_string()))
    }
}

#[test]
fn create_succeeds_when_artifact_store_is_down() {
    let invitations = Arc::new(MemoryInvitations::default());
    let service = InvitationService::new(
        invitations.clone(),
        Arc::new(MemoryApplications::default()),
        Arc::new(FailingArtifacts),
        Arc::new(MemoryEventLog::default()),
        Arc::new(MemoryBroker::new()),
        portal_config(),
    );

    let created = service
        .create(create_request("jo@acme.test"), Uuid::new_v4(), "Pat Admin")
        .unwrap();

    // Primary write landed even though the artifact write failed.
    assert!(invitations.fetch(&created.invitation_id).unwrap().is_some());
    assert!(!created.side_effects.is_clean());
    let failures: Vec<_> = created.side_effects.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].effect, "invitation_artifact");
    assert!(matches!(failures[0].status, EffectStatus::Failed { .. }));
}

mod routing {
    use super::*;

    fn router() -> axum::Router {
        invitation_router(fixture().service)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_endpoint_returns_created_invitation() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/invitations")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(
                json!({
                    "vendor_legal_name": "Acme Supplies Ltd",
                    "primary_contact_email": "jo@acme.test"
                })
                .to_string(),
            ))
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(
            body["invitation_token"].as_str().map(str::len),
            Some(token::TOKEN_CHARS)
        );
        assert!(body["invitation_link"]
            .as_str()
            .unwrap()
            .starts_with("/invitation/register/"));
    }

    #[tokio::test]
    async fn validate_endpoint_reports_invalid_token_with_ok_status() {
        let request = Request::builder()
            .uri("/api/v1/invitations/validate/not-a-token")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["is_valid"], json!(false));
        assert_eq!(body["error_message"], json!("Invalid invitation link"));
    }

    #[tokio::test]
    async fn resend_endpoint_returns_not_found_for_unknown_id() {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/invitations/{}/resend", Uuid::new_v4()))
            .body(axum::body::Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_endpoint_rejects_unknown_status_filter() {
        let request = Request::builder()
            .uri("/api/v1/invitations?status=bogus")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
