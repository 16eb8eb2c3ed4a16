#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use vendor_mdm::config::PortalConfig;
use vendor_mdm::portal::attachments::{attachment_router, AttachmentService};
use vendor_mdm::portal::change_requests::{change_request_router, ChangeRequestService};
use vendor_mdm::portal::invitations::{invitation_router, InvitationService};
use vendor_mdm::portal::memory::{
    MemoryApplications, MemoryArtifacts, MemoryAttachments, MemoryBroker, MemoryChangeRequests,
    MemoryEventLog, MemoryInvitations, MemoryMetadata,
};
use vendor_mdm::portal::metadata::{metadata_router, MetadataService};
use vendor_mdm::portal::registration::{registration_router, RegistrationService};

/// Fully wired portal over in-memory stores, with handles kept open so tests
/// can inspect state behind the HTTP surface.
pub struct Portal {
    pub router: Router,
    pub invitations: Arc<MemoryInvitations>,
    pub applications: Arc<MemoryApplications>,
    pub change_requests: Arc<MemoryChangeRequests>,
    pub artifacts: Arc<MemoryArtifacts>,
    pub events: Arc<MemoryEventLog>,
    pub broker: Arc<MemoryBroker>,
    pub metadata: Arc<MetadataService>,
}

pub fn portal() -> Portal {
    let invitations = Arc::new(MemoryInvitations::default());
    let applications = Arc::new(MemoryApplications::default());
    let change_requests = Arc::new(MemoryChangeRequests::default());
    let attachments = Arc::new(MemoryAttachments::default());
    let artifacts = Arc::new(MemoryArtifacts::default());
    let events = Arc::new(MemoryEventLog::default());
    let broker = Arc::new(MemoryBroker::new());

    let metadata = Arc::new(MetadataService::new(Arc::new(MemoryMetadata::default())));
    let invitation_service = Arc::new(InvitationService::new(
        invitations.clone(),
        applications.clone(),
        artifacts.clone(),
        events.clone(),
        broker.clone(),
        portal_config(),
    ));
    let change_request_service = Arc::new(ChangeRequestService::new(
        change_requests.clone(),
        artifacts.clone(),
        events.clone(),
        broker.clone(),
        metadata.clone(),
    ));
    let registration_service = Arc::new(RegistrationService::new(
        applications.clone(),
        change_requests.clone(),
        artifacts.clone(),
        events.clone(),
        broker.clone(),
        metadata.clone(),
    ));
    let attachment_service = Arc::new(AttachmentService::new(attachments));

    let router = Router::new()
        .merge(invitation_router(invitation_service))
        .merge(change_request_router(change_request_service))
        .merge(registration_router(registration_service))
        .merge(attachment_router(attachment_service))
        .merge(metadata_router(metadata.clone()));

    Portal {
        router,
        invitations,
        applications,
        change_requests,
        artifacts,
        events,
        broker,
        metadata,
    }
}

pub fn portal_config() -> PortalConfig {
    PortalConfig {
        base_url: "https://portal.example.com".to_string(),
        company_name: "Example Co".to_string(),
        invitation_expiry_days: 14,
        sweep_interval_secs: 3600,
    }
}

/// Send a JSON request through the router and decode the JSON response.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request builds"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request builds"),
    };

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };
    (status, value)
}
