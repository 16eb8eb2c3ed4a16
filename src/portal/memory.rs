//! In-memory implementations of every storage and queue seam.
//!
//! These back local deployments and tests. They are injected like any other
//! implementation — state lives in the instances, never in module-level
//! singletons.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;
use uuid::Uuid;

use super::attachments::{Attachment, AttachmentRepository};
use super::audit::{Artifact, ArtifactStore, AuditError, DomainEvent, EventLog};
use super::change_requests::domain::{ChangeRequest, ChangeRequestId};
use super::change_requests::repository::ChangeRequestRepository;
use super::invitations::domain::{InvitationId, InvitationStatus, VendorInvitation};
use super::invitations::repository::InvitationRepository;
use super::metadata::domain::{ReferenceDataItem, ValidationRule};
use super::metadata::store::{MetadataStore, MetadataStoreError};
use super::queue::{queue_for_event, QueueEnvelope, QueueError, QueuePublisher};
use super::registration::domain::{VendorApplication, VendorApplicationId};
use super::registration::repository::ApplicationRepository;
use super::RepositoryError;

#[derive(Default)]
pub struct MemoryInvitations {
    records: Mutex<HashMap<InvitationId, VendorInvitation>>,
}

impl InvitationRepository for MemoryInvitations {
    fn insert(&self, invitation: VendorInvitation) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("invitation mutex poisoned");
        if guard.contains_key(&invitation.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(invitation.id, invitation);
        Ok(())
    }

    fn update(&self, invitation: VendorInvitation) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("invitation mutex poisoned");
        if !guard.contains_key(&invitation.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(invitation.id, invitation);
        Ok(())
    }

    fn fetch(&self, id: &InvitationId) -> Result<Option<VendorInvitation>, RepositoryError> {
        let guard = self.records.lock().expect("invitation mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_token(&self, token: &str) -> Result<Option<VendorInvitation>, RepositoryError> {
        let guard = self.records.lock().expect("invitation mutex poisoned");
        Ok(guard.values().find(|inv| inv.token == token).cloned())
    }

    fn active_for_email(&self, email: &str) -> Result<Option<VendorInvitation>, RepositoryError> {
        let guard = self.records.lock().expect("invitation mutex poisoned");
        Ok(guard
            .values()
            .find(|inv| {
                inv.status.is_active() && inv.primary_contact_email.eq_ignore_ascii_case(email)
            })
            .cloned())
    }

    fn page(
        &self,
        page: usize,
        page_size: usize,
        status: Option<InvitationStatus>,
    ) -> Result<(Vec<VendorInvitation>, usize), RepositoryError> {
        let guard = self.records.lock().expect("invitation mutex poisoned");
        let mut matching: Vec<VendorInvitation> = guard
            .values()
            .filter(|inv| status.map_or(true, |wanted| inv.status == wanted))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len();
        let start = (page.max(1) - 1).saturating_mul(page_size);
        let slice = matching.into_iter().skip(start).take(page_size).collect();
        Ok((slice, total))
    }

    fn pending_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<VendorInvitation>, RepositoryError> {
        let guard = self.records.lock().expect("invitation mutex poisoned");
        Ok(guard
            .values()
            .filter(|inv| inv.status == InvitationStatus::Pending && inv.expires_at < now)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryChangeRequests {
    records: Mutex<HashMap<ChangeRequestId, ChangeRequest>>,
}

impl ChangeRequestRepository for MemoryChangeRequests {
    fn insert(&self, request: ChangeRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("change request mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(request.id, request);
        Ok(())
    }

    fn update(&self, request: ChangeRequest) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("change request mutex poisoned");
        if !guard.contains_key(&request.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(request.id, request);
        Ok(())
    }

    fn fetch(&self, id: &ChangeRequestId) -> Result<Option<ChangeRequest>, RepositoryError> {
        let guard = self.records.lock().expect("change request mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryApplications {
    records: Mutex<HashMap<VendorApplicationId, VendorApplication>>,
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: VendorApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id, application);
        Ok(())
    }

    fn fetch(
        &self,
        id: &VendorApplicationId,
    ) -> Result<Option<VendorApplication>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<VendorApplication>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .values()
            .find(|app| app.contact_email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryAttachments {
    records: Mutex<Vec<Attachment>>,
}

impl AttachmentRepository for MemoryAttachments {
    fn insert(&self, attachment: Attachment) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("attachment mutex poisoned")
            .push(attachment);
        Ok(())
    }

    fn for_entity(&self, entity_id: &Uuid) -> Result<Vec<Attachment>, RepositoryError> {
        let guard = self.records.lock().expect("attachment mutex poisoned");
        Ok(guard
            .iter()
            .filter(|attachment| attachment.linked_entity_id == *entity_id)
            .cloned()
            .collect())
    }
}

/// Artifact container keyed by document id; `fetch` resolves the primary
/// document whose id equals the entity id.
#[derive(Default)]
pub struct MemoryArtifacts {
    documents: Mutex<HashMap<String, Artifact>>,
}

impl MemoryArtifacts {
    pub fn len(&self) -> usize {
        self.documents.lock().expect("artifact mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All documents partitioned under the entity, newest last. Test helper.
    pub fn for_entity(&self, entity_id: &str) -> Vec<Artifact> {
        let guard = self.documents.lock().expect("artifact mutex poisoned");
        let mut docs: Vec<Artifact> = guard
            .values()
            .filter(|artifact| artifact.entity_id == entity_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        docs
    }
}

impl ArtifactStore for MemoryArtifacts {
    fn upsert(&self, artifact: Artifact) -> Result<(), AuditError> {
        self.documents
            .lock()
            .expect("artifact mutex poisoned")
            .insert(artifact.id.clone(), artifact);
        Ok(())
    }

    fn fetch(&self, entity_id: &str) -> Result<Option<Artifact>, AuditError> {
        let guard = self.documents.lock().expect("artifact mutex poisoned");
        Ok(guard.get(entity_id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryEventLog {
    events: Mutex<Vec<DomainEvent>>,
}

impl MemoryEventLog {
    /// Events of one type, append order preserved. Test helper.
    pub fn of_type(&self, event_type: &str) -> Vec<DomainEvent> {
        let guard = self.events.lock().expect("event mutex poisoned");
        guard
            .iter()
            .filter(|event| event.event_type == event_type)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().expect("event mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventLog for MemoryEventLog {
    fn append(&self, event: DomainEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryMetadata {
    reference: Mutex<Vec<ReferenceDataItem>>,
    rules: Mutex<Vec<ValidationRule>>,
}

impl MetadataStore for MemoryMetadata {
    fn reference_data(
        &self,
        category: &str,
    ) -> Result<Vec<ReferenceDataItem>, MetadataStoreError> {
        let guard = self.reference.lock().expect("reference mutex poisoned");
        Ok(guard
            .iter()
            .filter(|item| item.is_active && item.category == category)
            .cloned()
            .collect())
    }

    fn upsert_reference(&self, item: ReferenceDataItem) -> Result<(), MetadataStoreError> {
        let mut guard = self.reference.lock().expect("reference mutex poisoned");
        guard.retain(|existing| !(existing.id == item.id && existing.category == item.category));
        guard.push(item);
        Ok(())
    }

    fn delete_reference(&self, id: &str, category: &str) -> Result<(), MetadataStoreError> {
        let mut guard = self.reference.lock().expect("reference mutex poisoned");
        let before = guard.len();
        guard.retain(|existing| !(existing.id == id && existing.category == category));
        if guard.len() == before {
            return Err(MetadataStoreError::NotFound);
        }
        Ok(())
    }

    fn validation_rules(
        &self,
        entity_type: &str,
    ) -> Result<Vec<ValidationRule>, MetadataStoreError> {
        let guard = self.rules.lock().expect("rule mutex poisoned");
        Ok(guard
            .iter()
            .filter(|rule| rule.entity_type == entity_type)
            .cloned()
            .collect())
    }

    fn upsert_rule(&self, rule: ValidationRule) -> Result<(), MetadataStoreError> {
        let mut guard = self.rules.lock().expect("rule mutex poisoned");
        guard
            .retain(|existing| !(existing.id == rule.id && existing.entity_type == rule.entity_type));
        guard.push(rule);
        Ok(())
    }

    fn delete_rule(&self, id: &str, entity_type: &str) -> Result<(), MetadataStoreError> {
        let mut guard = self.rules.lock().expect("rule mutex poisoned");
        let before = guard.len();
        guard.retain(|existing| !(existing.id == id && existing.entity_type == entity_type));
        if guard.len() == before {
            return Err(MetadataStoreError::NotFound);
        }
        Ok(())
    }
}

/// In-process broker with named queues. Publish is hand-off only: messages
/// for queues with no subscriber are dropped, mirroring fire-and-forget
/// semantics.
#[derive(Default)]
pub struct MemoryBroker {
    senders: Mutex<HashMap<&'static str, UnboundedSender<QueueEnvelope>>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a consumer to a named queue, replacing any previous one.
    pub fn subscribe(&self, queue: &'static str) -> UnboundedReceiver<QueueEnvelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders
            .lock()
            .expect("broker mutex poisoned")
            .insert(queue, tx);
        rx
    }
}

impl QueuePublisher for MemoryBroker {
    fn publish(&self, event_type: &str, data: Value) -> Result<(), QueueError> {
        let queue = queue_for_event(event_type);
        let envelope = QueueEnvelope {
            event_type: event_type.to_string(),
            data,
        };

        let guard = self.senders.lock().expect("broker mutex poisoned");
        match guard.get(queue) {
            Some(sender) => sender
                .send(envelope)
                .map_err(|_| QueueError::Transport(format!("queue '{queue}' consumer gone"))),
            None => {
                debug!(queue, event_type, "no consumer attached; message dropped");
                Ok(())
            }
        }
    }
}
