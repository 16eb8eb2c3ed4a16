//! Document-store seams for the audit trail: flexible payload artifacts keyed
//! by the owning entity, and an append-only domain event log partitioned by
//! event type. These copies are secondary to the relational record; nothing
//! reconciles them after a write failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Audit copy of a request's full payload, independent of the system of
/// record. Partition key is the owning entity id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub entity_id: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    /// Artifact whose document id matches the owning entity, so repeated
    /// writes for the same entity upsert rather than accumulate.
    pub fn for_entity(entity_id: impl Into<String>, payload: Value) -> Self {
        let entity_id = entity_id.into();
        Self {
            id: entity_id.clone(),
            entity_id,
            payload,
            created_at: Utc::now(),
        }
    }

    /// Artifact with its own document id, for append-style records such as
    /// completion receipts that must not overwrite the original payload.
    pub fn appended(entity_id: impl Into<String>, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            entity_id: entity_id.into(),
            payload,
            created_at: Utc::now(),
        }
    }
}

/// Append-only record of a state transition. Partition key is the event type;
/// nothing currently replays or consumes the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: String,
    pub event_type: String,
    pub entity_id: String,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
}

impl DomainEvent {
    pub fn new(event_type: &str, entity_id: impl Into<String>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.to_string(),
            entity_id: entity_id.into(),
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Document-store failure. Callers treat these as best-effort and record them
/// in the request's [`super::effects::EffectReport`].
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction over the artifact container.
pub trait ArtifactStore: Send + Sync {
    fn upsert(&self, artifact: Artifact) -> Result<(), AuditError>;
    fn fetch(&self, entity_id: &str) -> Result<Option<Artifact>, AuditError>;
}

/// Storage abstraction over the domain event container.
pub trait EventLog: Send + Sync {
    fn append(&self, event: DomainEvent) -> Result<(), AuditError>;
}
