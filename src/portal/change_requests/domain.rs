use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::portal::effects::EffectReport;

/// Identifier wrapper for change requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeRequestId(pub Uuid);

impl ChangeRequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ChangeRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Workflow position; the single source of truth for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeRequestStatus {
    Draft,
    Submitted,
    Approved,
    Integrated,
}

impl ChangeRequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ChangeRequestStatus::Draft => "draft",
            ChangeRequestStatus::Submitted => "submitted",
            ChangeRequestStatus::Approved => "approved",
            ChangeRequestStatus::Integrated => "integrated",
        }
    }
}

/// Authoritative change request record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: ChangeRequestId,
    pub status: ChangeRequestStatus,
    /// Upstream master-data vendor id; None for new-vendor requests.
    pub vendor_id: Option<String>,
    pub requester_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Requester-submitted creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChangeRequest {
    pub requester_id: Uuid,
    #[serde(default)]
    pub vendor_id: Option<String>,
    /// Arbitrary-shape proposed change, archived to the document store.
    pub payload: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedChangeRequest {
    pub request_id: ChangeRequestId,
    pub status: &'static str,
    pub side_effects: EffectReport,
}

/// Hybrid read view: relational metadata plus the archived payload when the
/// document store has it.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRequestView {
    pub request_id: ChangeRequestId,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    pub requester_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalOutcome {
    pub request_id: ChangeRequestId,
    pub status: &'static str,
    pub side_effects: EffectReport,
}
