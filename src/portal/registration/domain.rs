use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::portal::invitations::domain::InvitationId;

/// Identifier wrapper for vendor applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorApplicationId(pub Uuid);

impl VendorApplicationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for VendorApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Workflow position of a vendor application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Submitted,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Submitted => "submitted",
        }
    }
}

/// How the application entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationSource {
    SelfService,
    Invitation,
}

impl RegistrationSource {
    pub const fn label(self) -> &'static str {
        match self {
            RegistrationSource::SelfService => "self_service",
            RegistrationSource::Invitation => "invitation",
        }
    }
}

/// Authoritative vendor application record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorApplication {
    pub id: VendorApplicationId,
    pub company_name: String,
    pub tax_id: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: String,
    pub status: ApplicationStatus,
    pub source: RegistrationSource,
    /// Back-reference to the originating invitation, when any.
    pub invitation_id: Option<InvitationId>,
    pub created_at: DateTime<Utc>,
}

/// Self-service registration submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVendorRequest {
    pub company_name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    pub contact_email: String,
    /// Arbitrary-shape onboarding detail, archived to the document store.
    #[serde(default)]
    pub details: Value,
}

/// Mocked upstream master-data snapshot for a vendor id. There is no live
/// integration; reads echo static data the way the source system did.
#[derive(Debug, Clone, Serialize)]
pub struct VendorMasterData {
    pub vendor_id: String,
    pub name: String,
    pub address: String,
    pub source: String,
}

impl VendorMasterData {
    pub fn mocked(vendor_id: &str) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            name: "Acme Corp".to_string(),
            address: "123 Supplier Street".to_string(),
            source: "ERP D01".to_string(),
        }
    }
}
