use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::portal::effects::EffectReport;
use crate::portal::registration::domain::VendorApplicationId;

/// Identifier wrapper for vendor invitations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvitationId(pub Uuid);

impl InvitationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Invitation lifecycle. `Completed` is terminal; `Expired` re-enters
/// `Pending` only through a resend, which rotates the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
    Completed,
    Cancelled,
}

impl InvitationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
            InvitationStatus::Completed => "completed",
            InvitationStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "expired" => Some(Self::Expired),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Active invitations block a second invite to the same address.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }
}

/// Authoritative invitation record. The token is unique and single-use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorInvitation {
    pub id: InvitationId,
    pub token: String,
    pub vendor_legal_name: String,
    pub primary_contact_email: String,
    pub invited_by: Uuid,
    pub invited_by_name: String,
    pub expires_at: DateTime<Utc>,
    pub status: InvitationStatus,
    pub notes: Option<String>,
    pub vendor_application_id: Option<VendorApplicationId>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl VendorInvitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Approver-submitted invitation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvitationRequest {
    pub vendor_legal_name: String,
    pub primary_contact_email: String,
    /// Days until the link expires; the configured default applies when
    /// omitted.
    #[serde(default)]
    pub expiration_days: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Response for a created invitation, including the secondary-write report.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedInvitation {
    pub invitation_id: InvitationId,
    pub invitation_token: String,
    pub invitation_link: String,
    pub expires_at: DateTime<Utc>,
    pub side_effects: EffectReport,
}

/// Token validation verdict surfaced to the registration front door.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateInvitationResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ValidateInvitationResponse {
    pub fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            error_message: Some(message.to_string()),
            vendor_legal_name: None,
            primary_contact_email: None,
            expires_at: None,
        }
    }

    pub fn valid(invitation: &VendorInvitation) -> Self {
        Self {
            is_valid: true,
            error_message: None,
            vendor_legal_name: Some(invitation.vendor_legal_name.clone()),
            primary_contact_email: Some(invitation.primary_contact_email.clone()),
            expires_at: Some(invitation.expires_at),
        }
    }
}

/// Non-sensitive details used to pre-fill the registration form.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationDetails {
    pub vendor_legal_name: String,
    pub primary_contact_email: String,
    pub expires_at: DateTime<Utc>,
    pub status: &'static str,
}

/// Registration form submitted against a valid invitation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteInvitationRequest {
    pub company_name: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    pub email: String,
}

/// Outcome of completing an invitation: the created application plus the
/// secondary-write report.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedRegistration {
    pub application_id: VendorApplicationId,
    pub status: &'static str,
    pub side_effects: EffectReport,
}

/// Outcome of a resend: rotated token, extended expiry.
#[derive(Debug, Clone, Serialize)]
pub struct ResendOutcome {
    pub invitation_id: InvitationId,
    pub expires_at: DateTime<Utc>,
    pub side_effects: EffectReport,
}

/// Paged listing entry for approver dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationListItem {
    pub id: InvitationId,
    pub vendor_legal_name: String,
    pub primary_contact_email: String,
    pub status: &'static str,
    pub invited_by_name: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_application_id: Option<VendorApplicationId>,
}

impl InvitationListItem {
    pub fn from_invitation(invitation: &VendorInvitation) -> Self {
        Self {
            id: invitation.id,
            vendor_legal_name: invitation.vendor_legal_name.clone(),
            primary_contact_email: invitation.primary_contact_email.clone(),
            status: invitation.status.label(),
            invited_by_name: invitation.invited_by_name.clone(),
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
            vendor_application_id: invitation.vendor_application_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvitationListPage {
    pub invitations: Vec<InvitationListItem>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}
