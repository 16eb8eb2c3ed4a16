//! Invitation email rendering and the queue-driven worker. Delivery is
//! mocked: the worker renders the message and logs it, matching the source
//! system before a real provider was wired in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info};

use crate::config::PortalConfig;

use super::queue::{QueueEnvelope, INVITATION_CREATED_EVENT};

/// Message consumed from the `invitation-emails` queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationEmailPayload {
    pub invitation_id: String,
    pub vendor_name: String,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub invited_by_name: String,
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn registration_link(base_url: &str, token: &str) -> String {
    format!("{}/invitation/register/{}", base_url.trim_end_matches('/'), token)
}

pub fn subject(company_name: &str) -> String {
    format!("Action Required: Invitation to Register as Vendor with {company_name}")
}

pub fn render_body(payload: &InvitationEmailPayload, link: &str, company_name: &str) -> String {
    let mut body = format!(
        "Dear {vendor} Team,\n\n\
         You have been invited by {inviter} to register as an approved vendor \
         with {company}.\n\n\
         Start your registration here: {link}\n\n\
         This invitation link expires on {expires}.\n",
        vendor = payload.vendor_name,
        inviter = payload.invited_by_name,
        company = company_name,
        link = link,
        expires = payload.expires_at.to_rfc3339(),
    );
    if let Some(notes) = &payload.notes {
        body.push_str(&format!("\nNotes from your contact: {notes}\n"));
    }
    body
}

/// Consume the `invitation-emails` queue until the channel closes. Rendered
/// messages are logged instead of delivered.
pub async fn run_email_worker(mut receiver: UnboundedReceiver<QueueEnvelope>, portal: PortalConfig) {
    info!("invitation email worker started");
    while let Some(envelope) = receiver.recv().await {
        if envelope.event_type != INVITATION_CREATED_EVENT {
            continue;
        }
        let payload: InvitationEmailPayload = match serde_json::from_value(envelope.data) {
            Ok(payload) => payload,
            Err(err) => {
                error!(%err, "invalid invitation email message format");
                continue;
            }
        };

        let link = registration_link(&portal.base_url, &payload.token);
        let subject = subject(&portal.company_name);
        let body = render_body(&payload, &link, &portal.company_name);

        info!("===== INVITATION EMAIL =====");
        info!(to = %payload.email, %subject, "rendered invitation email");
        info!(invitation_id = %payload.invitation_id, %link, expires_at = %payload.expires_at);
        info!(%body);
        info!("============================");
    }
    info!("invitation email worker stopped");
}
