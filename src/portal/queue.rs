//! Message-queue seam for async fan-out. Publishing is fire-and-forget from
//! the request's perspective: the caller only waits for hand-off to the
//! broker client, never for downstream consumption.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INVITATION_EMAILS_QUEUE: &str = "invitation-emails";
pub const VENDOR_CHANGES_QUEUE: &str = "vendor-changes";

pub const INVITATION_CREATED_EVENT: &str = "invitation-created";
pub const VENDOR_APPLICATION_SUBMITTED_EVENT: &str = "vendor-application-submitted";

/// Envelope placed on a named queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEnvelope {
    pub event_type: String,
    pub data: Value,
}

/// Route an event type to its destination queue.
pub fn queue_for_event(event_type: &str) -> &'static str {
    match event_type {
        INVITATION_CREATED_EVENT => INVITATION_EMAILS_QUEUE,
        _ => VENDOR_CHANGES_QUEUE,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue transport unavailable: {0}")]
    Transport(String),
}

/// Trait describing the outbound queue hook.
pub trait QueuePublisher: Send + Sync {
    fn publish(&self, event_type: &str, data: Value) -> Result<(), QueueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invitation_created_routes_to_email_queue() {
        assert_eq!(
            queue_for_event(INVITATION_CREATED_EVENT),
            INVITATION_EMAILS_QUEUE
        );
    }

    #[test]
    fn other_events_route_to_vendor_changes() {
        assert_eq!(
            queue_for_event(VENDOR_APPLICATION_SUBMITTED_EVENT),
            VENDOR_CHANGES_QUEUE
        );
        assert_eq!(queue_for_event("RequestApproved"), VENDOR_CHANGES_QUEUE);
        assert_eq!(queue_for_event("anything-else"), VENDOR_CHANGES_QUEUE);
    }
}
