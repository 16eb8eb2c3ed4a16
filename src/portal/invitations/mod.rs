//! Time-boxed, single-use invitations letting prospective vendors
//! self-register. Every mutating path follows the hybrid write sequence:
//! authoritative insert/update first, then best-effort artifact, domain
//! event, and queue publishes recorded in an [`crate::portal::effects::EffectReport`].

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod token;

#[cfg(test)]
mod tests;

pub use domain::{
    CompleteInvitationRequest, CompletedRegistration, CreateInvitationRequest, CreatedInvitation,
    InvitationDetails, InvitationId, InvitationListItem, InvitationListPage, InvitationStatus,
    ResendOutcome, ValidateInvitationResponse, VendorInvitation,
};
pub use repository::InvitationRepository;
pub use router::invitation_router;
pub use service::{InvitationService, InvitationServiceError};
