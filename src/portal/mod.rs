//! Vendor master-data portal workflows.
//!
//! Each submodule follows the same layering: a `domain` module with the
//! entities and wire types, a `repository` trait for the authoritative
//! relational-style store, a `service` composing the primary write with the
//! best-effort secondary channels, and a `router` exposing the HTTP surface.

pub mod attachments;
pub mod audit;
pub mod change_requests;
pub mod effects;
pub mod invitations;
pub mod memory;
pub mod metadata;
pub mod notifications;
pub mod queue;
pub mod registration;

/// Error enumeration for authoritative-store failures shared by all
/// repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
