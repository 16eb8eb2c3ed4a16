use chrono::{DateTime, Utc};

use crate::portal::RepositoryError;

use super::domain::{InvitationId, InvitationStatus, VendorInvitation};

/// Storage abstraction over the invitation table.
pub trait InvitationRepository: Send + Sync {
    fn insert(&self, invitation: VendorInvitation) -> Result<(), RepositoryError>;
    fn update(&self, invitation: VendorInvitation) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &InvitationId) -> Result<Option<VendorInvitation>, RepositoryError>;
    fn find_by_token(&self, token: &str) -> Result<Option<VendorInvitation>, RepositoryError>;
    /// Pending or Accepted invitation for the address, if any. Used for the
    /// pre-write duplicate check.
    fn active_for_email(&self, email: &str) -> Result<Option<VendorInvitation>, RepositoryError>;
    /// Newest-first page plus the unpaged total.
    fn page(
        &self,
        page: usize,
        page_size: usize,
        status: Option<InvitationStatus>,
    ) -> Result<(Vec<VendorInvitation>, usize), RepositoryError>;
    /// Pending invitations whose expiry has passed, for the sweep.
    fn pending_expired(&self, now: DateTime<Utc>)
        -> Result<Vec<VendorInvitation>, RepositoryError>;
}
