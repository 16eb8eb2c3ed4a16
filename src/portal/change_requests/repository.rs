use crate::portal::RepositoryError;

use super::domain::{ChangeRequest, ChangeRequestId};

/// Storage abstraction over the change request table.
pub trait ChangeRequestRepository: Send + Sync {
    fn insert(&self, request: ChangeRequest) -> Result<(), RepositoryError>;
    fn update(&self, request: ChangeRequest) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ChangeRequestId) -> Result<Option<ChangeRequest>, RepositoryError>;
}
