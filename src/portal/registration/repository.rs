use crate::portal::RepositoryError;

use super::domain::{VendorApplication, VendorApplicationId};

/// Storage abstraction over the vendor application table.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: VendorApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &VendorApplicationId) -> Result<Option<VendorApplication>, RepositoryError>;
    /// Case-insensitive lookup used for duplicate-registration checks.
    fn find_by_email(&self, email: &str) -> Result<Option<VendorApplication>, RepositoryError>;
}
