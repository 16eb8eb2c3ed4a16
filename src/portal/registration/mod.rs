//! Vendor self-registration and application records. Invitation-driven
//! registration reuses these entities through the invitations module.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ApplicationStatus, RegisterVendorRequest, RegistrationSource, VendorApplication,
    VendorApplicationId, VendorMasterData,
};
pub use repository::ApplicationRepository;
pub use router::registration_router;
pub use service::{RegistrationService, RegistrationServiceError};
