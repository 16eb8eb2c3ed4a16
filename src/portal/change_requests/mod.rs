//! Change requests proposing modifications to vendor master data. The
//! relational status row is authoritative; the submitted payload lives in the
//! document store as an audit artifact and is merged back on reads.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ApprovalOutcome, ChangeRequest, ChangeRequestId, ChangeRequestStatus, ChangeRequestView,
    CreateChangeRequest, CreatedChangeRequest,
};
pub use repository::ChangeRequestRepository;
pub use router::change_request_router;
pub use service::{ChangeRequestService, ChangeRequestServiceError};
