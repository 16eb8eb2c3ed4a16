//! Admin-editable reference data (countries, currencies, vendor types) and
//! field-level validation rules, both held in the document store and keyed by
//! their category or entity type. Rules are compiled into typed rule sets at
//! load time instead of being re-interpreted per request.

pub mod domain;
pub mod router;
pub mod rules;
pub mod service;
pub mod store;

pub use domain::{ReferenceDataItem, RuleType, ValidationRule};
pub use router::metadata_router;
pub use rules::{RuleCompileError, RuleSet, RuleViolation};
pub use service::{MetadataService, MetadataServiceError};
pub use store::{MetadataStore, MetadataStoreError};
