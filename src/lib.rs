//! Vendor master-data portal: onboarding applications, change requests, and
//! approver workflows backed by a relational-style repository, a document
//! store for audit artifacts and domain events, and a queue for async fan-out.

pub mod config;
pub mod error;
pub mod portal;
pub mod telemetry;
