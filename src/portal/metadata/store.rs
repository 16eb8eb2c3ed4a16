use super::domain::{ReferenceDataItem, ValidationRule};

/// Document-store failure for the metadata containers.
#[derive(Debug, thiserror::Error)]
pub enum MetadataStoreError {
    #[error("record not found")]
    NotFound,
    #[error("metadata store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction over the reference-data and validation-rule
/// containers, each partitioned by category or entity type.
pub trait MetadataStore: Send + Sync {
    /// Active reference entries for one category.
    fn reference_data(&self, category: &str) -> Result<Vec<ReferenceDataItem>, MetadataStoreError>;
    fn upsert_reference(&self, item: ReferenceDataItem) -> Result<(), MetadataStoreError>;
    fn delete_reference(&self, id: &str, category: &str) -> Result<(), MetadataStoreError>;

    /// All rules declared for one entity type.
    fn validation_rules(&self, entity_type: &str)
        -> Result<Vec<ValidationRule>, MetadataStoreError>;
    fn upsert_rule(&self, rule: ValidationRule) -> Result<(), MetadataStoreError>;
    fn delete_rule(&self, id: &str, entity_type: &str) -> Result<(), MetadataStoreError>;
}
