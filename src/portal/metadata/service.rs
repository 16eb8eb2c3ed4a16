use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::info;

use super::domain::{ReferenceDataItem, ValidationRule};
use super::rules::{RuleCompileError, RuleSet, RuleViolation};
use super::store::{MetadataStore, MetadataStoreError};

/// Facade over the metadata containers plus a cache of compiled rule sets.
///
/// Rule sets are compiled when an entity type is first validated and evicted
/// whenever an admin edits that type's rules, so request handling never
/// re-parses patterns.
pub struct MetadataService {
    store: Arc<dyn MetadataStore>,
    compiled: RwLock<HashMap<String, Arc<RuleSet>>>,
}

impl MetadataService {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self {
            store,
            compiled: RwLock::new(HashMap::new()),
        }
    }

    pub fn reference_data(
        &self,
        category: &str,
    ) -> Result<Vec<ReferenceDataItem>, MetadataServiceError> {
        Ok(self.store.reference_data(category)?)
    }

    pub fn upsert_reference(
        &self,
        mut item: ReferenceDataItem,
    ) -> Result<ReferenceDataItem, MetadataServiceError> {
        item.ensure_id();
        self.store.upsert_reference(item.clone())?;
        Ok(item)
    }

    pub fn delete_reference(&self, id: &str, category: &str) -> Result<(), MetadataServiceError> {
        Ok(self.store.delete_reference(id, category)?)
    }

    pub fn validation_rules(
        &self,
        entity_type: &str,
    ) -> Result<Vec<ValidationRule>, MetadataServiceError> {
        Ok(self.store.validation_rules(entity_type)?)
    }

    pub fn upsert_rule(
        &self,
        mut rule: ValidationRule,
    ) -> Result<ValidationRule, MetadataServiceError> {
        rule.ensure_id();
        // An uncompilable pattern is the admin's error; it must never be
        // stored where the next payload validation would trip over it.
        RuleSet::compile(std::slice::from_ref(&rule))?;
        self.store.upsert_rule(rule.clone())?;
        self.evict(&rule.entity_type);
        Ok(rule)
    }

    pub fn delete_rule(&self, id: &str, entity_type: &str) -> Result<(), MetadataServiceError> {
        self.store.delete_rule(id, entity_type)?;
        self.evict(entity_type);
        Ok(())
    }

    /// Validate a payload against the compiled rule set for `entity_type`.
    /// Called before any write so a violation leaves no partial state.
    pub fn validate_payload(
        &self,
        entity_type: &str,
        payload: &Value,
    ) -> Result<(), MetadataServiceError> {
        let rules = self.rule_set(entity_type)?;
        rules.validate(payload)?;
        Ok(())
    }

    fn rule_set(&self, entity_type: &str) -> Result<Arc<RuleSet>, MetadataServiceError> {
        if let Some(rules) = self
            .compiled
            .read()
            .expect("rule cache lock poisoned")
            .get(entity_type)
        {
            return Ok(rules.clone());
        }

        let declared = self.store.validation_rules(entity_type)?;
        let compiled = Arc::new(RuleSet::compile(&declared)?);
        info!(entity_type, rules = declared.len(), "compiled validation rule set");

        self.compiled
            .write()
            .expect("rule cache lock poisoned")
            .insert(entity_type.to_string(), compiled.clone());
        Ok(compiled)
    }

    fn evict(&self, entity_type: &str) {
        self.compiled
            .write()
            .expect("rule cache lock poisoned")
            .remove(entity_type);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetadataServiceError {
    #[error(transparent)]
    Violation(#[from] RuleViolation),
    #[error(transparent)]
    Compile(#[from] RuleCompileError),
    #[error(transparent)]
    Store(#[from] MetadataStoreError),
}
