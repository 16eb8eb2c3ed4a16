use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One lookup entry, e.g. `COUNTRY_US`. Partition key is the category
/// ("Country", "Currency", "VendorType").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDataItem {
    #[serde(default)]
    pub id: String,
    pub category: String,
    pub code: String,
    pub description: String,
    /// Mapping to the upstream master-data system, e.g. "US" -> "US".
    #[serde(default)]
    pub external_code: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ReferenceDataItem {
    /// Assign a generated id when the admin did not provide one.
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
    }
}

/// Supported validation rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleType {
    Required,
    Regex,
}

/// Field-level validation rule. Partition key is the entity type
/// ("VendorApplication", "ChangeRequest").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub id: String,
    pub entity_type: String,
    pub field_name: String,
    pub rule_type: RuleType,
    /// The regex pattern for `Regex` rules; unused for `Required`.
    #[serde(default)]
    pub rule_value: String,
    pub error_message: String,
}

impl ValidationRule {
    pub fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
    }
}
