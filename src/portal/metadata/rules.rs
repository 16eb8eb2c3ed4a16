//! Typed rule evaluation over JSON payloads.
//!
//! Stored [`ValidationRule`]s are compiled once into a [`RuleSet`] (regex
//! patterns parsed eagerly) and then applied to submitted payloads. Field
//! names match payload keys case-insensitively. A `Required` rule fails on a
//! missing, empty, or whitespace-only value; a `Regex` rule fails when a
//! present value does not match its pattern. The first failing rule wins.

use regex::Regex;
use serde_json::Value;

use super::domain::{RuleType, ValidationRule};

#[derive(Debug, thiserror::Error)]
pub enum RuleCompileError {
    #[error("invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        source: regex::Error,
    },
}

/// Business-rule failure reportable to the caller; carries the rule's
/// configured error message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RuleViolation(pub String);

#[derive(Debug)]
enum RuleCheck {
    Required,
    Pattern(Regex),
}

#[derive(Debug)]
struct CompiledRule {
    field: String,
    check: RuleCheck,
    message: String,
}

/// All compiled rules for one entity type.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn compile(rules: &[ValidationRule]) -> Result<Self, RuleCompileError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let check = match rule.rule_type {
                RuleType::Required => RuleCheck::Required,
                RuleType::Regex => {
                    let pattern = Regex::new(&rule.rule_value).map_err(|source| {
                        RuleCompileError::InvalidPattern {
                            field: rule.field_name.clone(),
                            source,
                        }
                    })?;
                    RuleCheck::Pattern(pattern)
                }
            };
            compiled.push(CompiledRule {
                field: rule.field_name.to_ascii_lowercase(),
                check,
                message: rule.error_message.clone(),
            });
        }
        Ok(Self { rules: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule against the payload, reporting the first violation.
    pub fn validate(&self, payload: &Value) -> Result<(), RuleViolation> {
        for rule in &self.rules {
            let value = lookup_field(payload, &rule.field);
            match &rule.check {
                RuleCheck::Required => {
                    let blank = value
                        .as_deref()
                        .map(|text| text.trim().is_empty())
                        .unwrap_or(true);
                    if blank {
                        return Err(RuleViolation(rule.message.clone()));
                    }
                }
                RuleCheck::Pattern(pattern) => {
                    // Pattern rules only constrain values that are present;
                    // pair with a Required rule to also reject absence.
                    if let Some(text) = value {
                        if !pattern.is_match(&text) {
                            return Err(RuleViolation(rule.message.clone()));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Case-insensitive key lookup returning the value's string form. Scalars are
/// stringified; null and structured values count as absent.
fn lookup_field(payload: &Value, field_lower: &str) -> Option<String> {
    let map = payload.as_object()?;
    let value = map
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(field_lower))
        .map(|(_, value)| value)?;

    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required(field: &str, message: &str) -> ValidationRule {
        ValidationRule {
            id: String::new(),
            entity_type: "VendorApplication".to_string(),
            field_name: field.to_string(),
            rule_type: RuleType::Required,
            rule_value: String::new(),
            error_message: message.to_string(),
        }
    }

    fn pattern(field: &str, value: &str, message: &str) -> ValidationRule {
        ValidationRule {
            id: String::new(),
            entity_type: "VendorApplication".to_string(),
            field_name: field.to_string(),
            rule_type: RuleType::Regex,
            rule_value: value.to_string(),
            error_message: message.to_string(),
        }
    }

    #[test]
    fn required_rule_rejects_missing_and_whitespace_values() {
        let rules = RuleSet::compile(&[required("TaxId", "Tax ID is required")]).expect("compiles");

        let missing = json!({ "companyName": "Acme" });
        assert_eq!(
            rules.validate(&missing),
            Err(RuleViolation("Tax ID is required".to_string()))
        );

        let blank = json!({ "taxId": "   " });
        assert_eq!(
            rules.validate(&blank),
            Err(RuleViolation("Tax ID is required".to_string()))
        );

        let present = json!({ "taxId": "12-3456789" });
        assert_eq!(rules.validate(&present), Ok(()));
    }

    #[test]
    fn field_matching_is_case_insensitive() {
        let rules = RuleSet::compile(&[required("taxid", "missing")]).expect("compiles");
        assert_eq!(rules.validate(&json!({ "TaxId": "x" })), Ok(()));
    }

    #[test]
    fn regex_rule_constrains_present_values_only() {
        let rules = RuleSet::compile(&[pattern(
            "taxId",
            r"^\d{2}-\d{7}$",
            "Tax ID must look like 12-3456789",
        )])
        .expect("compiles");

        assert_eq!(rules.validate(&json!({ "taxId": "nonsense" })).is_err(), true);
        assert_eq!(rules.validate(&json!({ "taxId": "12-3456789" })), Ok(()));
        // Absent value is not a regex violation.
        assert_eq!(rules.validate(&json!({ "other": 1 })), Ok(()));
    }

    #[test]
    fn scalars_are_stringified_before_matching() {
        let rules =
            RuleSet::compile(&[pattern("employees", r"^\d+$", "must be numeric")]).expect("ok");
        assert_eq!(rules.validate(&json!({ "employees": 250 })), Ok(()));
    }

    #[test]
    fn first_failing_rule_wins() {
        let rules = RuleSet::compile(&[
            required("companyName", "company name required"),
            required("taxId", "tax id required"),
        ])
        .expect("compiles");

        assert_eq!(
            rules.validate(&json!({})),
            Err(RuleViolation("company name required".to_string()))
        );
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        let result = RuleSet::compile(&[pattern("taxId", "([unclosed", "bad")]);
        assert!(matches!(
            result,
            Err(RuleCompileError::InvalidPattern { field, .. }) if field == "taxId"
        ));
    }
}
