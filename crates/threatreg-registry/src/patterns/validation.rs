//! Condition shape checks, run before any condition is written.

use threatreg_core::errors::ValidationError;
use threatreg_core::types::{ConditionType, PatternOperator};

/// Condition fields supplied by a caller, before ids are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCondition {
    pub condition_type: ConditionType,
    pub operator: PatternOperator,
    pub value: String,
    pub relationship_type: String,
}

impl NewCondition {
    pub fn new(
        condition_type: ConditionType,
        operator: PatternOperator,
        value: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            condition_type,
            operator,
            value: value.into(),
            relationship_type: relationship_type.into(),
        }
    }
}

/// The relationship types need a label. Everything except RELATIONSHIP needs
/// a value unless the operator only checks existence.
pub(crate) fn validate_condition(
    condition_type: ConditionType,
    operator: PatternOperator,
    value: &str,
    relationship_type: &str,
) -> Result<(), ValidationError> {
    if condition_type.requires_relationship_type() && relationship_type.trim().is_empty() {
        return Err(ValidationError::MissingRelationshipType {
            condition_type: condition_type.to_string(),
        });
    }
    if condition_type.requires_value()
        && !operator.is_existence_check()
        && value.trim().is_empty()
    {
        return Err(ValidationError::MissingConditionValue {
            condition_type: condition_type.to_string(),
            operator: operator.to_string(),
        });
    }
    Ok(())
}
