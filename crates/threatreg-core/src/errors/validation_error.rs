//! Input validation errors.

use super::error_code::{self, RegistryErrorCode};

/// Rejected input, raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("invalid threat severity: {value}. Valid values are: none, low, medium, high, critical")]
    InvalidSeverity { value: String },

    #[error("invalid severity level: {value}. Valid range is 0-4")]
    InvalidSeverityLevel { value: i64 },

    #[error("invalid component type: {value}. Valid values are: product, instance")]
    InvalidComponentType { value: String },

    #[error("invalid status: must be 'resolved', 'awaiting', or 'accepted'")]
    InvalidResolutionStatus { value: String },

    #[error("invalid attribute type: {value}. Valid values are: string, text, number, component")]
    InvalidAttributeType { value: String },

    #[error("invalid value for {attribute_type} attribute: {message}")]
    InvalidAttributeValue {
        attribute_type: &'static str,
        message: String,
    },

    #[error("invalid color: {value}. Expected #RRGGBB")]
    InvalidColor { value: String },

    #[error("component cannot have a relationship to itself")]
    SelfRelationship,

    #[error("labels starting with '__' are reserved for system use")]
    ReservedLabel { label: String },

    #[error("a resolution cannot delegate to itself")]
    SelfDelegation,

    #[error("at least one of delegated_by or delegated_to is required")]
    MissingDelegationFilter,

    #[error("invalid condition_type: {value}")]
    InvalidConditionType { value: String },

    #[error("invalid operator: {value}")]
    InvalidOperator { value: String },

    #[error("relationship_type is required for {condition_type} condition")]
    MissingRelationshipType { condition_type: String },

    #[error("value is required for {condition_type} condition with {operator} operator")]
    MissingConditionValue {
        condition_type: String,
        operator: String,
    },
}

impl RegistryErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        error_code::VALIDATION_ERROR
    }
}
