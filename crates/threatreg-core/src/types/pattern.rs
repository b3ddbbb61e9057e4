//! Threat pattern condition types and operators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sql::text_column;
use crate::errors::ValidationError;

/// What a pattern condition inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    /// Name of the product(s) the component belongs to.
    Product,
    /// Id of the product(s) the component belongs to.
    ProductId,
    /// Tags carried by the component's product(s).
    ProductTag,
    /// Tags carried by the component itself.
    Tag,
    /// Outgoing relationships with a given label.
    Relationship,
    RelationshipTargetId,
    RelationshipTargetTag,
}

impl ConditionType {
    pub const ALL: [ConditionType; 7] = [
        Self::Product,
        Self::ProductId,
        Self::ProductTag,
        Self::Tag,
        Self::Relationship,
        Self::RelationshipTargetId,
        Self::RelationshipTargetTag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "PRODUCT",
            Self::ProductId => "PRODUCT_ID",
            Self::ProductTag => "PRODUCT_TAG",
            Self::Tag => "TAG",
            Self::Relationship => "RELATIONSHIP",
            Self::RelationshipTargetId => "RELATIONSHIP_TARGET_ID",
            Self::RelationshipTargetTag => "RELATIONSHIP_TARGET_TAG",
        }
    }

    /// Condition types that only make sense with a `relationship_type`.
    pub fn requires_relationship_type(&self) -> bool {
        matches!(
            self,
            Self::Relationship | Self::RelationshipTargetId | Self::RelationshipTargetTag
        )
    }

    /// Condition types that need a value unless the operator is EXISTS/NOT_EXISTS.
    pub fn requires_value(&self) -> bool {
        !matches!(self, Self::Relationship)
    }
}

impl FromStr for ConditionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidConditionType {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a condition compares the inspected data against its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternOperator {
    Equals,
    Contains,
    NotContains,
    NotEquals,
    Exists,
    NotExists,
    HasRelationshipWith,
    NotHasRelationshipWith,
}

impl PatternOperator {
    pub const ALL: [PatternOperator; 8] = [
        Self::Equals,
        Self::Contains,
        Self::NotContains,
        Self::NotEquals,
        Self::Exists,
        Self::NotExists,
        Self::HasRelationshipWith,
        Self::NotHasRelationshipWith,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::Contains => "CONTAINS",
            Self::NotContains => "NOT_CONTAINS",
            Self::NotEquals => "NOT_EQUALS",
            Self::Exists => "EXISTS",
            Self::NotExists => "NOT_EXISTS",
            Self::HasRelationshipWith => "HAS_RELATIONSHIP_WITH",
            Self::NotHasRelationshipWith => "NOT_HAS_RELATIONSHIP_WITH",
        }
    }

    /// EXISTS and NOT_EXISTS ignore the condition value.
    pub fn is_existence_check(&self) -> bool {
        matches!(self, Self::Exists | Self::NotExists)
    }
}

impl FromStr for PatternOperator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidOperator {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for PatternOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

text_column!(ConditionType);
text_column!(PatternOperator);
