//! Component, attribute and resolution enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sql::text_column;
use crate::errors::ValidationError;

/// Whether a component describes a product or a deployed instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Product,
    Instance,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Instance => "instance",
        }
    }
}

impl FromStr for ComponentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "instance" => Ok(Self::Instance),
            _ => Err(ValidationError::InvalidComponentType {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of a component attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Text,
    Number,
    /// Value is the id of another component.
    Component,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::Number => "number",
            Self::Component => "component",
        }
    }
}

impl FromStr for AttributeType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Self::String),
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "component" => Ok(Self::Component),
            _ => Err(ValidationError::InvalidAttributeType {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a threat assignment resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Resolved,
    Awaiting,
    Accepted,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::Awaiting => "awaiting",
            Self::Accepted => "accepted",
        }
    }

    /// Resolved and accepted threats no longer count as open.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Resolved | Self::Accepted)
    }
}

impl FromStr for ResolutionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resolved" => Ok(Self::Resolved),
            "awaiting" => Ok(Self::Awaiting),
            "accepted" => Ok(Self::Accepted),
            _ => Err(ValidationError::InvalidResolutionStatus {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

text_column!(ComponentType);
text_column!(AttributeType);
text_column!(ResolutionStatus);
