//! Threat severity scale.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::sql::text_column;
use crate::errors::ValidationError;

/// Five-level severity, ordered `None < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatSeverity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatSeverity {
    /// All levels in ascending order.
    pub const fn all() -> [ThreatSeverity; 5] {
        [
            Self::None,
            Self::Low,
            Self::Medium,
            Self::High,
            Self::Critical,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Numeric level, 0 (none) through 4 (critical).
    pub fn as_int(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub fn from_int(level: i64) -> Result<Self, ValidationError> {
        match level {
            0 => Ok(Self::None),
            1 => Ok(Self::Low),
            2 => Ok(Self::Medium),
            3 => Ok(Self::High),
            4 => Ok(Self::Critical),
            other => Err(ValidationError::InvalidSeverityLevel { value: other }),
        }
    }

    pub fn less(&self, other: &Self) -> bool {
        self < other
    }

    pub fn greater(&self, other: &Self) -> bool {
        self > other
    }

    pub fn less_or_equal(&self, other: &Self) -> bool {
        self <= other
    }

    pub fn greater_or_equal(&self, other: &Self) -> bool {
        self >= other
    }
}

impl FromStr for ThreatSeverity {
    type Err = ValidationError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ValidationError::InvalidSeverity {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ThreatSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

text_column!(ThreatSeverity);
