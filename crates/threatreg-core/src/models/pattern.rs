//! Threat patterns: declarative rules that attach threats to components.

use serde::{Deserialize, Serialize};

use crate::types::{ConditionId, ConditionType, PatternId, PatternOperator, ThreatId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatPattern {
    pub id: PatternId,
    pub name: String,
    pub description: String,
    pub threat_id: ThreatId,
    pub is_active: bool,
    /// Loaded alongside the pattern; all must pass for a match.
    pub conditions: Vec<PatternCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCondition {
    pub id: ConditionId,
    pub pattern_id: PatternId,
    pub condition_type: ConditionType,
    pub operator: PatternOperator,
    pub value: String,
    /// Relationship label for the RELATIONSHIP* condition types; empty otherwise.
    pub relationship_type: String,
}
