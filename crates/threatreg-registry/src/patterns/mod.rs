//! Threat patterns: CRUD, condition management and matching.
//!
//! Matching loads one [`EvaluationContext`] snapshot, then evaluates every
//! component in parallel against the active patterns.

pub mod context;
pub mod evaluator;
pub mod validation;

use rayon::prelude::*;
use rusqlite::Connection;
use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::events::PatternMatchedEvent;
use threatreg_core::models::{PatternCondition, ThreatPattern};
use threatreg_core::types::{
    ComponentId, ConditionId, ConditionType, FxHashMap, PatternId, PatternOperator, ThreatId,
};
use threatreg_storage::queries::patterns;

pub use context::EvaluationContext;
pub use evaluator::{evaluate, evaluate_pattern, Condition};
pub use validation::NewCondition;

use crate::components::require_component;
use crate::threats::require_threat;
use crate::validate;
use crate::Registry;
use validation::validate_condition;

/// One active pattern matching one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub component_id: ComponentId,
    pub threat_id: ThreatId,
    pub pattern_id: PatternId,
    pub pattern: ThreatPattern,
}

fn require_pattern(conn: &Connection, id: PatternId) -> RegistryResult<ThreatPattern> {
    patterns::get_pattern(conn, id)?.ok_or_else(|| RegistryError::not_found("threat pattern", id))
}

fn require_condition(conn: &Connection, id: ConditionId) -> RegistryResult<PatternCondition> {
    patterns::get_condition(conn, id)?
        .ok_or_else(|| RegistryError::not_found("pattern condition", id))
}

fn matches_for(
    ctx: &EvaluationContext,
    component_id: ComponentId,
    active: &[ThreatPattern],
) -> Vec<PatternMatch> {
    active
        .iter()
        .filter(|pattern| evaluate_pattern(ctx, component_id, pattern))
        .map(|pattern| PatternMatch {
            component_id,
            threat_id: pattern.threat_id,
            pattern_id: pattern.id,
            pattern: pattern.clone(),
        })
        .collect()
}

impl Registry {
    // ---- patterns ----

    pub fn create_pattern(
        &self,
        name: &str,
        description: &str,
        threat_id: ThreatId,
        is_active: bool,
    ) -> RegistryResult<ThreatPattern> {
        self.create_pattern_with_conditions(name, description, threat_id, is_active, &[])
    }

    /// Validate every condition up front, then write the pattern and its
    /// conditions in one transaction.
    pub fn create_pattern_with_conditions(
        &self,
        name: &str,
        description: &str,
        threat_id: ThreatId,
        is_active: bool,
        conditions: &[NewCondition],
    ) -> RegistryResult<ThreatPattern> {
        let name = validate::required("name", name)?;
        for c in conditions {
            validate_condition(c.condition_type, c.operator, &c.value, &c.relationship_type)?;
        }

        let id = PatternId::new();
        let pattern = ThreatPattern {
            id,
            name,
            description: description.to_string(),
            threat_id,
            is_active,
            conditions: conditions
                .iter()
                .map(|c| PatternCondition {
                    id: ConditionId::new(),
                    pattern_id: id,
                    condition_type: c.condition_type,
                    operator: c.operator,
                    value: c.value.clone(),
                    relationship_type: c.relationship_type.clone(),
                })
                .collect(),
        };

        self.db.with_transaction(|conn| {
            require_threat(conn, threat_id)?;
            patterns::insert_pattern(conn, &pattern)?;
            for condition in &pattern.conditions {
                patterns::insert_condition(conn, condition)?;
            }
            Ok::<_, RegistryError>(())
        })?;
        tracing::info!(
            pattern_id = %pattern.id,
            threat_id = %threat_id,
            conditions = pattern.conditions.len(),
            "created threat pattern"
        );
        Ok(pattern)
    }

    pub fn get_pattern(&self, id: PatternId) -> RegistryResult<ThreatPattern> {
        self.db.with_reader(|conn| require_pattern(conn, id))
    }

    pub fn update_pattern(
        &self,
        id: PatternId,
        name: Option<&str>,
        description: Option<&str>,
        threat_id: Option<ThreatId>,
        is_active: Option<bool>,
    ) -> RegistryResult<ThreatPattern> {
        let name = name.map(|n| validate::required("name", n)).transpose()?;
        self.db.with_transaction(|conn| {
            let mut pattern = require_pattern(conn, id)?;
            if let Some(name) = name {
                pattern.name = name;
            }
            if let Some(description) = description {
                pattern.description = description.to_string();
            }
            if let Some(threat_id) = threat_id {
                require_threat(conn, threat_id)?;
                pattern.threat_id = threat_id;
            }
            if let Some(is_active) = is_active {
                pattern.is_active = is_active;
            }
            patterns::update_pattern(conn, &pattern)?;
            Ok(pattern)
        })
    }

    pub fn delete_pattern(&self, id: PatternId) -> RegistryResult<()> {
        let deleted = self.db.with_writer(|conn| patterns::delete_pattern(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("threat pattern", id));
        }
        tracing::info!(pattern_id = %id, "deleted threat pattern");
        Ok(())
    }

    pub fn set_pattern_active(&self, id: PatternId, is_active: bool) -> RegistryResult<()> {
        let updated = self
            .db
            .with_writer(|conn| patterns::set_pattern_active(conn, id, is_active))?;
        if updated == 0 {
            return Err(RegistryError::not_found("threat pattern", id));
        }
        tracing::debug!(pattern_id = %id, is_active, "set pattern active flag");
        Ok(())
    }

    pub fn list_patterns(&self) -> RegistryResult<Vec<ThreatPattern>> {
        Ok(self.db.with_reader(patterns::list_patterns)?)
    }

    pub fn list_active_patterns(&self) -> RegistryResult<Vec<ThreatPattern>> {
        Ok(self.db.with_reader(patterns::list_active_patterns)?)
    }

    pub fn list_patterns_by_threat(
        &self,
        threat_id: ThreatId,
    ) -> RegistryResult<Vec<ThreatPattern>> {
        Ok(self
            .db
            .with_reader(|conn| patterns::list_patterns_by_threat(conn, threat_id))?)
    }

    // ---- conditions ----

    pub fn create_condition(
        &self,
        pattern_id: PatternId,
        condition_type: ConditionType,
        operator: PatternOperator,
        value: &str,
        relationship_type: &str,
    ) -> RegistryResult<PatternCondition> {
        validate_condition(condition_type, operator, value, relationship_type)?;
        let condition = PatternCondition {
            id: ConditionId::new(),
            pattern_id,
            condition_type,
            operator,
            value: value.to_string(),
            relationship_type: relationship_type.to_string(),
        };
        self.db.with_transaction(|conn| {
            require_pattern(conn, pattern_id)?;
            patterns::insert_condition(conn, &condition)?;
            Ok::<_, RegistryError>(())
        })?;
        tracing::debug!(
            condition_id = %condition.id,
            pattern_id = %pattern_id,
            condition_type = %condition_type,
            operator = %operator,
            "created pattern condition"
        );
        Ok(condition)
    }

    pub fn get_condition(&self, id: ConditionId) -> RegistryResult<PatternCondition> {
        self.db.with_reader(|conn| require_condition(conn, id))
    }

    /// Apply the given fields, then validate the result as a whole.
    pub fn update_condition(
        &self,
        id: ConditionId,
        condition_type: Option<ConditionType>,
        operator: Option<PatternOperator>,
        value: Option<&str>,
        relationship_type: Option<&str>,
    ) -> RegistryResult<PatternCondition> {
        self.db.with_transaction(|conn| {
            let mut condition = require_condition(conn, id)?;
            if let Some(condition_type) = condition_type {
                condition.condition_type = condition_type;
            }
            if let Some(operator) = operator {
                condition.operator = operator;
            }
            if let Some(value) = value {
                condition.value = value.to_string();
            }
            if let Some(relationship_type) = relationship_type {
                condition.relationship_type = relationship_type.to_string();
            }
            validate_condition(
                condition.condition_type,
                condition.operator,
                &condition.value,
                &condition.relationship_type,
            )?;
            patterns::update_condition(conn, &condition)?;
            Ok(condition)
        })
    }

    pub fn delete_condition(&self, id: ConditionId) -> RegistryResult<()> {
        let deleted = self.db.with_writer(|conn| patterns::delete_condition(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("pattern condition", id));
        }
        Ok(())
    }

    pub fn list_conditions_by_pattern(
        &self,
        pattern_id: PatternId,
    ) -> RegistryResult<Vec<PatternCondition>> {
        Ok(self
            .db
            .with_reader(|conn| patterns::list_conditions_by_pattern(conn, pattern_id))?)
    }

    /// Returns the number of conditions removed.
    pub fn delete_conditions_by_pattern(&self, pattern_id: PatternId) -> RegistryResult<usize> {
        Ok(self
            .db
            .with_writer(|conn| patterns::delete_conditions_by_pattern(conn, pattern_id))?)
    }

    pub fn list_all_conditions(&self) -> RegistryResult<Vec<PatternCondition>> {
        Ok(self.db.with_reader(patterns::list_all_conditions)?)
    }

    // ---- matching ----

    /// Every component against every active pattern. Components without a
    /// match are left out.
    pub fn match_all_components(
        &self,
    ) -> RegistryResult<FxHashMap<ComponentId, Vec<PatternMatch>>> {
        let (ctx, active) = self.db.with_reader(|conn| {
            Ok::<_, RegistryError>((
                EvaluationContext::load(conn)?,
                patterns::list_active_patterns(conn)?,
            ))
        })?;

        let ids: Vec<ComponentId> = ctx.components().map(|c| c.id).collect();
        let results: FxHashMap<ComponentId, Vec<PatternMatch>> = ids
            .par_iter()
            .filter_map(|&id| {
                let matches = matches_for(&ctx, id, &active);
                (!matches.is_empty()).then_some((id, matches))
            })
            .collect();

        for m in results.values().flatten() {
            self.events.emit_pattern_matched(&PatternMatchedEvent {
                component_id: m.component_id,
                pattern_id: m.pattern_id,
                threat_id: m.threat_id,
            });
        }
        tracing::info!(
            components = ids.len(),
            patterns = active.len(),
            matched = results.len(),
            "matched components against active patterns"
        );
        Ok(results)
    }

    pub fn match_component_against_pattern(
        &self,
        component_id: ComponentId,
        pattern_id: PatternId,
    ) -> RegistryResult<bool> {
        self.db.with_reader(|conn| {
            require_component(conn, component_id)?;
            let pattern = require_pattern(conn, pattern_id)?;
            let ctx = EvaluationContext::load(conn)?;
            Ok(evaluate_pattern(&ctx, component_id, &pattern))
        })
    }

    pub fn match_component_against_active_patterns(
        &self,
        component_id: ComponentId,
    ) -> RegistryResult<Vec<PatternMatch>> {
        self.db.with_reader(|conn| {
            require_component(conn, component_id)?;
            let active = patterns::list_active_patterns(conn)?;
            let ctx = EvaluationContext::load(conn)?;
            Ok(matches_for(&ctx, component_id, &active))
        })
    }
}
