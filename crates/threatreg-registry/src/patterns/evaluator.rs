//! Condition evaluation against an [`EvaluationContext`].

use threatreg_core::models::{PatternCondition, ThreatPattern};
use threatreg_core::types::{ComponentId, ConditionType, FxHashSet, PatternOperator};

use super::context::EvaluationContext;

/// A stored condition, reshaped by what it inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition<'a> {
    Product { operator: PatternOperator, value: &'a str },
    ProductId { operator: PatternOperator, value: &'a str },
    ProductTag { operator: PatternOperator, tag: &'a str },
    Tag { operator: PatternOperator, tag: &'a str },
    Relationship {
        operator: PatternOperator,
        label: &'a str,
        target: Option<ComponentId>,
    },
    RelationshipTargetId {
        operator: PatternOperator,
        label: &'a str,
        target: Option<ComponentId>,
    },
    RelationshipTargetTag {
        operator: PatternOperator,
        label: &'a str,
        tag: &'a str,
    },
}

impl<'a> From<&'a PatternCondition> for Condition<'a> {
    fn from(c: &'a PatternCondition) -> Self {
        let operator = c.operator;
        let label = c.relationship_type.as_str();
        // A value that is not an id never matches an edge target.
        let target = c.value.trim().parse::<ComponentId>().ok();
        match c.condition_type {
            ConditionType::Product => Self::Product { operator, value: &c.value },
            ConditionType::ProductId => Self::ProductId { operator, value: &c.value },
            ConditionType::ProductTag => Self::ProductTag { operator, tag: &c.value },
            ConditionType::Tag => Self::Tag { operator, tag: &c.value },
            ConditionType::Relationship => Self::Relationship { operator, label, target },
            ConditionType::RelationshipTargetId => {
                Self::RelationshipTargetId { operator, label, target }
            }
            ConditionType::RelationshipTargetTag => {
                Self::RelationshipTargetTag { operator, label, tag: &c.value }
            }
        }
    }
}

/// Inactive patterns never match. Active ones match when every condition
/// passes, so an empty condition list always matches.
pub fn evaluate_pattern(
    ctx: &EvaluationContext,
    component: ComponentId,
    pattern: &ThreatPattern,
) -> bool {
    pattern.is_active
        && pattern
            .conditions
            .iter()
            .all(|c| evaluate(ctx, component, &Condition::from(c)))
}

pub fn evaluate(
    ctx: &EvaluationContext,
    component: ComponentId,
    condition: &Condition<'_>,
) -> bool {
    match *condition {
        Condition::Product { operator, value } => {
            let products = ctx.products(component);
            let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
            any_product(&names, operator, value)
        }
        Condition::ProductId { operator, value } => {
            let ids: Vec<String> = ctx
                .products(component)
                .iter()
                .map(|p| p.id.to_string())
                .collect();
            let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
            any_product(&ids, operator, value)
        }
        Condition::ProductTag { operator, tag } => {
            let tags: FxHashSet<&str> = ctx
                .products(component)
                .iter()
                .flat_map(|p| ctx.tag_names(p.id))
                .collect();
            tag_condition(&tags, operator, tag)
        }
        Condition::Tag { operator, tag } => {
            let tags: FxHashSet<&str> = ctx.tag_names(component).collect();
            tag_condition(&tags, operator, tag)
        }
        Condition::Relationship { operator, label, target } => match operator {
            PatternOperator::Exists => ctx.edges(component, label).next().is_some(),
            PatternOperator::NotExists => ctx.edges(component, label).next().is_none(),
            PatternOperator::Equals => has_edge_to(ctx, component, label, target),
            _ => false,
        },
        Condition::RelationshipTargetId { operator, label, target } => match operator {
            PatternOperator::HasRelationshipWith => has_edge_to(ctx, component, label, target),
            PatternOperator::NotHasRelationshipWith => !has_edge_to(ctx, component, label, target),
            _ => false,
        },
        Condition::RelationshipTargetTag { operator, label, tag } => {
            let tagged = ctx.edges(component, label).any(|r| ctx.has_tag(r.to_id, tag));
            match operator {
                PatternOperator::HasRelationshipWith => tagged,
                PatternOperator::NotHasRelationshipWith => !tagged,
                _ => false,
            }
        }
    }
}

/// Positive operators pass when any value passes. Negative ones pass when no
/// value matches the positive form.
fn any_product(values: &[&str], operator: PatternOperator, expected: &str) -> bool {
    match operator {
        PatternOperator::Equals | PatternOperator::Contains => {
            values.iter().any(|v| apply_operator(v, operator, expected))
        }
        PatternOperator::NotEquals => !values.iter().any(|v| *v == expected),
        PatternOperator::NotContains => !values.iter().any(|v| v.contains(expected)),
        _ => false,
    }
}

fn apply_operator(actual: &str, operator: PatternOperator, expected: &str) -> bool {
    match operator {
        PatternOperator::Equals => actual == expected,
        PatternOperator::NotEquals => actual != expected,
        PatternOperator::Contains => actual.contains(expected),
        PatternOperator::NotContains => !actual.contains(expected),
        _ => false,
    }
}

fn tag_condition(tags: &FxHashSet<&str>, operator: PatternOperator, tag: &str) -> bool {
    match operator {
        PatternOperator::Contains => tags.contains(tag),
        PatternOperator::NotContains => !tags.contains(tag),
        PatternOperator::Exists => !tags.is_empty(),
        PatternOperator::NotExists => tags.is_empty(),
        _ => false,
    }
}

fn has_edge_to(
    ctx: &EvaluationContext,
    component: ComponentId,
    label: &str,
    target: Option<ComponentId>,
) -> bool {
    match target {
        Some(target) => ctx.edges(component, label).any(|r| r.to_id == target),
        None => false,
    }
}
