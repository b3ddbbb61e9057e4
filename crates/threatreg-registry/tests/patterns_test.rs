//! Threat pattern CRUD, condition validation and matching.

use threatreg_core::errors::{RegistryError, ValidationError};
use threatreg_core::models::{Component, Threat};
use threatreg_core::types::{
    ComponentType, ConditionType, PatternId, PatternOperator, ThreatId,
};
use threatreg_registry::patterns::NewCondition;
use threatreg_registry::Registry;

use ConditionType::*;
use PatternOperator::*;

/// `edge` (instance) inherits from `nginx` (product, tagged `web`), is tagged
/// `internet-facing` and connects to `db` (tagged `pii`).
struct Estate {
    reg: Registry,
    nginx: Component,
    edge: Component,
    db: Component,
    threat: Threat,
}

fn estate() -> Estate {
    let reg = Registry::open_in_memory().unwrap();
    let nginx = reg.create_component("nginx", "", ComponentType::Product).unwrap();
    let edge = reg.create_component("edge", "", ComponentType::Instance).unwrap();
    let db = reg.create_component("db", "", ComponentType::Instance).unwrap();
    reg.create_inherits_threats_relationship(edge.id, nginx.id).unwrap();
    reg.create_relationship(edge.id, db.id, "connects_to").unwrap();
    reg.assign_tag_to_component_by_name(nginx.id, "web").unwrap();
    reg.assign_tag_to_component_by_name(edge.id, "internet-facing").unwrap();
    reg.assign_tag_to_component_by_name(db.id, "pii").unwrap();
    let threat = reg.create_threat("Data exfiltration", "").unwrap();
    Estate {
        reg,
        nginx,
        edge,
        db,
        threat,
    }
}

impl Estate {
    fn pattern(&self, conditions: &[NewCondition]) -> PatternId {
        self.reg
            .create_pattern_with_conditions("p", "", self.threat.id, true, conditions)
            .unwrap()
            .id
    }

    fn matches(&self, component: &Component, conditions: &[NewCondition]) -> bool {
        let pattern = self.pattern(conditions);
        self.reg
            .match_component_against_pattern(component.id, pattern)
            .unwrap()
    }
}

fn cond(condition_type: ConditionType, operator: PatternOperator, value: &str) -> NewCondition {
    NewCondition::new(condition_type, operator, value, "")
}

fn rel(condition_type: ConditionType, operator: PatternOperator, value: &str) -> NewCondition {
    NewCondition::new(condition_type, operator, value, "connects_to")
}

// ---- CRUD ----

#[test]
fn test_pattern_crud() {
    let e = estate();
    let p = e.reg.create_pattern("Public web", "desc", e.threat.id, true).unwrap();
    assert_eq!(e.reg.get_pattern(p.id).unwrap(), p);

    let other = e.reg.create_threat("Other", "").unwrap();
    let updated = e
        .reg
        .update_pattern(p.id, Some("Public web tier"), None, Some(other.id), Some(false))
        .unwrap();
    assert_eq!(updated.name, "Public web tier");
    assert_eq!(updated.description, "desc");
    assert!(!updated.is_active);
    assert!(e.reg.list_active_patterns().unwrap().is_empty());
    assert_eq!(e.reg.list_patterns_by_threat(other.id).unwrap().len(), 1);
    assert!(e.reg.list_patterns_by_threat(e.threat.id).unwrap().is_empty());

    e.reg.set_pattern_active(p.id, true).unwrap();
    assert_eq!(e.reg.list_active_patterns().unwrap().len(), 1);

    e.reg.delete_pattern(p.id).unwrap();
    assert!(e.reg.list_patterns().unwrap().is_empty());
    assert!(e.reg.delete_pattern(p.id).unwrap_err().is_not_found());
    assert!(e.reg.set_pattern_active(p.id, true).unwrap_err().is_not_found());
}

#[test]
fn test_pattern_needs_existing_threat() {
    let e = estate();
    let err = e.reg.create_pattern("p", "", ThreatId::new(), true).unwrap_err();
    assert!(err.is_not_found());
    let p = e.reg.create_pattern("p", "", e.threat.id, true).unwrap();
    let err = e
        .reg
        .update_pattern(p.id, None, None, Some(ThreatId::new()), None)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_condition_crud() {
    let e = estate();
    let p = e.reg.create_pattern("p", "", e.threat.id, true).unwrap();
    let c = e.reg.create_condition(p.id, Tag, Contains, "pii", "").unwrap();
    assert_eq!(e.reg.get_condition(c.id).unwrap(), c);
    assert_eq!(e.reg.get_pattern(p.id).unwrap().conditions, vec![c.clone()]);

    let updated = e
        .reg
        .update_condition(c.id, None, Some(NotContains), Some("public"), None)
        .unwrap();
    assert_eq!(updated.operator, NotContains);
    assert_eq!(updated.value, "public");

    e.reg.create_condition(p.id, Tag, Exists, "", "").unwrap();
    assert_eq!(e.reg.list_conditions_by_pattern(p.id).unwrap().len(), 2);
    assert_eq!(e.reg.list_all_conditions().unwrap().len(), 2);

    e.reg.delete_condition(c.id).unwrap();
    assert!(e.reg.delete_condition(c.id).unwrap_err().is_not_found());
    assert_eq!(e.reg.delete_conditions_by_pattern(p.id).unwrap(), 1);
    assert!(e.reg.list_conditions_by_pattern(p.id).unwrap().is_empty());
}

#[test]
fn test_conditions_validated() {
    let e = estate();
    let p = e.reg.create_pattern("p", "", e.threat.id, true).unwrap();

    let err = e.reg.create_condition(p.id, Relationship, Exists, "", "").unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::MissingRelationshipType { .. })
    ));

    let err = e.reg.create_condition(p.id, Product, Equals, "", "").unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::MissingConditionValue { .. })
    ));

    let c = e.reg.create_condition(p.id, Tag, Exists, "", "").unwrap();
    let err = e
        .reg
        .update_condition(c.id, None, Some(Contains), None, None)
        .unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
    assert_eq!(e.reg.get_condition(c.id).unwrap().operator, Exists);

    let err = e
        .reg
        .create_condition(PatternId::new(), Tag, Exists, "", "")
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_invalid_condition_blocks_whole_pattern() {
    let e = estate();
    let err = e
        .reg
        .create_pattern_with_conditions(
            "p",
            "",
            e.threat.id,
            true,
            &[cond(Tag, Contains, "pii"), cond(RelationshipTargetId, HasRelationshipWith, "x")],
        )
        .unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
    assert!(e.reg.list_patterns().unwrap().is_empty());
    assert!(e.reg.list_all_conditions().unwrap().is_empty());
}

// ---- evaluation ----

#[test]
fn test_empty_and_inactive_patterns() {
    let e = estate();
    assert!(e.matches(&e.db, &[]));

    let inactive = e.reg.create_pattern("off", "", e.threat.id, false).unwrap();
    assert!(!e
        .reg
        .match_component_against_pattern(e.db.id, inactive.id)
        .unwrap());
}

#[test]
fn test_product_conditions_follow_inheritance() {
    let e = estate();
    assert!(e.matches(&e.edge, &[cond(Product, Equals, "nginx")]));
    assert!(e.matches(&e.nginx, &[cond(Product, Equals, "nginx")]));
    assert!(!e.matches(&e.db, &[cond(Product, Equals, "nginx")]));
    assert!(e.matches(&e.edge, &[cond(Product, Contains, "ngi")]));
    assert!(!e.matches(&e.edge, &[cond(Product, NotEquals, "nginx")]));
    assert!(e.matches(&e.edge, &[cond(Product, NotContains, "apache")]));
    assert!(e.matches(&e.edge, &[cond(ProductId, Equals, &e.nginx.id.to_string())]));
    assert!(e.matches(&e.edge, &[cond(ProductTag, Contains, "web")]));
    assert!(!e.matches(&e.db, &[cond(ProductTag, Exists, "")]));
}

#[test]
fn test_tag_conditions() {
    let e = estate();
    assert!(e.matches(&e.edge, &[cond(Tag, Contains, "internet-facing")]));
    assert!(!e.matches(&e.edge, &[cond(Tag, Contains, "web")]), "product tags are not own tags");
    assert!(e.matches(&e.edge, &[cond(Tag, NotContains, "pii")]));
    assert!(e.matches(&e.edge, &[cond(Tag, Exists, "")]));
    assert!(!e.matches(&e.edge, &[cond(Tag, NotExists, "")]));
    assert!(!e.matches(&e.edge, &[cond(Tag, Equals, "internet-facing")]));
}

#[test]
fn test_relationship_conditions() {
    let e = estate();
    assert!(e.matches(&e.edge, &[rel(Relationship, Exists, "")]));
    assert!(e.matches(&e.db, &[rel(Relationship, NotExists, "")]));
    assert!(e.matches(&e.edge, &[rel(Relationship, Equals, &e.db.id.to_string())]));
    assert!(!e.matches(&e.edge, &[rel(Relationship, Equals, "not-an-id")]));

    let db_id = e.db.id.to_string();
    assert!(e.matches(&e.edge, &[rel(RelationshipTargetId, HasRelationshipWith, &db_id)]));
    assert!(e.matches(&e.nginx, &[rel(RelationshipTargetId, NotHasRelationshipWith, &db_id)]));

    assert!(e.matches(&e.edge, &[rel(RelationshipTargetTag, HasRelationshipWith, "pii")]));
    assert!(!e.matches(&e.edge, &[rel(RelationshipTargetTag, NotHasRelationshipWith, "pii")]));
    assert!(e.matches(&e.db, &[rel(RelationshipTargetTag, NotHasRelationshipWith, "pii")]));
    assert!(!e.matches(&e.edge, &[rel(RelationshipTargetTag, Exists, "pii")]));
}

#[test]
fn test_every_condition_must_pass() {
    let e = estate();
    let both = [
        cond(Tag, Contains, "internet-facing"),
        rel(RelationshipTargetTag, HasRelationshipWith, "pii"),
    ];
    assert!(e.matches(&e.edge, &both));
    let conflicting = [cond(Tag, Contains, "internet-facing"), cond(Tag, NotExists, "")];
    assert!(!e.matches(&e.edge, &conflicting));
}

#[test]
fn test_match_all_components_omits_non_matching() {
    let e = estate();
    e.pattern(&[
        cond(Tag, Contains, "internet-facing"),
        rel(RelationshipTargetTag, HasRelationshipWith, "pii"),
    ]);
    e.reg
        .create_pattern_with_conditions("disabled", "", e.threat.id, false, &[])
        .unwrap();

    let results = e.reg.match_all_components().unwrap();
    assert_eq!(results.len(), 1);
    let matches = &results[&e.edge.id];
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].component_id, e.edge.id);
    assert_eq!(matches[0].threat_id, e.threat.id);
    assert_eq!(matches[0].pattern.id, matches[0].pattern_id);
}

#[test]
fn test_match_component_against_active_patterns() {
    let e = estate();
    let web = e.pattern(&[cond(ProductTag, Contains, "web")]);
    e.pattern(&[cond(Tag, Contains, "pii")]);

    let matches = e.reg.match_component_against_active_patterns(e.edge.id).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].pattern_id, web);

    let err = e
        .reg
        .match_component_against_active_patterns(threatreg_core::types::ComponentId::new())
        .unwrap_err();
    assert!(err.is_not_found());
}
