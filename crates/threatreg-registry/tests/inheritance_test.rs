//! Threat inheritance: propagation, residual overrides, cycles and diamonds.

use threatreg_core::errors::{RegistryError, ValidationError};
use threatreg_core::models::{Component, Threat, ThreatAssignment};
use threatreg_core::types::{AssignmentId, ComponentType, ThreatSeverity};
use threatreg_registry::Registry;
use threatreg_storage::queries::assignment_links;

fn registry() -> Registry {
    Registry::open_in_memory().unwrap()
}

fn product(reg: &Registry, name: &str) -> Component {
    reg.create_component(name, "", ComponentType::Product).unwrap()
}

fn instance(reg: &Registry, name: &str) -> Component {
    reg.create_component(name, "", ComponentType::Instance).unwrap()
}

fn threat(reg: &Registry, title: &str) -> Threat {
    reg.create_threat(title, "").unwrap()
}

fn assignment_on(reg: &Registry, component: &Component, threat: &Threat) -> ThreatAssignment {
    reg.list_threat_assignments_by_component(component.id)
        .unwrap()
        .into_iter()
        .find(|a| a.threat_id == threat.id)
        .expect("assignment should exist")
}

fn links_from(reg: &Registry, id: AssignmentId) -> Vec<AssignmentId> {
    reg.db()
        .with_reader(|conn| assignment_links::list_links_from(conn, id))
        .unwrap()
        .into_iter()
        .map(|l| l.to_id)
        .collect()
}

// ---- propagation ----

#[test]
fn test_assignment_flows_to_children() {
    let reg = registry();
    let nginx = product(&reg, "nginx");
    let edge = instance(&reg, "edge-proxy");
    let t = threat(&reg, "Request smuggling");
    reg.create_inherits_threats_relationship(edge.id, nginx.id).unwrap();

    let parent = reg.assign_threat_to_component(nginx.id, t.id).unwrap();
    let child = assignment_on(&reg, &edge, &t);
    assert_eq!(child.severity, None);
    assert_eq!(links_from(&reg, child.id), vec![parent.id]);

    reg.set_threat_assignment_severity(parent.id, Some(ThreatSeverity::High))
        .unwrap();
    let child = assignment_on(&reg, &edge, &t);
    assert_eq!(child.severity, Some(ThreatSeverity::High));
    assert_eq!(child.residual_severity, Some(ThreatSeverity::High));
}

#[test]
fn test_existing_assignments_flow_into_new_child() {
    let reg = registry();
    let redis = product(&reg, "redis");
    let cache = instance(&reg, "session-cache");
    let t = threat(&reg, "Unauthenticated access");
    let parent = reg.assign_threat_to_component(redis.id, t.id).unwrap();
    reg.set_threat_assignment_severity(parent.id, Some(ThreatSeverity::Critical))
        .unwrap();
    reg.set_threat_assignment_residual_severity(parent.id, Some(ThreatSeverity::Medium))
        .unwrap();

    reg.create_inherits_threats_relationship(cache.id, redis.id).unwrap();

    let child = assignment_on(&reg, &cache, &t);
    assert_eq!(child.severity, Some(ThreatSeverity::Medium), "child severity is parent residual");
    assert_eq!(child.residual_severity, Some(ThreatSeverity::Medium));
}

#[test]
fn test_reassigning_is_idempotent() {
    let reg = registry();
    let c = product(&reg, "postgres");
    let t = threat(&reg, "SQL injection");
    let first = reg.assign_threat_to_component(c.id, t.id).unwrap();
    let second = reg.assign_threat_to_component(c.id, t.id).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(reg.list_threat_assignments_by_component(c.id).unwrap().len(), 1);
}

#[test]
fn test_explicit_child_residual_survives_parent_change() {
    let reg = registry();
    let p = product(&reg, "openssl");
    let i = instance(&reg, "api-gateway");
    let t = threat(&reg, "Weak cipher suites");
    reg.create_inherits_threats_relationship(i.id, p.id).unwrap();
    let parent = reg.assign_threat_to_component(p.id, t.id).unwrap();
    reg.set_threat_assignment_severity(parent.id, Some(ThreatSeverity::High))
        .unwrap();

    let child = assignment_on(&reg, &i, &t);
    reg.set_threat_assignment_residual_severity(child.id, Some(ThreatSeverity::Low))
        .unwrap();

    reg.set_threat_assignment_severity(parent.id, Some(ThreatSeverity::Critical))
        .unwrap();
    let child = assignment_on(&reg, &i, &t);
    assert_eq!(child.severity, Some(ThreatSeverity::Critical));
    assert_eq!(child.residual_severity, Some(ThreatSeverity::Low));
}

#[test]
fn test_residual_override_flows_to_grandchildren() {
    let reg = registry();
    let base = product(&reg, "linux");
    let mid = product(&reg, "hardened-linux");
    let leaf = instance(&reg, "build-host");
    let t = threat(&reg, "Privilege escalation");
    reg.create_inherits_threats_relationship(mid.id, base.id).unwrap();
    reg.create_inherits_threats_relationship(leaf.id, mid.id).unwrap();

    let root = reg.assign_threat_to_component(base.id, t.id).unwrap();
    reg.set_threat_assignment_severity(root.id, Some(ThreatSeverity::High))
        .unwrap();
    assert_eq!(assignment_on(&reg, &leaf, &t).severity, Some(ThreatSeverity::High));

    let middle = assignment_on(&reg, &mid, &t);
    reg.set_threat_assignment_residual_severity(middle.id, Some(ThreatSeverity::Low))
        .unwrap();
    let leaf_assignment = assignment_on(&reg, &leaf, &t);
    assert_eq!(leaf_assignment.severity, Some(ThreatSeverity::Low));
    assert_eq!(links_from(&reg, leaf_assignment.id), vec![middle.id]);
}

#[test]
fn test_diamond_creates_one_assignment_with_two_links() {
    let reg = registry();
    let top = product(&reg, "jvm");
    let left = product(&reg, "spring");
    let right = product(&reg, "tomcat");
    let bottom = instance(&reg, "billing-service");
    let t = threat(&reg, "Deserialization");
    reg.create_inherits_threats_relationship(left.id, top.id).unwrap();
    reg.create_inherits_threats_relationship(right.id, top.id).unwrap();
    reg.create_inherits_threats_relationship(bottom.id, left.id).unwrap();
    reg.create_inherits_threats_relationship(bottom.id, right.id).unwrap();

    reg.assign_threat_to_component(top.id, t.id).unwrap();

    let assignments = reg.list_threat_assignments_by_component(bottom.id).unwrap();
    assert_eq!(assignments.len(), 1);
    let mut links = links_from(&reg, assignments[0].id);
    links.sort();
    let mut expected = vec![
        assignment_on(&reg, &left, &t).id,
        assignment_on(&reg, &right, &t).id,
    ];
    expected.sort();
    assert_eq!(links, expected);
}

#[test]
fn test_depth_cap_stops_propagation() {
    let dir = tempfile::TempDir::new().unwrap();
    let overrides = threatreg_core::config::ConfigOverrides {
        max_depth: Some(1),
        ..Default::default()
    };
    let reg = Registry::open(dir.path(), Some(&overrides)).unwrap();
    let a = product(&reg, "a");
    let b = product(&reg, "b");
    let c = instance(&reg, "c");
    reg.create_inherits_threats_relationship(b.id, a.id).unwrap();
    reg.create_inherits_threats_relationship(c.id, b.id).unwrap();
    let t = threat(&reg, "Supply chain");

    reg.assign_threat_to_component(a.id, t.id).unwrap();
    assert_eq!(reg.list_threat_assignments_by_component(b.id).unwrap().len(), 1);
    assert!(reg.list_threat_assignments_by_component(c.id).unwrap().is_empty());
}

// ---- relationship checks ----

#[test]
fn test_self_inheritance_rejected() {
    let reg = registry();
    let p = product(&reg, "p");
    let err = reg.create_inherits_threats_relationship(p.id, p.id).unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::SelfRelationship)
    ));
}

#[test]
fn test_duplicate_inheritance_rejected() {
    let reg = registry();
    let p = product(&reg, "p");
    let i = instance(&reg, "i");
    reg.create_inherits_threats_relationship(i.id, p.id).unwrap();
    let err = reg.create_inherits_threats_relationship(i.id, p.id).unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }));
}

#[test]
fn test_cycles_rejected() {
    let reg = registry();
    let a = product(&reg, "a");
    let b = product(&reg, "b");
    let c = product(&reg, "c");
    reg.create_inherits_threats_relationship(b.id, a.id).unwrap();
    reg.create_inherits_threats_relationship(c.id, b.id).unwrap();

    let err = reg.create_inherits_threats_relationship(a.id, c.id).unwrap_err();
    assert!(matches!(err, RegistryError::CycleDetected { .. }));
    assert!(reg.list_component_parents(a.id).unwrap().is_empty());
}

#[test]
fn test_cycle_longer_than_max_depth_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let overrides = threatreg_core::config::ConfigOverrides {
        max_depth: Some(2),
        ..Default::default()
    };
    let reg = Registry::open(dir.path(), Some(&overrides)).unwrap();
    let a = product(&reg, "a");
    let b = product(&reg, "b");
    let c = product(&reg, "c");
    let d = product(&reg, "d");
    reg.create_inherits_threats_relationship(b.id, a.id).unwrap();
    reg.create_inherits_threats_relationship(c.id, b.id).unwrap();
    reg.create_inherits_threats_relationship(d.id, c.id).unwrap();

    let err = reg.create_inherits_threats_relationship(a.id, d.id).unwrap_err();
    assert!(matches!(err, RegistryError::CycleDetected { .. }));
    assert!(reg.list_component_parents(a.id).unwrap().is_empty());
    assert!(!reg.get_all_tree_paths().unwrap().is_empty());
}

#[test]
fn test_missing_component_is_not_found() {
    let reg = registry();
    let p = product(&reg, "p");
    let err = reg
        .create_inherits_threats_relationship(threatreg_core::types::ComponentId::new(), p.id)
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_parents_and_children_listed() {
    let reg = registry();
    let p1 = product(&reg, "alpha");
    let p2 = product(&reg, "beta");
    let i = instance(&reg, "node");
    reg.create_inherits_threats_relationship(i.id, p1.id).unwrap();
    reg.create_inherits_threats_relationship(i.id, p2.id).unwrap();

    let mut parents: Vec<_> = reg
        .list_component_parents(i.id)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    parents.sort();
    assert_eq!(parents, vec!["alpha", "beta"]);
    let children = reg.list_component_children(p1.id).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, i.id);
}

#[test]
fn test_removing_inheritance_keeps_assignments_and_drops_links() {
    let reg = registry();
    let p = product(&reg, "p");
    let i = instance(&reg, "i");
    let t = threat(&reg, "t");
    reg.create_inherits_threats_relationship(i.id, p.id).unwrap();
    reg.assign_threat_to_component(p.id, t.id).unwrap();
    let child = assignment_on(&reg, &i, &t);
    assert_eq!(links_from(&reg, child.id).len(), 1);

    reg.remove_inherits_threats_relationship(i.id, p.id).unwrap();
    assert!(reg.list_component_parents(i.id).unwrap().is_empty());
    assert_eq!(reg.list_threat_assignments_by_component(i.id).unwrap().len(), 1);
    assert!(links_from(&reg, child.id).is_empty());

    // Removing again is a no-op.
    reg.remove_inherits_threats_relationship(i.id, p.id).unwrap();
}

#[test]
fn test_deleting_inheritance_edge_by_id_drops_links() {
    let reg = registry();
    let p = product(&reg, "p");
    let i = instance(&reg, "i");
    let t = threat(&reg, "t");
    let edge = reg.create_inherits_threats_relationship(i.id, p.id).unwrap();
    reg.assign_threat_to_component(p.id, t.id).unwrap();
    let child = assignment_on(&reg, &i, &t);

    reg.delete_relationship(edge.id).unwrap();
    assert!(links_from(&reg, child.id).is_empty());
}

#[test]
fn test_deleting_parent_assignment_keeps_child() {
    let reg = registry();
    let p = product(&reg, "p");
    let i = instance(&reg, "i");
    let t = threat(&reg, "t");
    reg.create_inherits_threats_relationship(i.id, p.id).unwrap();
    let parent = reg.assign_threat_to_component(p.id, t.id).unwrap();

    reg.delete_threat_assignment(parent.id).unwrap();
    let child = assignment_on(&reg, &i, &t);
    assert!(links_from(&reg, child.id).is_empty());

    let err = reg.delete_threat_assignment(parent.id).unwrap_err();
    assert!(err.is_not_found());
}
