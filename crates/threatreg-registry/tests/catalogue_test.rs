//! Components, threats, controls, domains, tags and attributes.

use threatreg_core::errors::{RegistryError, ValidationError};
use threatreg_core::types::{
    AttributeType, ComponentId, ComponentType, ControlId, DomainId, ResolutionStatus, TagId,
    ThreatId,
};
use threatreg_registry::Registry;

fn registry() -> Registry {
    Registry::open_in_memory().unwrap()
}

// ---- components ----

#[test]
fn test_component_crud() {
    let reg = registry();
    let c = reg
        .create_component("Payments API", "card processing", ComponentType::Instance)
        .unwrap();
    assert_eq!(reg.get_component(c.id).unwrap(), c);

    let updated = reg.update_component(c.id, Some("Payments"), None).unwrap();
    assert_eq!(updated.name, "Payments");
    assert_eq!(updated.description, "card processing");
    assert_eq!(updated.component_type, ComponentType::Instance);

    reg.delete_component(c.id).unwrap();
    assert!(reg.get_component(c.id).unwrap_err().is_not_found());
    assert!(reg.delete_component(c.id).unwrap_err().is_not_found());
}

#[test]
fn test_component_name_required() {
    let reg = registry();
    let err = reg
        .create_component("   ", "", ComponentType::Product)
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::Required { field: "name" })
    ));
    let c = reg.create_component("x", "", ComponentType::Product).unwrap();
    assert!(reg.update_component(c.id, Some(""), None).is_err());
    assert!(reg
        .update_component(ComponentId::new(), None, Some("d"))
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_list_and_filter_components() {
    let reg = registry();
    reg.create_component("Postgres", "", ComponentType::Product).unwrap();
    reg.create_component("postgres-primary", "", ComponentType::Instance)
        .unwrap();
    reg.create_component("redis", "", ComponentType::Product).unwrap();

    assert_eq!(reg.list_components().unwrap().len(), 3);
    assert_eq!(
        reg.list_components_by_type(ComponentType::Product).unwrap().len(),
        2
    );
    let names: Vec<_> = reg
        .filter_components("POSTGRES")
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Postgres", "postgres-primary"]);
    assert!(reg.filter_components("mysql").unwrap().is_empty());
}

#[test]
fn test_deleting_component_cascades() {
    let reg = registry();
    let c = reg.create_component("c", "", ComponentType::Instance).unwrap();
    let t = reg.create_threat("t", "").unwrap();
    let d = reg.create_domain("d", "").unwrap();
    let tag = reg.assign_tag_to_component_by_name(c.id, "prod").unwrap();
    reg.assign_threat_to_component(c.id, t.id).unwrap();
    reg.add_component_to_domain(d.id, c.id).unwrap();
    reg.create_attribute(c.id, "owner", AttributeType::String, "team-a")
        .unwrap();

    reg.delete_component(c.id).unwrap();
    assert!(reg.list_components_by_domain(d.id).unwrap().is_empty());
    assert!(reg.list_components_by_tag(tag.id).unwrap().is_empty());
    assert!(reg.find_components_by_attribute("owner", "team-a").unwrap().is_empty());
    assert!(reg.get_threat(t.id).is_ok());
}

// ---- threats ----

#[test]
fn test_threat_crud() {
    let reg = registry();
    let t = reg.create_threat("XSS", "script injection").unwrap();
    let updated = reg.update_threat(t.id, None, Some("stored XSS")).unwrap();
    assert_eq!(updated.title, "XSS");
    assert_eq!(updated.description, "stored XSS");
    assert_eq!(reg.list_threats().unwrap(), vec![updated]);

    reg.delete_threat(t.id).unwrap();
    assert!(reg.delete_threat(t.id).unwrap_err().is_not_found());
    assert!(reg.create_threat("", "").is_err());
}

#[test]
fn test_assignment_needs_component_and_threat() {
    let reg = registry();
    let c = reg.create_component("c", "", ComponentType::Instance).unwrap();
    let t = reg.create_threat("t", "").unwrap();
    assert!(reg
        .assign_threat_to_component(ComponentId::new(), t.id)
        .unwrap_err()
        .is_not_found());
    assert!(reg
        .assign_threat_to_component(c.id, ThreatId::new())
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_threats_by_domain_count_unresolved_components() {
    let reg = registry();
    let d = reg.create_domain("payments", "").unwrap();
    let a = reg.create_component("a", "", ComponentType::Instance).unwrap();
    let b = reg.create_component("b", "", ComponentType::Instance).unwrap();
    let outside = reg.create_component("z", "", ComponentType::Instance).unwrap();
    reg.add_component_to_domain(d.id, a.id).unwrap();
    reg.add_component_to_domain(d.id, b.id).unwrap();

    let open = reg.create_threat("Open", "").unwrap();
    let closed = reg.create_threat("Closed", "").unwrap();
    for c in [&a, &b, &outside] {
        reg.assign_threat_to_component(c.id, open.id).unwrap();
    }
    let on_a = reg.assign_threat_to_component(a.id, closed.id).unwrap();
    reg.create_resolution(on_a.id, a.id, ResolutionStatus::Resolved, "")
        .unwrap();

    let rows = reg.list_threats_by_domain_with_unresolved_count(d.id).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].threat.id, open.id);
    assert_eq!(rows[0].unresolved_by_components_count, 2);

    let stats = reg.list_components_by_domain_with_threat_stats(d.id).unwrap();
    let counts: Vec<_> = stats
        .iter()
        .map(|s| (s.component.name.as_str(), s.unresolved_threat_count))
        .collect();
    assert_eq!(counts, vec![("a", 1), ("b", 1)]);

    assert!(reg
        .list_threats_by_domain_with_unresolved_count(DomainId::new())
        .unwrap_err()
        .is_not_found());
}

// ---- controls ----

#[test]
fn test_control_links() {
    let reg = registry();
    let t = reg.create_threat("Brute force", "").unwrap();
    let mfa = reg.create_control("MFA", "").unwrap();
    let rate = reg.create_control("Rate limiting", "").unwrap();

    let first = reg.link_control_to_threat(t.id, mfa.id).unwrap();
    let again = reg.link_control_to_threat(t.id, mfa.id).unwrap();
    assert_eq!(first.id, again.id);
    reg.link_control_to_threat(t.id, rate.id).unwrap();
    assert_eq!(reg.list_controls_by_threat(t.id).unwrap().len(), 2);

    reg.unlink_control_from_threat(t.id, rate.id).unwrap();
    reg.unlink_control_from_threat(t.id, rate.id).unwrap();
    assert_eq!(reg.list_controls_by_threat(t.id).unwrap(), vec![mfa.clone()]);

    let c = reg.create_component("login", "", ComponentType::Instance).unwrap();
    let a = reg.assign_threat_to_component(c.id, t.id).unwrap();
    reg.assign_control_to_threat_assignment(a.id, mfa.id).unwrap();
    reg.assign_control_to_threat_assignment(a.id, mfa.id).unwrap();
    assert_eq!(reg.list_controls_by_threat_assignment(a.id).unwrap(), vec![mfa.clone()]);
    reg.unassign_control(a.id, mfa.id).unwrap();
    assert!(reg.list_controls_by_threat_assignment(a.id).unwrap().is_empty());

    assert!(reg
        .link_control_to_threat(t.id, ControlId::new())
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_control_crud() {
    let reg = registry();
    let c = reg.create_control("WAF", "").unwrap();
    let updated = reg.update_control(c.id, Some("Web application firewall"), None).unwrap();
    assert_eq!(reg.get_control(c.id).unwrap(), updated);
    assert_eq!(reg.list_controls().unwrap().len(), 1);
    reg.delete_control(c.id).unwrap();
    assert!(reg.get_control(c.id).unwrap_err().is_not_found());
}

// ---- domains ----

#[test]
fn test_domain_membership() {
    let reg = registry();
    let d = reg.create_domain("checkout", "").unwrap();
    let c = reg.create_component("cart", "", ComponentType::Instance).unwrap();

    reg.add_component_to_domain(d.id, c.id).unwrap();
    reg.add_component_to_domain(d.id, c.id).unwrap();
    assert_eq!(reg.list_components_by_domain(d.id).unwrap(), vec![c.clone()]);
    assert_eq!(reg.list_domains_by_component(c.id).unwrap(), vec![d.clone()]);

    reg.remove_component_from_domain(d.id, c.id).unwrap();
    reg.remove_component_from_domain(d.id, c.id).unwrap();
    assert!(reg.list_components_by_domain(d.id).unwrap().is_empty());

    let renamed = reg.update_domain(d.id, Some("checkout-v2"), None).unwrap();
    assert_eq!(reg.list_domains().unwrap(), vec![renamed]);
    reg.delete_domain(d.id).unwrap();
    assert!(reg.delete_domain(d.id).unwrap_err().is_not_found());
}

// ---- tags ----

#[test]
fn test_tag_crud_and_unique_names() {
    let reg = registry();
    let pii = reg.create_tag("pii", "personal data", "#FF0000").unwrap();
    let err = reg.create_tag("pii", "", "").unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }));
    let err = reg.create_tag("internal", "", "blue").unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Validation(ValidationError::InvalidColor { .. })
    ));

    let public = reg.create_tag("public", "", "").unwrap();
    assert!(reg.update_tag(public.id, Some("pii"), None, None).is_err());
    let recolored = reg.update_tag(pii.id, None, None, Some("#00FF00")).unwrap();
    assert_eq!(recolored.color, "#00FF00");
    assert_eq!(reg.get_tag_by_name("pii").unwrap(), recolored);

    reg.delete_tag(public.id).unwrap();
    assert_eq!(reg.list_tags().unwrap(), vec![recolored]);
    assert!(reg.get_tag(TagId::new()).unwrap_err().is_not_found());
}

#[test]
fn test_tag_assignment() {
    let reg = registry();
    let c = reg.create_component("c", "", ComponentType::Instance).unwrap();
    let tag = reg.create_tag("prod", "", "").unwrap();

    reg.assign_tag_to_component(c.id, tag.id).unwrap();
    reg.assign_tag_to_component(c.id, tag.id).unwrap();
    let by_name = reg.assign_tag_to_component_by_name(c.id, "pci").unwrap();
    assert_eq!(reg.get_tag_by_name("pci").unwrap().id, by_name.id);
    let existing = reg.assign_tag_to_component_by_name(c.id, "prod").unwrap();
    assert_eq!(existing.id, tag.id);

    assert_eq!(reg.list_tags_by_component(c.id).unwrap().len(), 2);
    assert_eq!(reg.list_components_by_tag(tag.id).unwrap(), vec![c.clone()]);

    reg.unassign_tag_from_component(c.id, tag.id).unwrap();
    reg.unassign_tag_from_component(c.id, tag.id).unwrap();
    assert_eq!(reg.list_tags_by_component(c.id).unwrap(), vec![by_name]);
}

// ---- attributes ----

#[test]
fn test_attribute_crud() {
    let reg = registry();
    let c = reg.create_component("c", "", ComponentType::Instance).unwrap();
    let attr = reg
        .create_attribute(c.id, "replicas", AttributeType::Number, "3")
        .unwrap();
    let err = reg
        .create_attribute(c.id, "replicas", AttributeType::Number, "4")
        .unwrap_err();
    assert!(matches!(err, RegistryError::AlreadyExists { .. }));

    let updated = reg.update_attribute(attr.id, None, None, Some("5")).unwrap();
    assert_eq!(updated.value, "5");
    assert!(reg
        .update_attribute(attr.id, None, None, Some("five"))
        .is_err());
    assert_eq!(reg.get_attribute(attr.id).unwrap().value, "5");
    assert_eq!(reg.get_attribute_by_name(c.id, "replicas").unwrap(), updated);
    assert_eq!(reg.list_attributes_by_component(c.id).unwrap().len(), 1);

    reg.delete_attribute(attr.id).unwrap();
    assert!(reg.delete_attribute(attr.id).unwrap_err().is_not_found());
}

#[test]
fn test_attribute_values_validated() {
    let reg = registry();
    let c = reg.create_component("c", "", ComponentType::Instance).unwrap();
    let other = reg.create_component("other", "", ComponentType::Instance).unwrap();

    assert!(matches!(
        reg.create_attribute(c.id, "n", AttributeType::Number, "lots")
            .unwrap_err(),
        RegistryError::Validation(ValidationError::InvalidAttributeValue { .. })
    ));
    assert!(reg
        .create_attribute(c.id, "peer", AttributeType::Component, &ComponentId::new().to_string())
        .unwrap_err()
        .is_not_found());
    reg.create_attribute(c.id, "peer", AttributeType::Component, &other.id.to_string())
        .unwrap();
}

#[test]
fn test_attribute_lookup_and_upsert() {
    let reg = registry();
    let a = reg.create_component("a", "", ComponentType::Instance).unwrap();
    let b = reg.create_component("b", "", ComponentType::Instance).unwrap();
    reg.set_component_attribute(a.id, "tier", AttributeType::String, "gold")
        .unwrap();
    reg.set_component_attribute(b.id, "tier", AttributeType::String, "silver")
        .unwrap();
    let upserted = reg
        .set_component_attribute(b.id, "tier", AttributeType::Text, "gold")
        .unwrap();
    assert_eq!(upserted.attribute_type, AttributeType::Text);
    assert_eq!(reg.list_attributes_by_component(b.id).unwrap().len(), 1);

    assert_eq!(reg.find_components_by_attribute("tier", "gold").unwrap().len(), 2);
    assert_eq!(
        reg.find_components_by_attribute_and_type("tier", AttributeType::Text)
            .unwrap(),
        vec![b.clone()]
    );
    assert!(reg.has_attribute(a.id, "tier").unwrap());
    assert!(!reg.has_attribute(a.id, "region").unwrap());
    assert!(reg.has_attribute_with_value(a.id, "tier", "gold").unwrap());
    assert!(!reg.has_attribute_with_value(a.id, "tier", "silver").unwrap());

    reg.delete_attribute_by_name(a.id, "tier").unwrap();
    assert!(reg
        .delete_attribute_by_name(a.id, "tier")
        .unwrap_err()
        .is_not_found());
}
