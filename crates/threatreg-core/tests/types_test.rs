//! Tests for typed ids, severity and the persisted enumerations.

use proptest::prelude::*;
use threatreg_core::models::ThreatAssignment;
use threatreg_core::types::*;

#[test]
fn test_severity_ordering_matches_levels() {
    let all = ThreatSeverity::all();
    for window in all.windows(2) {
        assert!(window[0].less(&window[1]));
        assert!(window[1].greater(&window[0]));
        assert!(window[0].as_int() + 1 == window[1].as_int());
    }
    assert!(ThreatSeverity::High.less_or_equal(&ThreatSeverity::High));
    assert!(ThreatSeverity::High.greater_or_equal(&ThreatSeverity::Medium));
}

#[test]
fn test_ids_parse_and_display() {
    let id = ComponentId::new();
    let parsed: ComponentId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
    assert!("not-a-uuid".parse::<ThreatId>().is_err());
    assert!(ComponentId::nil().is_nil());
}

#[test]
fn test_enumerations_parse() {
    assert_eq!("product".parse::<ComponentType>().unwrap(), ComponentType::Product);
    assert!("service".parse::<ComponentType>().is_err());
    assert_eq!("number".parse::<AttributeType>().unwrap(), AttributeType::Number);
    assert!("accepted".parse::<ResolutionStatus>().unwrap().is_closed());
    assert!(!ResolutionStatus::Awaiting.is_closed());
    assert_eq!(
        "RELATIONSHIP_TARGET_TAG".parse::<ConditionType>().unwrap(),
        ConditionType::RelationshipTargetTag
    );
    assert_eq!(
        "invalid condition_type: tag",
        "tag".parse::<ConditionType>().unwrap_err().to_string()
    );
    assert_eq!(
        "NOT_HAS_RELATIONSHIP_WITH".parse::<PatternOperator>().unwrap(),
        PatternOperator::NotHasRelationshipWith
    );
}

#[test]
fn test_condition_requirements() {
    assert!(ConditionType::Relationship.requires_relationship_type());
    assert!(!ConditionType::Relationship.requires_value());
    assert!(ConditionType::Tag.requires_value());
    assert!(!ConditionType::Tag.requires_relationship_type());
    assert!(PatternOperator::NotExists.is_existence_check());
}

fn assignment(
    severity: Option<ThreatSeverity>,
    residual: Option<ThreatSeverity>,
) -> ThreatAssignment {
    ThreatAssignment {
        id: AssignmentId::new(),
        threat_id: ThreatId::new(),
        component_id: ComponentId::new(),
        severity,
        residual_severity: residual,
    }
}

#[test]
fn test_derived_residual_follows_until_overridden() {
    let unset = assignment(None, None);
    assert_eq!(
        unset.derived_residual(Some(ThreatSeverity::Low)),
        Some(ThreatSeverity::Low)
    );

    let tracking = assignment(Some(ThreatSeverity::Low), Some(ThreatSeverity::Low));
    assert_eq!(
        tracking.derived_residual(Some(ThreatSeverity::High)),
        Some(ThreatSeverity::High)
    );

    let overridden = assignment(Some(ThreatSeverity::Critical), Some(ThreatSeverity::Low));
    assert_eq!(
        overridden.derived_residual(Some(ThreatSeverity::High)),
        Some(ThreatSeverity::Low)
    );
}

fn severity_strategy() -> impl Strategy<Value = ThreatSeverity> {
    (0i64..=4).prop_map(|level| ThreatSeverity::from_int(level).unwrap())
}

proptest! {
    #[test]
    fn test_severity_text_round_trips_in_any_case(sev in severity_strategy(), upper in any::<bool>()) {
        let text = if upper { sev.as_str().to_uppercase() } else { sev.as_str().to_string() };
        let padded = format!("  {text}\t");
        prop_assert_eq!(padded.parse::<ThreatSeverity>().unwrap(), sev);
    }

    #[test]
    fn test_severity_order_agrees_with_levels(a in severity_strategy(), b in severity_strategy()) {
        prop_assert_eq!(a.less(&b), a.as_int() < b.as_int());
        prop_assert_eq!(a.greater_or_equal(&b), a.as_int() >= b.as_int());
    }

    #[test]
    fn test_unknown_severity_text_is_rejected(s in "[a-z]{1,12}") {
        prop_assume!(!["none", "low", "medium", "high", "critical"].contains(&s.as_str()));
        prop_assert!(s.parse::<ThreatSeverity>().is_err());
    }
}
