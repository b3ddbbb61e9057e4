//! RegistryEventHandler trait with no-op defaults.

use super::types::*;

/// Trait for observing registry mutations.
///
/// All methods have no-op default implementations, so handlers only need
/// to override the events they care about.
pub trait RegistryEventHandler: Send + Sync {
    // ---- Components ----
    fn on_component_created(&self, _event: &ComponentCreatedEvent) {}
    fn on_component_deleted(&self, _event: &ComponentDeletedEvent) {}

    // ---- Threat assignments ----
    fn on_threat_assigned(&self, _event: &ThreatAssignedEvent) {}
    fn on_severity_changed(&self, _event: &SeverityChangedEvent) {}
    fn on_threat_inherited(&self, _event: &ThreatInheritedEvent) {}

    // ---- Resolutions ----
    fn on_resolution_changed(&self, _event: &ResolutionChangedEvent) {}
    fn on_delegation_created(&self, _event: &DelegationCreatedEvent) {}

    // ---- Patterns ----
    fn on_pattern_matched(&self, _event: &PatternMatchedEvent) {}
}
