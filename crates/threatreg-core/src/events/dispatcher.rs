//! EventDispatcher: synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::RegistryEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// When no handlers are registered, `emit` iterates over an empty Vec.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn RegistryEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn RegistryEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// A panicking handler is logged and does not stop the others.
    fn emit<F: Fn(&dyn RegistryEventHandler)>(&self, event_name: &'static str, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::error!(event = event_name, "event handler panicked");
            }
        }
    }

    // ---- Components ----
    pub fn emit_component_created(&self, event: &ComponentCreatedEvent) {
        self.emit("component_created", |h| h.on_component_created(event));
    }

    pub fn emit_component_deleted(&self, event: &ComponentDeletedEvent) {
        self.emit("component_deleted", |h| h.on_component_deleted(event));
    }

    // ---- Threat assignments ----
    pub fn emit_threat_assigned(&self, event: &ThreatAssignedEvent) {
        self.emit("threat_assigned", |h| h.on_threat_assigned(event));
    }

    pub fn emit_severity_changed(&self, event: &SeverityChangedEvent) {
        self.emit("severity_changed", |h| h.on_severity_changed(event));
    }

    pub fn emit_threat_inherited(&self, event: &ThreatInheritedEvent) {
        self.emit("threat_inherited", |h| h.on_threat_inherited(event));
    }

    // ---- Resolutions ----
    pub fn emit_resolution_changed(&self, event: &ResolutionChangedEvent) {
        self.emit("resolution_changed", |h| h.on_resolution_changed(event));
    }

    pub fn emit_delegation_created(&self, event: &DelegationCreatedEvent) {
        self.emit("delegation_created", |h| h.on_delegation_created(event));
    }

    // ---- Patterns ----
    pub fn emit_pattern_matched(&self, event: &PatternMatchedEvent) {
        self.emit("pattern_matched", |h| h.on_pattern_matched(event));
    }
}
