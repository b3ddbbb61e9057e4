//! Tests for the registry event system.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use threatreg_core::events::dispatcher::EventDispatcher;
use threatreg_core::events::handler::RegistryEventHandler;
use threatreg_core::events::types::*;
use threatreg_core::types::{
    AssignmentId, ComponentId, ComponentType, ThreatId, ThreatSeverity,
};

/// A test handler that counts events.
struct CountingHandler {
    created: AtomicUsize,
    assigned: AtomicUsize,
    inherited: AtomicUsize,
}

impl CountingHandler {
    fn new() -> Self {
        Self {
            created: AtomicUsize::new(0),
            assigned: AtomicUsize::new(0),
            inherited: AtomicUsize::new(0),
        }
    }
}

impl RegistryEventHandler for CountingHandler {
    fn on_component_created(&self, _event: &ComponentCreatedEvent) {
        self.created.fetch_add(1, Ordering::Relaxed);
    }

    fn on_threat_assigned(&self, _event: &ThreatAssignedEvent) {
        self.assigned.fetch_add(1, Ordering::Relaxed);
    }

    fn on_threat_inherited(&self, _event: &ThreatInheritedEvent) {
        self.inherited.fetch_add(1, Ordering::Relaxed);
    }
}

struct PanickingHandler;

impl RegistryEventHandler for PanickingHandler {
    fn on_component_created(&self, _event: &ComponentCreatedEvent) {
        panic!("handler failure");
    }
}

fn created_event() -> ComponentCreatedEvent {
    ComponentCreatedEvent {
        component_id: ComponentId::new(),
        component_type: ComponentType::Product,
    }
}

#[test]
fn test_handler_noop_defaults() {
    struct NoopHandler;
    impl RegistryEventHandler for NoopHandler {}

    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(Arc::new(NoopHandler));
    dispatcher.emit_component_created(&created_event());
    assert_eq!(dispatcher.handler_count(), 1);
}

#[test]
fn test_dispatch_reaches_every_handler() {
    let first = Arc::new(CountingHandler::new());
    let second = Arc::new(CountingHandler::new());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(first.clone());
    dispatcher.register(second.clone());

    dispatcher.emit_component_created(&created_event());
    dispatcher.emit_threat_assigned(&ThreatAssignedEvent {
        assignment_id: AssignmentId::new(),
        threat_id: ThreatId::new(),
        component_id: ComponentId::new(),
    });
    dispatcher.emit_threat_inherited(&ThreatInheritedEvent {
        parent_assignment_id: AssignmentId::new(),
        child_assignment_id: AssignmentId::new(),
        child_component_id: ComponentId::new(),
        severity: Some(ThreatSeverity::High),
        created: true,
    });

    for handler in [&first, &second] {
        assert_eq!(handler.created.load(Ordering::Relaxed), 1);
        assert_eq!(handler.assigned.load(Ordering::Relaxed), 1);
        assert_eq!(handler.inherited.load(Ordering::Relaxed), 1);
    }
}

#[test]
fn test_panicking_handler_does_not_block_others() {
    let counter = Arc::new(CountingHandler::new());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.register(Arc::new(PanickingHandler));
    dispatcher.register(counter.clone());

    dispatcher.emit_component_created(&created_event());

    assert_eq!(counter.created.load(Ordering::Relaxed), 1);
}

#[test]
fn test_empty_dispatcher_is_a_no_op() {
    let dispatcher = EventDispatcher::default();
    dispatcher.emit_component_created(&created_event());
    assert_eq!(dispatcher.handler_count(), 0);
}
