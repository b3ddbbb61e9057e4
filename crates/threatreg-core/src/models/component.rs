//! Components: products and their deployed instances.

use serde::{Deserialize, Serialize};

use crate::types::{ComponentId, ComponentType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub description: String,
    pub component_type: ComponentType,
}

/// A component plus the number of threats still open on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentWithThreatStats {
    pub component: Component,
    pub unresolved_threat_count: u64,
}
