//! Labeled, directed relationships between components.

use serde::{Deserialize, Serialize};

use crate::constants::INHERITS_THREATS_LABEL;
use crate::types::{ComponentId, RelationshipId};

/// `from_id --label--> to_id`. For inheritance edges `from` is the child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRelationship {
    pub id: RelationshipId,
    pub from_id: ComponentId,
    pub to_id: ComponentId,
    pub label: String,
}

impl ComponentRelationship {
    pub fn is_inheritance(&self) -> bool {
        self.label == INHERITS_THREATS_LABEL
    }
}

/// A root-to-node path through the inheritance tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTreePath {
    pub component_id: ComponentId,
    /// Root first, `component_id` last.
    pub path: Vec<ComponentId>,
    pub depth: usize,
}
