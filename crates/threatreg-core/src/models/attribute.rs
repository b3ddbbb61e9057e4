//! Typed key/value attributes on components.

use serde::{Deserialize, Serialize};

use crate::types::{AttributeId, AttributeType, ComponentId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAttribute {
    pub id: AttributeId,
    pub component_id: ComponentId,
    pub name: String,
    pub attribute_type: AttributeType,
    pub value: String,
}
