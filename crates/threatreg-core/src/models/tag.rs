//! Free-form labels attached to components.

use serde::{Deserialize, Serialize};

use crate::types::TagId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub description: String,
    /// `#RRGGBB`, empty when unset.
    pub color: String,
}
