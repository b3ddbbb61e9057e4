//! Threat inheritance configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_TREE_DEPTH;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InheritanceConfig {
    /// Depth cap for tree paths and propagation. Default: 100.
    pub max_depth: Option<usize>,
}

impl InheritanceConfig {
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_TREE_DEPTH)
    }
}
