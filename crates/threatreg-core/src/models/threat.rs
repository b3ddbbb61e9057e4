//! Threat catalogue entries.

use serde::{Deserialize, Serialize};

use crate::types::ThreatId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threat {
    pub id: ThreatId,
    pub title: String,
    pub description: String,
}

/// A threat with the number of components on which it is still open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatWithUnresolvedCount {
    pub threat: Threat,
    pub unresolved_by_components_count: u64,
}
