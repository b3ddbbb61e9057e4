//! Domains group components (e.g. "payments", "identity").

use serde::{Deserialize, Serialize};

use crate::types::DomainId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: DomainId,
    pub name: String,
    pub description: String,
}
