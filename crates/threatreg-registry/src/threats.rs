//! Threat CRUD and the per-domain unresolved view.

use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::models::{Threat, ThreatWithUnresolvedCount};
use threatreg_core::types::{DomainId, ThreatId};
use threatreg_storage::queries::{domains, threats};

use crate::validate;
use crate::Registry;

pub(crate) fn require_threat(conn: &rusqlite::Connection, id: ThreatId) -> RegistryResult<Threat> {
    threats::get_threat(conn, id)?.ok_or_else(|| RegistryError::not_found("threat", id))
}

impl Registry {
    pub fn create_threat(&self, title: &str, description: &str) -> RegistryResult<Threat> {
        let threat = Threat {
            id: ThreatId::new(),
            title: validate::required("title", title)?,
            description: description.to_string(),
        };
        self.db.with_writer(|conn| threats::insert_threat(conn, &threat))?;
        tracing::info!(threat_id = %threat.id, "created threat");
        Ok(threat)
    }

    pub fn get_threat(&self, id: ThreatId) -> RegistryResult<Threat> {
        self.db.with_reader(|conn| require_threat(conn, id))
    }

    pub fn update_threat(
        &self,
        id: ThreatId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> RegistryResult<Threat> {
        let title = title.map(|t| validate::required("title", t)).transpose()?;
        self.db.with_transaction(|conn| {
            let mut threat = require_threat(conn, id)?;
            if let Some(title) = title {
                threat.title = title;
            }
            if let Some(description) = description {
                threat.description = description.to_string();
            }
            threats::update_threat(conn, &threat)?;
            Ok(threat)
        })
    }

    pub fn delete_threat(&self, id: ThreatId) -> RegistryResult<()> {
        let deleted = self.db.with_writer(|conn| threats::delete_threat(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("threat", id));
        }
        tracing::info!(threat_id = %id, "deleted threat");
        Ok(())
    }

    pub fn list_threats(&self) -> RegistryResult<Vec<Threat>> {
        Ok(self.db.with_reader(threats::list_threats)?)
    }

    /// Threats still open on at least one component of the domain, with the
    /// number of such components. Ordered by title.
    pub fn list_threats_by_domain_with_unresolved_count(
        &self,
        domain_id: DomainId,
    ) -> RegistryResult<Vec<ThreatWithUnresolvedCount>> {
        self.db.with_reader(|conn| {
            if domains::get_domain(conn, domain_id)?.is_none() {
                return Err(RegistryError::not_found("domain", domain_id));
            }
            Ok(threats::list_threats_by_domain_with_unresolved_count(conn, domain_id)?)
        })
    }
}
