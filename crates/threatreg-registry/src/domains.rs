//! Domains group components; membership is a plain association.

use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::models::{Component, ComponentWithThreatStats, Domain};
use threatreg_core::types::{ComponentId, DomainId};
use threatreg_storage::queries::{components, domains};

use crate::components::require_component;
use crate::validate;
use crate::Registry;

fn require_domain(conn: &rusqlite::Connection, id: DomainId) -> RegistryResult<Domain> {
    domains::get_domain(conn, id)?.ok_or_else(|| RegistryError::not_found("domain", id))
}

impl Registry {
    pub fn create_domain(&self, name: &str, description: &str) -> RegistryResult<Domain> {
        let domain = Domain {
            id: DomainId::new(),
            name: validate::required("name", name)?,
            description: description.to_string(),
        };
        self.db.with_writer(|conn| domains::insert_domain(conn, &domain))?;
        tracing::info!(domain_id = %domain.id, "created domain");
        Ok(domain)
    }

    pub fn get_domain(&self, id: DomainId) -> RegistryResult<Domain> {
        self.db.with_reader(|conn| require_domain(conn, id))
    }

    pub fn update_domain(
        &self,
        id: DomainId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> RegistryResult<Domain> {
        let name = name.map(|n| validate::required("name", n)).transpose()?;
        self.db.with_transaction(|conn| {
            let mut domain = require_domain(conn, id)?;
            if let Some(name) = name {
                domain.name = name;
            }
            if let Some(description) = description {
                domain.description = description.to_string();
            }
            domains::update_domain(conn, &domain)?;
            Ok(domain)
        })
    }

    pub fn delete_domain(&self, id: DomainId) -> RegistryResult<()> {
        let deleted = self.db.with_writer(|conn| domains::delete_domain(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("domain", id));
        }
        Ok(())
    }

    pub fn list_domains(&self) -> RegistryResult<Vec<Domain>> {
        Ok(self.db.with_reader(domains::list_domains)?)
    }

    pub fn add_component_to_domain(
        &self,
        domain_id: DomainId,
        component_id: ComponentId,
    ) -> RegistryResult<()> {
        self.db.with_transaction(|conn| {
            require_domain(conn, domain_id)?;
            require_component(conn, component_id)?;
            domains::add_component(conn, domain_id, component_id)?;
            Ok(())
        })
    }

    /// No-op when the component is not a member.
    pub fn remove_component_from_domain(
        &self,
        domain_id: DomainId,
        component_id: ComponentId,
    ) -> RegistryResult<()> {
        self.db
            .with_writer(|conn| domains::remove_component(conn, domain_id, component_id))?;
        Ok(())
    }

    pub fn list_components_by_domain(&self, domain_id: DomainId) -> RegistryResult<Vec<Component>> {
        self.db.with_reader(|conn| {
            require_domain(conn, domain_id)?;
            Ok(domains::list_components_by_domain(conn, domain_id)?)
        })
    }

    pub fn list_domains_by_component(
        &self,
        component_id: ComponentId,
    ) -> RegistryResult<Vec<Domain>> {
        self.db.with_reader(|conn| {
            require_component(conn, component_id)?;
            Ok(domains::list_domains_by_component(conn, component_id)?)
        })
    }

    pub fn list_components_by_domain_with_threat_stats(
        &self,
        domain_id: DomainId,
    ) -> RegistryResult<Vec<ComponentWithThreatStats>> {
        self.db.with_reader(|conn| {
            require_domain(conn, domain_id)?;
            Ok(components::list_components_with_threat_stats(conn, domain_id)?)
        })
    }
}
