//! Typed name/value attributes on components.

use rusqlite::Connection;
use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::models::{Component, ComponentAttribute};
use threatreg_core::types::{AttributeId, AttributeType, ComponentId};
use threatreg_storage::queries::{attributes, components};

use crate::components::require_component;
use crate::validate;
use crate::Registry;

fn require_attribute(conn: &Connection, id: AttributeId) -> RegistryResult<ComponentAttribute> {
    attributes::get_attribute(conn, id)?
        .ok_or_else(|| RegistryError::not_found("component attribute", id))
}

/// Value checks that need the database: a `component` value must name an
/// existing component.
fn check_value(
    conn: &Connection,
    attribute_type: AttributeType,
    value: &str,
) -> RegistryResult<String> {
    if let Some(target) = validate::attribute_value(attribute_type, value)? {
        if !components::component_exists(conn, target)? {
            return Err(RegistryError::not_found("component", target));
        }
    }
    Ok(value.trim().to_string())
}

impl Registry {
    pub fn create_attribute(
        &self,
        component_id: ComponentId,
        name: &str,
        attribute_type: AttributeType,
        value: &str,
    ) -> RegistryResult<ComponentAttribute> {
        let name = validate::required("name", name)?;
        self.db.with_transaction(|conn| {
            require_component(conn, component_id)?;
            let value = check_value(conn, attribute_type, value)?;
            if attributes::get_attribute_by_name(conn, component_id, &name)?.is_some() {
                return Err(RegistryError::AlreadyExists {
                    entity: "component attribute",
                    detail: format!("'{name}' on component {component_id}"),
                });
            }
            let attr = ComponentAttribute {
                id: AttributeId::new(),
                component_id,
                name,
                attribute_type,
                value,
            };
            attributes::insert_attribute(conn, &attr)?;
            Ok(attr)
        })
    }

    pub fn get_attribute(&self, id: AttributeId) -> RegistryResult<ComponentAttribute> {
        self.db.with_reader(|conn| require_attribute(conn, id))
    }

    /// Change any of name, type and value. The resulting type/value pair is
    /// validated as a whole.
    pub fn update_attribute(
        &self,
        id: AttributeId,
        name: Option<&str>,
        attribute_type: Option<AttributeType>,
        value: Option<&str>,
    ) -> RegistryResult<ComponentAttribute> {
        let name = name.map(|n| validate::required("name", n)).transpose()?;
        self.db.with_transaction(|conn| {
            let mut attr = require_attribute(conn, id)?;
            if let Some(name) = name {
                if name != attr.name
                    && attributes::get_attribute_by_name(conn, attr.component_id, &name)?.is_some()
                {
                    return Err(RegistryError::AlreadyExists {
                        entity: "component attribute",
                        detail: format!("'{name}' on component {}", attr.component_id),
                    });
                }
                attr.name = name;
            }
            if let Some(attribute_type) = attribute_type {
                attr.attribute_type = attribute_type;
            }
            let value = value.unwrap_or(&attr.value).to_string();
            attr.value = check_value(conn, attr.attribute_type, &value)?;
            attributes::update_attribute(conn, &attr)?;
            Ok(attr)
        })
    }

    pub fn delete_attribute(&self, id: AttributeId) -> RegistryResult<()> {
        let deleted = self
            .db
            .with_writer(|conn| attributes::delete_attribute(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("component attribute", id));
        }
        Ok(())
    }

    pub fn list_attributes_by_component(
        &self,
        component_id: ComponentId,
    ) -> RegistryResult<Vec<ComponentAttribute>> {
        self.db.with_reader(|conn| {
            require_component(conn, component_id)?;
            Ok(attributes::list_attributes_by_component(conn, component_id)?)
        })
    }

    pub fn get_attribute_by_name(
        &self,
        component_id: ComponentId,
        name: &str,
    ) -> RegistryResult<ComponentAttribute> {
        self.db.with_reader(|conn| {
            attributes::get_attribute_by_name(conn, component_id, name)?
                .ok_or_else(|| RegistryError::not_found("component attribute", name))
        })
    }

    pub fn find_components_by_attribute(
        &self,
        name: &str,
        value: &str,
    ) -> RegistryResult<Vec<Component>> {
        Ok(self
            .db
            .with_reader(|conn| attributes::find_components_by_attribute(conn, name, value))?)
    }

    pub fn find_components_by_attribute_and_type(
        &self,
        name: &str,
        attribute_type: AttributeType,
    ) -> RegistryResult<Vec<Component>> {
        Ok(self.db.with_reader(|conn| {
            attributes::find_components_by_attribute_and_type(conn, name, attribute_type)
        })?)
    }

    pub fn has_attribute(&self, component_id: ComponentId, name: &str) -> RegistryResult<bool> {
        Ok(self
            .db
            .with_reader(|conn| attributes::get_attribute_by_name(conn, component_id, name))?
            .is_some())
    }

    pub fn has_attribute_with_value(
        &self,
        component_id: ComponentId,
        name: &str,
        value: &str,
    ) -> RegistryResult<bool> {
        Ok(self
            .db
            .with_reader(|conn| attributes::get_attribute_by_name(conn, component_id, name))?
            .is_some_and(|attr| attr.value == value))
    }

    pub fn delete_attribute_by_name(
        &self,
        component_id: ComponentId,
        name: &str,
    ) -> RegistryResult<()> {
        let deleted = self
            .db
            .with_writer(|conn| attributes::delete_attribute_by_name(conn, component_id, name))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("component attribute", name));
        }
        Ok(())
    }

    /// Insert or overwrite the attribute called `name` on the component.
    pub fn set_component_attribute(
        &self,
        component_id: ComponentId,
        name: &str,
        attribute_type: AttributeType,
        value: &str,
    ) -> RegistryResult<ComponentAttribute> {
        let name = validate::required("name", name)?;
        self.db.with_transaction(|conn| {
            require_component(conn, component_id)?;
            let value = check_value(conn, attribute_type, value)?;
            match attributes::get_attribute_by_name(conn, component_id, &name)? {
                Some(mut attr) => {
                    attr.attribute_type = attribute_type;
                    attr.value = value;
                    attributes::update_attribute(conn, &attr)?;
                    Ok(attr)
                }
                None => {
                    let attr = ComponentAttribute {
                        id: AttributeId::new(),
                        component_id,
                        name,
                        attribute_type,
                        value,
                    };
                    attributes::insert_attribute(conn, &attr)?;
                    Ok(attr)
                }
            }
        })
    }
}
