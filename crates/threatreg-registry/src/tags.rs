//! Tags: uniquely named labels attached to components.

use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::models::{Component, Tag};
use threatreg_core::types::{ComponentId, TagId};
use threatreg_storage::queries::tags;

use crate::components::require_component;
use crate::validate;
use crate::Registry;

fn require_tag(conn: &rusqlite::Connection, id: TagId) -> RegistryResult<Tag> {
    tags::get_tag(conn, id)?.ok_or_else(|| RegistryError::not_found("tag", id))
}

fn ensure_name_free(
    conn: &rusqlite::Connection,
    name: &str,
    except: Option<TagId>,
) -> RegistryResult<()> {
    match tags::get_tag_by_name(conn, name)? {
        Some(existing) if Some(existing.id) != except => Err(RegistryError::AlreadyExists {
            entity: "tag",
            detail: format!("name '{name}'"),
        }),
        _ => Ok(()),
    }
}

impl Registry {
    /// `color` is empty or `#RRGGBB`.
    pub fn create_tag(&self, name: &str, description: &str, color: &str) -> RegistryResult<Tag> {
        let tag = Tag {
            id: TagId::new(),
            name: validate::required("name", name)?,
            description: description.to_string(),
            color: validate::color(color)?,
        };
        self.db.with_transaction(|conn| {
            ensure_name_free(conn, &tag.name, None)?;
            tags::insert_tag(conn, &tag)?;
            Ok::<_, RegistryError>(())
        })?;
        tracing::info!(tag_id = %tag.id, name = %tag.name, "created tag");
        Ok(tag)
    }

    pub fn get_tag(&self, id: TagId) -> RegistryResult<Tag> {
        self.db.with_reader(|conn| require_tag(conn, id))
    }

    pub fn get_tag_by_name(&self, name: &str) -> RegistryResult<Tag> {
        self.db.with_reader(|conn| {
            tags::get_tag_by_name(conn, name)?.ok_or_else(|| RegistryError::not_found("tag", name))
        })
    }

    pub fn update_tag(
        &self,
        id: TagId,
        name: Option<&str>,
        description: Option<&str>,
        color: Option<&str>,
    ) -> RegistryResult<Tag> {
        let name = name.map(|n| validate::required("name", n)).transpose()?;
        let color = color.map(validate::color).transpose()?;
        self.db.with_transaction(|conn| {
            let mut tag = require_tag(conn, id)?;
            if let Some(name) = name {
                ensure_name_free(conn, &name, Some(id))?;
                tag.name = name;
            }
            if let Some(description) = description {
                tag.description = description.to_string();
            }
            if let Some(color) = color {
                tag.color = color;
            }
            tags::update_tag(conn, &tag)?;
            Ok(tag)
        })
    }

    pub fn delete_tag(&self, id: TagId) -> RegistryResult<()> {
        let deleted = self.db.with_writer(|conn| tags::delete_tag(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("tag", id));
        }
        Ok(())
    }

    pub fn list_tags(&self) -> RegistryResult<Vec<Tag>> {
        Ok(self.db.with_reader(tags::list_tags)?)
    }

    pub fn list_tags_by_component(&self, component_id: ComponentId) -> RegistryResult<Vec<Tag>> {
        self.db.with_reader(|conn| {
            require_component(conn, component_id)?;
            Ok(tags::list_tags_by_component(conn, component_id)?)
        })
    }

    /// Idempotent.
    pub fn assign_tag_to_component(
        &self,
        component_id: ComponentId,
        tag_id: TagId,
    ) -> RegistryResult<()> {
        self.db.with_transaction(|conn| {
            require_component(conn, component_id)?;
            require_tag(conn, tag_id)?;
            tags::assign_tag(conn, component_id, tag_id)?;
            Ok(())
        })
    }

    /// Attach the tag called `name`, creating it first if it does not exist.
    pub fn assign_tag_to_component_by_name(
        &self,
        component_id: ComponentId,
        name: &str,
    ) -> RegistryResult<Tag> {
        let name = validate::required("name", name)?;
        self.db.with_transaction(|conn| {
            require_component(conn, component_id)?;
            let tag = match tags::get_tag_by_name(conn, &name)? {
                Some(tag) => tag,
                None => {
                    let tag = Tag {
                        id: TagId::new(),
                        name: name.clone(),
                        description: String::new(),
                        color: String::new(),
                    };
                    tags::insert_tag(conn, &tag)?;
                    tracing::debug!(tag_id = %tag.id, name = %tag.name, "created tag on assign");
                    tag
                }
            };
            tags::assign_tag(conn, component_id, tag.id)?;
            Ok(tag)
        })
    }

    /// No-op when the tag is not attached.
    pub fn unassign_tag_from_component(
        &self,
        component_id: ComponentId,
        tag_id: TagId,
    ) -> RegistryResult<()> {
        self.db
            .with_writer(|conn| tags::unassign_tag(conn, component_id, tag_id))?;
        Ok(())
    }

    pub fn list_components_by_tag(&self, tag_id: TagId) -> RegistryResult<Vec<Component>> {
        self.db.with_reader(|conn| {
            require_tag(conn, tag_id)?;
            Ok(tags::list_components_by_tag(conn, tag_id)?)
        })
    }
}
