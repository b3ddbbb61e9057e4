//! In-memory snapshot of everything pattern evaluation reads.

use rusqlite::Connection;
use threatreg_core::constants::INHERITS_THREATS_LABEL;
use threatreg_core::errors::StorageError;
use threatreg_core::models::{Component, ComponentRelationship};
use threatreg_core::types::{ComponentId, ComponentType, FxHashMap, FxHashSet, SmallVec4};
use threatreg_storage::queries::{components, relationships, tags};

/// Components, their tag names, outgoing edges and inheritance parents,
/// loaded with one query per table.
#[derive(Debug, Default)]
pub struct EvaluationContext {
    components: FxHashMap<ComponentId, Component>,
    tags: FxHashMap<ComponentId, FxHashSet<String>>,
    outgoing: FxHashMap<ComponentId, Vec<ComponentRelationship>>,
    parents: FxHashMap<ComponentId, SmallVec4<ComponentId>>,
}

impl EvaluationContext {
    pub fn load(conn: &Connection) -> Result<Self, StorageError> {
        let mut ctx = Self::default();
        for component in components::list_components(conn)? {
            ctx.components.insert(component.id, component);
        }
        for (component_id, name) in tags::list_component_tag_names(conn)? {
            ctx.tags.entry(component_id).or_default().insert(name);
        }
        for relationship in relationships::list_relationships(conn)? {
            if relationship.label == INHERITS_THREATS_LABEL {
                ctx.parents
                    .entry(relationship.from_id)
                    .or_default()
                    .push(relationship.to_id);
            }
            ctx.outgoing
                .entry(relationship.from_id)
                .or_default()
                .push(relationship);
        }
        Ok(ctx)
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(&id)
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn has_tag(&self, id: ComponentId, tag: &str) -> bool {
        self.tags.get(&id).is_some_and(|names| names.contains(tag))
    }

    pub fn tag_names(&self, id: ComponentId) -> impl Iterator<Item = &str> {
        self.tags.get(&id).into_iter().flatten().map(String::as_str)
    }

    /// Outgoing edges of `id` carrying `label`.
    pub fn edges<'a>(
        &'a self,
        id: ComponentId,
        label: &'a str,
    ) -> impl Iterator<Item = &'a ComponentRelationship> + 'a {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .filter(move |r| r.label == label)
    }

    /// The products `id` inherits threats from (transitively), plus `id`
    /// itself when it is a product.
    pub fn products(&self, id: ComponentId) -> Vec<&Component> {
        let mut products = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(component) = self.components.get(&current) {
                if component.component_type == ComponentType::Product {
                    products.push(component);
                }
            }
            if let Some(parents) = self.parents.get(&current) {
                stack.extend(parents.iter().copied());
            }
        }
        products
    }
}
