//! Tree paths over the inheritance hierarchy.
//!
//! The hierarchy is loaded into a petgraph `DiGraphMap` with edges pointing
//! parent -> child. A path runs from an ancestor down to a node, so
//! `depth == path.len() - 1`. Paths longer than `inheritance.max_depth` are
//! cut off, and a node already on the current path is never revisited.

use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use rusqlite::Connection;
use threatreg_core::constants::INHERITS_THREATS_LABEL;
use threatreg_core::errors::RegistryResult;
use threatreg_core::models::ComponentTreePath;
use threatreg_core::types::ComponentId;
use threatreg_storage::queries::relationships;

use crate::components::require_component;
use crate::Registry;

pub(crate) struct InheritanceTree {
    graph: DiGraphMap<ComponentId, ()>,
    max_depth: usize,
}

impl InheritanceTree {
    pub(crate) fn load(conn: &Connection, max_depth: usize) -> RegistryResult<Self> {
        let mut graph = DiGraphMap::new();
        for edge in relationships::list_relationships_by_label(conn, INHERITS_THREATS_LABEL)? {
            graph.add_edge(edge.to_id, edge.from_id, ());
        }
        Ok(Self { graph, max_depth })
    }

    fn parents(&self, id: ComponentId) -> impl Iterator<Item = ComponentId> + '_ {
        self.graph.neighbors_directed(id, Direction::Incoming)
    }

    fn children(&self, id: ComponentId) -> impl Iterator<Item = ComponentId> + '_ {
        self.graph.neighbors_directed(id, Direction::Outgoing)
    }

    fn is_root(&self, id: ComponentId) -> bool {
        self.parents(id).next().is_none()
    }

    /// Every upward chain from `id`, listed bottom-up: `[id, parent, ...]`.
    /// Emits each prefix of length >= 2 through `visit`, and returns the full
    /// chains that end at a root.
    fn walk_up(
        &self,
        chain: &mut Vec<ComponentId>,
        visit: &mut dyn FnMut(&[ComponentId]),
        to_roots: &mut Vec<Vec<ComponentId>>,
    ) {
        let Some(&current) = chain.last() else {
            return;
        };
        if self.is_root(current) {
            to_roots.push(chain.clone());
            return;
        }
        if chain.len() > self.max_depth {
            return;
        }
        let parents: Vec<_> = self.parents(current).collect();
        for parent in parents {
            if chain.contains(&parent) {
                tracing::warn!(component_id = %parent, "cycle in inheritance hierarchy");
                continue;
            }
            chain.push(parent);
            visit(chain.as_slice());
            self.walk_up(chain, visit, to_roots);
            chain.pop();
        }
    }

    /// Record `path` and every downward extension of it.
    fn walk_down(&self, path: &mut Vec<ComponentId>, out: &mut Vec<ComponentTreePath>) {
        let Some(&current) = path.last() else {
            return;
        };
        out.push(ComponentTreePath {
            component_id: current,
            path: path.clone(),
            depth: path.len() - 1,
        });
        if path.len() > self.max_depth {
            return;
        }
        let children: Vec<_> = self.children(current).collect();
        for child in children {
            if path.contains(&child) {
                tracing::warn!(component_id = %child, "cycle in inheritance hierarchy");
                continue;
            }
            path.push(child);
            self.walk_down(path, out);
            path.pop();
        }
    }

    /// Root-to-node paths that pass through `id`.
    pub(crate) fn paths_through(&self, id: ComponentId) -> Vec<ComponentTreePath> {
        let mut to_roots = Vec::new();
        self.walk_up(&mut vec![id], &mut |_| {}, &mut to_roots);
        if to_roots.is_empty() {
            // Every root is further up than `max_depth`.
            return vec![ComponentTreePath {
                component_id: id,
                path: vec![id],
                depth: 0,
            }];
        }

        let mut out = Vec::new();
        for mut chain in to_roots {
            chain.reverse();
            self.walk_down(&mut chain, &mut out);
        }
        sorted(out)
    }

    /// One path per (ancestor, route): `[ancestor, ..., id]`.
    pub(crate) fn ancestor_paths(&self, id: ComponentId) -> Vec<ComponentTreePath> {
        let mut out = Vec::new();
        let mut visit = |chain: &[ComponentId]| {
            let path: Vec<_> = chain.iter().rev().copied().collect();
            out.push(ComponentTreePath {
                component_id: path[0],
                depth: path.len() - 1,
                path,
            });
        };
        self.walk_up(&mut vec![id], &mut visit, &mut Vec::new());
        sorted(out)
    }

    /// One path per (descendant, route): `[id, ..., descendant]`.
    pub(crate) fn descendant_paths(&self, id: ComponentId) -> Vec<ComponentTreePath> {
        let mut out = Vec::new();
        self.walk_down(&mut vec![id], &mut out);
        out.retain(|p| p.depth > 0);
        sorted(out)
    }

    /// Every root-to-node path in the hierarchy.
    pub(crate) fn all_paths(&self) -> Vec<ComponentTreePath> {
        let roots: Vec<_> = self.graph.nodes().filter(|&n| self.is_root(n)).collect();
        let mut out = Vec::new();
        for root in roots {
            self.walk_down(&mut vec![root], &mut out);
        }
        sorted(out)
    }
}

fn sorted(mut paths: Vec<ComponentTreePath>) -> Vec<ComponentTreePath> {
    paths.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.component_id.cmp(&b.component_id))
            .then_with(|| a.path.cmp(&b.path))
    });
    paths
}

impl Registry {
    /// Root-to-node paths passing through the component. A component outside
    /// any hierarchy, or with no root within `max_depth`, yields the single
    /// path `[id]`.
    pub fn get_component_tree_paths(&self, id: ComponentId) -> RegistryResult<Vec<ComponentTreePath>> {
        let max_depth = self.max_depth();
        self.db.with_reader(|conn| {
            require_component(conn, id)?;
            Ok(InheritanceTree::load(conn, max_depth)?.paths_through(id))
        })
    }

    pub fn get_component_ancestor_paths(
        &self,
        id: ComponentId,
    ) -> RegistryResult<Vec<ComponentTreePath>> {
        let max_depth = self.max_depth();
        self.db.with_reader(|conn| {
            require_component(conn, id)?;
            Ok(InheritanceTree::load(conn, max_depth)?.ancestor_paths(id))
        })
    }

    pub fn get_component_descendant_paths(
        &self,
        id: ComponentId,
    ) -> RegistryResult<Vec<ComponentTreePath>> {
        let max_depth = self.max_depth();
        self.db.with_reader(|conn| {
            require_component(conn, id)?;
            Ok(InheritanceTree::load(conn, max_depth)?.descendant_paths(id))
        })
    }

    /// Every root-to-node path among components that take part in
    /// inheritance.
    pub fn get_all_tree_paths(&self) -> RegistryResult<Vec<ComponentTreePath>> {
        let max_depth = self.max_depth();
        self.db
            .with_reader(|conn| Ok(InheritanceTree::load(conn, max_depth)?.all_paths()))
    }
}
