#![forbid(unsafe_code)]

//! Per-session snapshot of selectable nodes, their geometry and hierarchy.
//!
//! # Invalidation
//!
//! - Built once when a drag session starts.
//! - Boxes refreshed (cheap path) on scroll ticks below the rebuild threshold.
//! - Rebuilt from scratch once the container scrolled half a viewport away
//!   from the last build, since nodes may have entered or left the tree.
//!
//! The descendant closure ([`Hierarchy`]) outlives the session: the engine
//! keeps the last one so canonical selections can still be expanded between
//! gestures.

use ahash::{AHashMap, AHashSet};
use blocksel_core::geometry::{CoordinateSpace, Rect};
use blocksel_core::ids::{NodeId, SelectType};
use blocksel_core::logging::TARGET_INDEX;
use web_time::Instant;

use crate::provider::{Scope, TreeProvider};

/// Recursive descendant lists for hierarchical nodes.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    children: AHashMap<NodeId, Vec<NodeId>>,
}

impl Hierarchy {
    /// All descendants of `id` in document order; empty for leaves, atomic
    /// containers and unknown ids.
    pub fn descendants(&self, id: &str) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `id` is a (transitive) descendant of `ancestor`.
    pub fn is_descendant_of(&self, id: &str, ancestor: &str) -> bool {
        self.descendants(ancestor).iter().any(|d| d.as_str() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.children.values().all(Vec::is_empty)
    }

    /// Record `id`'s descendants, walking the tree provider recursively.
    ///
    /// Cycles in a malformed tree are cut rather than followed.
    fn collect(
        &mut self,
        tree: &dyn TreeProvider,
        id: &NodeId,
        atomic: bool,
        visiting: &mut AHashSet<NodeId>,
    ) -> Vec<NodeId> {
        if let Some(cached) = self.children.get(id) {
            return cached.clone();
        }
        if !visiting.insert(id.clone()) {
            return Vec::new();
        }

        let mut out = Vec::new();
        if !atomic {
            for child in tree.child_ids(id) {
                let child_atomic = tree.is_atomic(&child);
                let nested = self.collect(tree, &child, child_atomic, visiting);
                out.push(child);
                out.extend(nested);
            }
        }

        visiting.remove(id);
        self.children.insert(id.clone(), out.clone());
        out
    }
}

/// An indexed node, in the order the tree provider reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedNode {
    pub category: SelectType,
    pub id: NodeId,
}

/// Geometry and hierarchy snapshot used for hit testing.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    scope: Scope,
    nodes: Vec<IndexedNode>,
    boxes: AHashMap<(SelectType, NodeId), Rect>,
    hierarchy: Hierarchy,
}

impl NodeIndex {
    /// Walk every selectable node of `scope`, caching its normalized box and
    /// descendant closure.
    pub fn build(tree: &dyn TreeProvider, scope: Scope, space: CoordinateSpace) -> Self {
        let start = Instant::now();
        let mut index = Self {
            scope,
            ..Self::default()
        };
        let mut visiting = AHashSet::new();

        for node in tree.selectable_nodes(scope) {
            if node.id.is_empty() {
                continue;
            }
            let key = (node.category, node.id.clone());
            if index.boxes.contains_key(&key) {
                continue;
            }

            let rect = node
                .rect
                .map(|r| space.rect_to_local(r))
                .unwrap_or_default();
            index.boxes.insert(key, rect);

            if node.category.is_hierarchical() {
                // Leaves skip the provider walk entirely.
                let atomic = node.atomic || !node.has_children || tree.is_atomic(&node.id);
                index
                    .hierarchy
                    .collect(tree, &node.id, atomic, &mut visiting);
            }

            index.nodes.push(IndexedNode {
                category: node.category,
                id: node.id,
            });
        }

        tracing::debug!(
            target: TARGET_INDEX,
            scope = ?scope,
            nodes = index.nodes.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "node index built"
        );
        index
    }

    /// Recompute the boxes of already-indexed nodes.
    ///
    /// Nodes that vanished from the live tree get an empty box.
    pub fn refresh_boxes(&mut self, tree: &dyn TreeProvider, space: CoordinateSpace) {
        for node in &self.nodes {
            let rect = tree
                .rect_of(self.scope, &node.id)
                .map(|r| space.rect_to_local(r))
                .unwrap_or_default();
            self.boxes.insert((node.category, node.id.clone()), rect);
        }
        tracing::trace!(
            target: TARGET_INDEX,
            nodes = self.nodes.len(),
            "node boxes refreshed"
        );
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indexed nodes in document order.
    pub fn nodes(&self) -> &[IndexedNode] {
        &self.nodes
    }

    pub fn nodes_of(&self, category: SelectType) -> impl Iterator<Item = &IndexedNode> + '_ {
        self.nodes.iter().filter(move |n| n.category == category)
    }

    pub fn contains(&self, category: SelectType, id: &NodeId) -> bool {
        self.boxes.contains_key(&(category, id.clone()))
    }

    /// Cached box; unknown nodes get an empty box, which never collides.
    pub fn rect_of(&self, category: SelectType, id: &NodeId) -> Rect {
        self.boxes
            .get(&(category, id.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Cached recursive descendants of a block.
    pub fn children_of(&self, id: &str) -> &[NodeId] {
        self.hierarchy.descendants(id)
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn into_hierarchy(self) -> Hierarchy {
        self.hierarchy
    }
}
