#![forbid(unsafe_code)]

//! Per-category ordered id sets with hierarchy-aware storage.
//!
//! # Invariants
//!
//! 1. Ids within a category are unique; order is interaction order, not
//!    document order.
//! 2. After [`canonicalize`](SelectionSet::canonicalize), the block category
//!    never holds an id together with one of its ancestors: the ancestor
//!    implicitly covers the descendant.
//! 3. Materializing `with_children` yields every canonical id followed by its
//!    cached descendants; without children it yields the canonical ids as is.

use std::collections::BTreeMap;

use ahash::AHashSet;
use blocksel_core::ids::{NodeId, SelectType};

use crate::node_index::Hierarchy;

/// Selected ids per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    sets: BTreeMap<SelectType, Vec<NodeId>>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored ids of `category`.
    pub fn get(&self, category: SelectType) -> &[NodeId] {
        self.sets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, category: SelectType, id: &NodeId) -> bool {
        self.get(category).contains(id)
    }

    pub fn len(&self, category: SelectType) -> usize {
        self.get(category).len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.values().all(Vec::is_empty)
    }

    /// Append `id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, category: SelectType, id: NodeId) -> bool {
        let set = self.sets.entry(category).or_default();
        if set.contains(&id) {
            return false;
        }
        set.push(id);
        true
    }

    pub fn remove(&mut self, category: SelectType, id: &NodeId) -> bool {
        let Some(set) = self.sets.get_mut(&category) else {
            return false;
        };
        let before = set.len();
        set.retain(|it| it != id);
        set.len() != before
    }

    /// Insert `id` if absent, remove it otherwise.
    pub fn toggle(&mut self, category: SelectType, id: NodeId) {
        if !self.remove(category, &id) {
            self.insert(category, id);
        }
    }

    /// Append every id, skipping duplicates.
    pub fn extend(&mut self, category: SelectType, ids: impl IntoIterator<Item = NodeId>) {
        for id in ids {
            self.insert(category, id);
        }
    }

    /// Replace the ids of `category`, deduplicating while keeping first occurrences.
    pub fn set(&mut self, category: SelectType, ids: impl IntoIterator<Item = NodeId>) {
        self.clear_category(category);
        self.extend(category, ids);
    }

    pub fn clear_category(&mut self, category: SelectType) {
        if let Some(set) = self.sets.get_mut(&category) {
            set.clear();
        }
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    /// Drop every block id covered by another stored block id.
    pub fn canonicalize(&mut self, hierarchy: &Hierarchy) {
        for category in SelectType::ALL {
            if !category.is_hierarchical() {
                continue;
            }
            let Some(set) = self.sets.get_mut(&category) else {
                continue;
            };
            let covered: AHashSet<&str> = set
                .iter()
                .flat_map(|id| hierarchy.descendants(id.as_str()))
                .map(NodeId::as_str)
                .collect();
            if covered.is_empty() {
                continue;
            }
            let pruned: Vec<NodeId> = set
                .iter()
                .filter(|id| !covered.contains(id.as_str()))
                .cloned()
                .collect();
            *set = pruned;
        }
    }

    /// Render- or action-facing ids of `category`.
    ///
    /// `with_children` expands every stored block with its cached descendants
    /// ("acts on N blocks"); without it the canonical ids are returned, which
    /// avoids double-counting nested highlights.
    pub fn materialize(
        &self,
        category: SelectType,
        with_children: bool,
        hierarchy: &Hierarchy,
    ) -> Vec<NodeId> {
        let ids = self.get(category);
        if !category.is_hierarchical() || !with_children {
            return ids.to_vec();
        }

        let mut seen = AHashSet::with_capacity(ids.len());
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            for it in std::iter::once(id).chain(hierarchy.descendants(id.as_str())) {
                if seen.insert(it.clone()) {
                    out.push(it.clone());
                }
            }
        }
        out
    }

    /// Materialize every category for the render signal.
    pub fn snapshot(&self, hierarchy: &Hierarchy) -> SelectionSnapshot {
        let categories = SelectType::ALL
            .iter()
            .map(|&category| CategorySelection {
                category,
                ids: self.materialize(category, false, hierarchy),
                with_children: self.materialize(category, true, hierarchy),
            })
            .collect();
        SelectionSnapshot { categories }
    }
}

/// Materialized ids of one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    pub category: SelectType,
    /// Canonical ids.
    pub ids: Vec<NodeId>,
    /// Canonical ids expanded with their descendants.
    pub with_children: Vec<NodeId>,
}

/// Render-facing view of a [`SelectionSet`], one entry per category.
///
/// Empty categories are included so consumers can drop stale highlights.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSnapshot {
    pub categories: Vec<CategorySelection>,
}

impl SelectionSnapshot {
    pub fn get(&self, category: SelectType) -> Option<&CategorySelection> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Ids of `category`, expanded or canonical.
    pub fn ids(&self, category: SelectType, with_children: bool) -> &[NodeId] {
        match self.get(category) {
            Some(c) if with_children => &c.with_children,
            Some(c) => &c.ids,
            None => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.ids.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_index::NodeIndex;
    use crate::provider::{Scope, SelectableNode, TreeProvider};
    use blocksel_core::geometry::{CoordinateSpace, Rect};

    /// `1` > (`1a`, `1b` > `1b1`), `2`.
    struct Tree;

    impl TreeProvider for Tree {
        fn selectable_nodes(&self, _scope: Scope) -> Vec<SelectableNode> {
            ["1", "1a", "1b", "1b1", "2"]
                .iter()
                .enumerate()
                .map(|(i, id)| {
                    let node = SelectableNode::new(
                        SelectType::Block,
                        *id,
                        Rect::new(0.0, i as f64 * 10.0, 100.0, 10.0),
                    );
                    if matches!(*id, "1" | "1b") {
                        node.with_children()
                    } else {
                        node
                    }
                })
                .collect()
        }
        fn rect_of(&self, _scope: Scope, _id: &NodeId) -> Option<Rect> {
            None
        }
        fn child_ids(&self, id: &NodeId) -> Vec<NodeId> {
            match id.as_str() {
                "1" => vec!["1a".into(), "1b".into()],
                "1b" => vec!["1b1".into()],
                _ => Vec::new(),
            }
        }
        fn is_atomic(&self, _id: &NodeId) -> bool {
            false
        }
        fn document_order(&self) -> Vec<NodeId> {
            Vec::new()
        }
    }

    fn hierarchy() -> Hierarchy {
        NodeIndex::build(&Tree, Scope::Page, CoordinateSpace::PAGE).into_hierarchy()
    }

    fn ids(list: &[&str]) -> Vec<NodeId> {
        list.iter().map(|s| NodeId::new(s)).collect()
    }

    #[test]
    fn insert_deduplicates_and_keeps_order() {
        let mut set = SelectionSet::new();
        assert!(set.insert(SelectType::Block, "b".into()));
        assert!(set.insert(SelectType::Block, "a".into()));
        assert!(!set.insert(SelectType::Block, "b".into()));
        assert_eq!(set.get(SelectType::Block), ids(&["b", "a"]).as_slice());
    }

    #[test]
    fn set_replaces_and_dedups() {
        let mut set = SelectionSet::new();
        set.insert(SelectType::Block, "x".into());
        set.set(SelectType::Block, ids(&["a", "b", "a", "c"]));
        assert_eq!(set.get(SelectType::Block), ids(&["a", "b", "c"]).as_slice());
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let mut set = SelectionSet::new();
        set.toggle(SelectType::Record, "r".into());
        assert!(set.contains(SelectType::Record, &"r".into()));
        set.toggle(SelectType::Record, "r".into());
        assert!(!set.contains(SelectType::Record, &"r".into()));
        assert!(set.is_empty());
    }

    #[test]
    fn canonicalize_prunes_descendants() {
        let h = hierarchy();
        let mut set = SelectionSet::new();
        set.set(SelectType::Block, ids(&["1b1", "1", "1a", "2"]));
        set.canonicalize(&h);
        assert_eq!(set.get(SelectType::Block), ids(&["1", "2"]).as_slice());
    }

    #[test]
    fn canonicalize_keeps_unrelated_siblings() {
        let h = hierarchy();
        let mut set = SelectionSet::new();
        set.set(SelectType::Block, ids(&["1a", "1b1"]));
        set.canonicalize(&h);
        assert_eq!(set.get(SelectType::Block), ids(&["1a", "1b1"]).as_slice());
    }

    #[test]
    fn materialize_with_and_without_children() {
        let h = hierarchy();
        let mut set = SelectionSet::new();
        set.set(SelectType::Block, ids(&["1", "2"]));
        set.canonicalize(&h);

        assert_eq!(
            set.materialize(SelectType::Block, true, &h),
            ids(&["1", "1a", "1b", "1b1", "2"])
        );
        assert_eq!(set.materialize(SelectType::Block, false, &h), ids(&["1", "2"]));
    }

    #[test]
    fn records_materialize_as_stored() {
        let h = hierarchy();
        let mut set = SelectionSet::new();
        set.set(SelectType::Record, ids(&["1", "r"]));
        set.canonicalize(&h);
        assert_eq!(set.materialize(SelectType::Record, true, &h), ids(&["1", "r"]));
    }

    #[test]
    fn snapshot_lists_every_category() {
        let h = hierarchy();
        let mut set = SelectionSet::new();
        set.insert(SelectType::Block, "1b".into());
        let snap = set.snapshot(&h);

        assert_eq!(snap.categories.len(), SelectType::ALL.len());
        assert_eq!(snap.ids(SelectType::Block, false), ids(&["1b"]).as_slice());
        assert_eq!(snap.ids(SelectType::Block, true), ids(&["1b", "1b1"]).as_slice());
        assert!(snap.ids(SelectType::Record, true).is_empty());
        assert!(!snap.is_empty());
        assert!(SelectionSet::new().snapshot(&h).is_empty());
    }
}
