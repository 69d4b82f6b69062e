#![forbid(unsafe_code)]

//! Node identity: [`NodeId`] and the [`SelectType`] category.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier of a selectable node.
///
/// Ids are unique within a [`SelectType`]; the engine never interprets them.
/// Cloning is a reference-count bump, so ids can be copied freely between the
/// index, the selection and emitted effects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Arc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// Category of a selectable unit.
///
/// Only [`SelectType::Block`] has hierarchy: its selections collapse
/// descendants, extend by document range, and compete with the text caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SelectType {
    /// Block-level document node.
    Block,
    /// Row-like item in a set/collection view.
    Record,
}

impl SelectType {
    /// Every category, in the order the engine evaluates them.
    pub const ALL: [SelectType; 2] = [SelectType::Block, SelectType::Record];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Record => "record",
        }
    }

    /// Whether the category carries parent/child structure.
    pub const fn is_hierarchical(&self) -> bool {
        matches!(self, Self::Block)
    }
}

impl fmt::Display for SelectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeId, SelectType};
    use std::collections::HashMap;

    #[test]
    fn node_id_borrows_as_str() {
        let mut map = HashMap::new();
        map.insert(NodeId::new("b1"), 7);
        assert_eq!(map.get("b1"), Some(&7));
        assert_eq!(NodeId::from("b1").to_string(), "b1");
    }

    #[test]
    fn only_blocks_are_hierarchical() {
        assert!(SelectType::Block.is_hierarchical());
        assert!(!SelectType::Record.is_hierarchical());
        assert_eq!(SelectType::ALL.len(), 2);
    }
}
