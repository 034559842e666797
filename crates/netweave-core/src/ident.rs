// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Identifier types for graphs, nodes, and edges.
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Strongly typed identifier for one [`Graph`](crate::Graph) container.
///
/// Every graph draws a fresh id at construction. Node and edge handles embed
/// the id of the graph that issued them so a handle presented to the wrong
/// graph is rejected instead of silently aliasing an unrelated slot.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphId(pub u32);

static NEXT_GRAPH_ID: AtomicU32 = AtomicU32::new(1);

impl GraphId {
    /// Allocates a process-unique graph id.
    pub(crate) fn fresh() -> Self {
        Self(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// Slot address inside an arena: index plus the generation that was live
/// when the handle was issued.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct SlotKey {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Copyable handle for a node living in a [`Graph`](crate::Graph).
///
/// A `NodeId` never keeps its node alive. Once the node is destroyed the slot
/// generation advances and every lookup through the stale handle fails with
/// [`GraphError::NodeNotFound`](crate::GraphError::NodeNotFound).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId {
    pub(crate) graph: GraphId,
    pub(crate) slot: SlotKey,
}

impl NodeId {
    /// Graph that issued this handle.
    #[must_use]
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    /// Arena index of the node (stable for the node's lifetime).
    #[must_use]
    pub fn index(&self) -> u32 {
        self.slot.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:N{}v{}", self.graph, self.slot.index, self.slot.generation)
    }
}

/// Copyable handle for an edge living in a [`Graph`](crate::Graph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId {
    pub(crate) graph: GraphId,
    pub(crate) slot: SlotKey,
}

impl EdgeId {
    /// Graph that issued this handle.
    #[must_use]
    pub fn graph(&self) -> GraphId {
        self.graph
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:E{}v{}", self.graph, self.slot.index, self.slot.generation)
    }
}

/// Declared type tag of a node.
///
/// Tags are plain names. The engine assigns them no meaning beyond equality;
/// host layers decide what a tag stands for.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeTag(String);

impl TypeTag {
    /// Creates a tag from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the tag name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeTag {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Opaque handle to a richer host-level object wrapped by a node.
///
/// The engine stores and copies the value but never interprets it.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HostHandle(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_graph_ids_are_distinct() {
        let a = GraphId::fresh();
        let b = GraphId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn display_includes_graph_and_generation() {
        let id = NodeId {
            graph: GraphId(7),
            slot: SlotKey {
                index: 3,
                generation: 2,
            },
        };
        assert_eq!(id.to_string(), "G7:N3v2");
    }
}
