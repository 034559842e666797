// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Structural and lookup errors raised by graph primitives.
use thiserror::Error;

use crate::edge::EdgeTag;
use crate::ident::{EdgeId, GraphId, NodeId};

/// Error returned by [`Graph`](crate::Graph) mutations and strict lookups.
///
/// Structural errors are raised at the point of mutation and never coerced.
/// Ambiguity ([`GraphError::AmbiguousPointer`]) is reported separately from
/// absence so callers can tell "missing" from "contradictory".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The handle does not refer to a live node.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    /// The handle does not refer to a live edge.
    #[error("edge not found: {0}")]
    EdgeNotFound(EdgeId),
    /// The handle was issued by another graph.
    #[error("handle from graph {found} presented to graph {expected}")]
    ForeignHandle {
        /// Graph that received the handle.
        expected: GraphId,
        /// Graph that issued the handle.
        found: GraphId,
    },
    /// The parent already owns a child with that name.
    #[error("parent {parent} already has a child named `{name}`")]
    DuplicateChildName {
        /// Parent node.
        parent: NodeId,
        /// Colliding name.
        name: String,
    },
    /// The node already has an owner.
    #[error("node {0} already has a parent")]
    AlreadyHasParent(NodeId),
    /// Detach was requested on a root.
    #[error("node {0} has no parent to detach from")]
    HasNoParent(NodeId),
    /// A parent-relative name was required for a root.
    #[error("node {0} has no parent")]
    NoParent(NodeId),
    /// Attaching would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    CyclicAttach {
        /// Requested parent.
        parent: NodeId,
        /// Requested child.
        child: NodeId,
    },
    /// The node still owns children.
    #[error("node {0} still has children")]
    HasChildren(NodeId),
    /// More than one pointer matched where one was expected.
    #[error("node {node} holds {count} pointers named `{identifier}`")]
    AmbiguousPointer {
        /// Pointer holder.
        node: NodeId,
        /// Requested identifier.
        identifier: String,
        /// Number of matches.
        count: usize,
    },
    /// An expression already holds an operand under that identifier.
    #[error("expression {expression} already has an operand named `{identifier}`")]
    DuplicateOperand {
        /// Expression node.
        expression: NodeId,
        /// Colliding operand identifier.
        identifier: String,
    },
    /// The expression already holds an operand at the last position.
    #[error("expression {0} has no operand position left")]
    OperandOrderExhausted(NodeId),
    /// The instance already has a type edge.
    #[error("node {0} is already an instance of another type")]
    AlreadyTyped(NodeId),
    /// An equivalent interface connection already exists.
    #[error("nodes {from} and {to} are already connected by {existing}")]
    LinkExists {
        /// First endpoint.
        from: NodeId,
        /// Second endpoint.
        to: NodeId,
        /// Edge already connecting them.
        existing: EdgeId,
    },
    /// Interface connections need two distinct endpoints.
    #[error("cannot connect node {0} to itself")]
    SelfConnection(NodeId),
    /// The edge exists but is of another kind.
    #[error("edge {edge} is a {found} edge, expected {expected}")]
    WrongEdgeKind {
        /// Offending edge.
        edge: EdgeId,
        /// Required kind.
        expected: EdgeTag,
        /// Actual kind.
        found: EdgeTag,
    },
}
