// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph record types: nodes and edges.

use crate::edge::{EdgeKind, EdgeTag};
use crate::ident::{EdgeId, HostHandle, NodeId, TypeTag};
use crate::literal::{Attributes, Literal};

/// Materialised record for a single node stored in the graph.
///
/// Invariants
/// - The node identifier is not embedded here; the graph supplies it.
/// - Names are not stored on the record: a node's name is the name carried by
///   its parent Composition edge, or `label` (falling back to a root id) when
///   the node has no parent.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    /// Declared type tag.
    pub ty: TypeTag,
    /// Name used while the node is a root.
    pub label: Option<String>,
    /// Opaque handle to a host-level object.
    pub handle: Option<HostHandle>,
    /// Literal attributes.
    pub attrs: Attributes,
    /// Hide this node's ancestors when composing full names below it.
    pub no_include_parents_in_full_name: bool,
}

impl NodeRecord {
    /// Creates a detached record with the given type tag and no attributes.
    pub fn new(ty: impl Into<TypeTag>) -> Self {
        Self {
            ty: ty.into(),
            label: None,
            handle: None,
            attrs: Attributes::new(),
            no_include_parents_in_full_name: false,
        }
    }

    /// Sets the root label. Labels of live roots are expected to be
    /// distinct; full-name lookup cannot tell two equally labelled roots apart.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the host handle.
    pub fn with_handle(mut self, handle: HostHandle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Adds one attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&Literal> {
        self.attrs.get(key)
    }
}

/// Materialised record for a single edge stored in the graph.
///
/// Invariants
/// - `from` and `to` reference live nodes of the same graph.
/// - For Composition edges `from` is the parent and `to` the child; a node is
///   the `to` end of at most one Composition edge.
/// - `seq` grows monotonically with insertion and fixes iteration order.
#[derive(Clone, Debug)]
pub struct EdgeRecord {
    /// Stable identifier for the edge.
    pub id: EdgeId,
    /// Source endpoint.
    pub from: NodeId,
    /// Destination endpoint.
    pub to: NodeId,
    /// Kind discriminant and kind-specific payload.
    pub kind: EdgeKind,
    pub(crate) seq: u64,
}

impl EdgeRecord {
    /// Kind discriminant without payload.
    #[must_use]
    pub fn tag(&self) -> EdgeTag {
        self.kind.tag()
    }

    /// Endpoint opposite to `node`, or `None` if `node` is not an endpoint.
    #[must_use]
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.from == node {
            Some(self.to)
        } else if self.to == node {
            Some(self.from)
        } else {
            None
        }
    }

    /// Returns `true` if `node` is either endpoint.
    #[must_use]
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }
}
