// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Source edges: provenance of a derived node.
use tracing::trace;

use crate::edge::{EdgeKind, EdgeTag};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::{EdgeId, NodeId};

impl Graph {
    /// Records that `subject` was derived from `origin`, replacing any
    /// previous source of `subject`.
    pub fn set_source(&mut self, subject: NodeId, origin: NodeId) -> Result<EdgeId, GraphError> {
        self.check_node(subject)?;
        self.check_node(origin)?;
        if let Some(previous) = self.source_edge(subject) {
            trace!(%subject, "source overwritten");
            self.remove_edge(previous)?;
        }
        self.insert_edge(subject, origin, EdgeKind::Source)
    }

    fn source_edge(&self, subject: NodeId) -> Option<EdgeId> {
        self.outgoing(subject)
            .find(|e| e.tag() == EdgeTag::Source)
            .map(|e| e.id)
    }

    /// Node `subject` was derived from.
    #[must_use]
    pub fn source_of(&self, subject: NodeId) -> Option<NodeId> {
        self.outgoing(subject)
            .find(|e| e.tag() == EdgeTag::Source)
            .map(|e| e.to)
    }

    /// Nodes derived from `origin`.
    #[must_use]
    pub fn sourced_from(&self, origin: NodeId) -> Vec<NodeId> {
        self.incoming(origin)
            .filter(|e| e.tag() == EdgeTag::Source)
            .map(|e| e.from)
            .collect()
    }

    /// Removes the source of `subject`, returning the former origin.
    pub fn clear_source(&mut self, subject: NodeId) -> Result<Option<NodeId>, GraphError> {
        self.check_node(subject)?;
        match self.source_edge(subject) {
            Some(edge) => Ok(Some(self.remove_edge(edge)?.to)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use crate::{Graph, NodeRecord};

    #[test]
    fn source_is_overwritable() {
        let mut g = Graph::new();
        let derived = g.hold(NodeRecord::new("Parameter"));
        let first = g.hold(NodeRecord::new("Literal"));
        let second = g.hold(NodeRecord::new("Literal"));
        g.set_source(derived, first).expect("first");
        g.set_source(derived, second).expect("second");
        assert_eq!(g.source_of(derived), Some(second));
        assert!(g.sourced_from(first).is_empty());
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.clear_source(derived), Ok(Some(second)));
        assert_eq!(g.source_of(derived), None);
    }
}
