// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pointer edges: non-owning references, optionally named.
use std::ops::ControlFlow;

use crate::edge::{EdgeKind, EdgeTag};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::{EdgeId, NodeId};
use crate::record::EdgeRecord;

impl Graph {
    /// Adds a pointer from `holder` to `target`.
    ///
    /// Several pointers may share an identifier; lookups by identifier then
    /// report [`GraphError::AmbiguousPointer`].
    pub fn add_pointer(
        &mut self,
        holder: NodeId,
        target: NodeId,
        identifier: Option<&str>,
        order: Option<u32>,
    ) -> Result<EdgeId, GraphError> {
        self.insert_edge(
            holder,
            target,
            EdgeKind::Pointer {
                identifier: identifier.map(str::to_owned),
                order,
            },
        )
    }

    /// Visits the pointer edges held by `holder` in insertion order.
    pub fn visit_pointer_edges<B>(
        &self,
        holder: NodeId,
        mut visit: impl FnMut(&EdgeRecord) -> ControlFlow<B>,
    ) -> Option<B> {
        for edge in self.outgoing(holder).filter(|e| e.tag() == EdgeTag::Pointer) {
            if let ControlFlow::Break(out) = visit(edge) {
                return Some(out);
            }
        }
        None
    }

    /// Targets of every pointer held by `holder`, ordered by their explicit
    /// order first and insertion order after.
    #[must_use]
    pub fn pointers(&self, holder: NodeId) -> Vec<NodeId> {
        let mut found: Vec<(Option<u32>, NodeId)> = self
            .outgoing(holder)
            .filter_map(|e| match &e.kind {
                EdgeKind::Pointer { order, .. } => Some((*order, e.to)),
                _ => None,
            })
            .collect();
        found.sort_by_key(|(order, _)| order.map_or((1, 0), |o| (0, o)));
        found.into_iter().map(|(_, node)| node).collect()
    }

    /// Target of the pointer named `identifier`.
    ///
    /// # Errors
    /// [`GraphError::AmbiguousPointer`] if more than one pointer matches.
    pub fn pointed_by_identifier(
        &self,
        holder: NodeId,
        identifier: &str,
    ) -> Result<Option<NodeId>, GraphError> {
        self.check_node(holder)?;
        let matches: Vec<NodeId> = self
            .outgoing(holder)
            .filter(|e| e.tag() == EdgeTag::Pointer && e.kind.identifier() == Some(identifier))
            .map(|e| e.to)
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [one] => Ok(Some(*one)),
            _ => Err(GraphError::AmbiguousPointer {
                node: holder,
                identifier: identifier.to_owned(),
                count: matches.len(),
            }),
        }
    }

    /// Nodes holding a pointer to `target`.
    #[must_use]
    pub fn referrers(&self, target: NodeId) -> Vec<NodeId> {
        self.incoming(target)
            .filter(|e| e.tag() == EdgeTag::Pointer)
            .map(|e| e.from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use crate::{Graph, GraphError, NodeRecord};

    #[test]
    fn identifier_lookup_distinguishes_absent_from_ambiguous() {
        let mut g = Graph::new();
        let bus = g.hold(NodeRecord::new("I2C"));
        let scl = g.hold(NodeRecord::new("Electrical"));
        let sda = g.hold(NodeRecord::new("Electrical"));
        g.add_pointer(bus, scl, Some("line"), Some(1)).expect("ptr");
        g.add_pointer(bus, sda, Some("data"), Some(0)).expect("ptr");

        assert_eq!(g.pointed_by_identifier(bus, "data"), Ok(Some(sda)));
        assert_eq!(g.pointed_by_identifier(bus, "clock"), Ok(None));
        assert_eq!(g.pointers(bus), vec![sda, scl]);

        g.add_pointer(bus, sda, Some("line"), None).expect("ptr");
        assert_eq!(
            g.pointed_by_identifier(bus, "line"),
            Err(GraphError::AmbiguousPointer {
                node: bus,
                identifier: "line".to_owned(),
                count: 2
            })
        );
        assert_eq!(g.referrers(sda), vec![bus, bus]);
    }

    #[test]
    fn pointers_do_not_keep_targets_alive() {
        let mut g = Graph::new();
        let a = g.hold(NodeRecord::new("A"));
        let b = g.hold(NodeRecord::new("B"));
        g.add_pointer(a, b, None, None).expect("ptr");
        g.destroy_node(b).expect("destroy target");
        assert!(g.pointers(a).is_empty());
    }
}
