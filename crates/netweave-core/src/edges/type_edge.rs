// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type edges: instance-of relations from a type node to its instances.
use crate::edge::{EdgeKind, EdgeTag};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::{EdgeId, NodeId};
use crate::record::EdgeRecord;

impl Graph {
    /// Records `instance` as an instance of `ty`, optionally under the
    /// identifier it was declared with.
    ///
    /// # Errors
    /// [`GraphError::AlreadyTyped`] if `instance` already has a type.
    pub fn add_instance_of(
        &mut self,
        ty: NodeId,
        instance: NodeId,
        identifier: Option<&str>,
    ) -> Result<EdgeId, GraphError> {
        self.check_node(ty)?;
        self.check_node(instance)?;
        if self.type_edge(instance).is_some() {
            return Err(GraphError::AlreadyTyped(instance));
        }
        self.insert_edge(
            ty,
            instance,
            EdgeKind::Type {
                identifier: identifier.map(str::to_owned),
            },
        )
    }

    /// Type edge ending at `instance`.
    #[must_use]
    pub fn type_edge(&self, instance: NodeId) -> Option<&EdgeRecord> {
        self.incoming(instance).find(|e| e.tag() == EdgeTag::Type)
    }

    /// Type node of `instance`.
    #[must_use]
    pub fn type_of(&self, instance: NodeId) -> Option<NodeId> {
        self.type_edge(instance).map(|e| e.from)
    }

    /// All instances of `ty` in insertion order.
    #[must_use]
    pub fn instances_of(&self, ty: NodeId) -> Vec<NodeId> {
        self.outgoing(ty)
            .filter(|e| e.tag() == EdgeTag::Type)
            .map(|e| e.to)
            .collect()
    }

    /// Returns `true` if `instance` is typed by `ty`.
    #[must_use]
    pub fn is_instance_of(&self, instance: NodeId, ty: NodeId) -> bool {
        self.type_of(instance) == Some(ty)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use crate::{Graph, GraphError, NodeRecord};

    #[test]
    fn one_type_per_instance() {
        let mut g = Graph::new();
        let resistor = g.hold(NodeRecord::new("Type"));
        let capacitor = g.hold(NodeRecord::new("Type"));
        let r1 = g.hold(NodeRecord::new("Resistor"));
        g.add_instance_of(resistor, r1, Some("r1")).expect("typed");
        assert_eq!(
            g.add_instance_of(capacitor, r1, None),
            Err(GraphError::AlreadyTyped(r1))
        );
        assert!(g.is_instance_of(r1, resistor));
        assert_eq!(g.instances_of(resistor), vec![r1]);
        assert_eq!(
            g.type_edge(r1).and_then(|e| e.kind.identifier()),
            Some("r1")
        );
    }
}
