// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Trait edges: capability nodes attached to a host.
use std::ops::ControlFlow;

use crate::edge::{EdgeKind, EdgeTag};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::{EdgeId, NodeId, TypeTag};
use crate::record::EdgeRecord;

impl Graph {
    /// Attaches `trait_node` to `host`.
    ///
    /// # Errors
    /// [`GraphError::LinkExists`] if the pair is already attached.
    pub fn add_trait(&mut self, host: NodeId, trait_node: NodeId) -> Result<EdgeId, GraphError> {
        self.check_node(host)?;
        self.check_node(trait_node)?;
        if let Some(existing) = self
            .outgoing(host)
            .find(|e| e.tag() == EdgeTag::Trait && e.to == trait_node)
        {
            return Err(GraphError::LinkExists {
                from: host,
                to: trait_node,
                existing: existing.id,
            });
        }
        self.insert_edge(host, trait_node, EdgeKind::Trait)
    }

    /// Visits the trait edges of `host`, optionally only those whose trait
    /// node carries `trait_type`.
    pub fn visit_trait_edges<B>(
        &self,
        host: NodeId,
        trait_type: Option<&TypeTag>,
        mut visit: impl FnMut(&EdgeRecord) -> ControlFlow<B>,
    ) -> Option<B> {
        for edge in self.outgoing(host).filter(|e| e.tag() == EdgeTag::Trait) {
            if let Some(wanted) = trait_type {
                if !self.node(edge.to).is_ok_and(|r| &r.ty == wanted) {
                    continue;
                }
            }
            if let ControlFlow::Break(out) = visit(edge) {
                return Some(out);
            }
        }
        None
    }

    /// Trait nodes attached to `host` in insertion order.
    #[must_use]
    pub fn traits(&self, host: NodeId) -> Vec<NodeId> {
        self.outgoing(host)
            .filter(|e| e.tag() == EdgeTag::Trait)
            .map(|e| e.to)
            .collect()
    }

    /// First trait of `host` whose node carries `trait_type`.
    #[must_use]
    pub fn trait_of_type(&self, host: NodeId, trait_type: &TypeTag) -> Option<NodeId> {
        self.visit_trait_edges(host, Some(trait_type), |e| ControlFlow::Break(e.to))
    }

    /// Returns `true` if `host` carries a trait of type `trait_type`.
    #[must_use]
    pub fn has_trait(&self, host: NodeId, trait_type: &TypeTag) -> bool {
        self.trait_of_type(host, trait_type).is_some()
    }

    /// Host a trait node is attached to.
    #[must_use]
    pub fn trait_owner(&self, trait_node: NodeId) -> Option<NodeId> {
        self.incoming(trait_node)
            .find(|e| e.tag() == EdgeTag::Trait)
            .map(|e| e.from)
    }
}
