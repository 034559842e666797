// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bound handles: a node id paired with the graph that owns it.
use std::fmt;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::hierarchy::ChildQuery;
use crate::ident::NodeId;
use crate::literal::Literal;
use crate::record::NodeRecord;

/// Read-only view of one node through its owning graph.
///
/// Construction checks liveness once; later calls still go through the
/// graph, so a view never outlives the borrow it was created from.
#[derive(Clone, Copy)]
pub struct BoundNode<'g> {
    graph: &'g Graph,
    id: NodeId,
}

impl<'g> BoundNode<'g> {
    /// Handle of the node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Owning graph.
    #[must_use]
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Node record.
    pub fn record(&self) -> Result<&'g NodeRecord, GraphError> {
        self.graph.node(self.id)
    }

    /// Attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&'g Literal> {
        self.graph.node(self.id).ok().and_then(|r| r.attr(key))
    }

    /// Full dotted name.
    pub fn full_name(&self) -> Result<String, GraphError> {
        self.graph.full_name(self.id)
    }

    /// Owner, bound to the same graph.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.graph.parent_of(self.id).map(|id| self.rebind(id))
    }

    /// Direct child named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<Self> {
        self.graph.child_by_name(self.id, name).map(|id| self.rebind(id))
    }

    /// Follows a dotted path of child names.
    #[must_use]
    pub fn at(&self, dotted: &str) -> Option<Self> {
        let sep = self.graph.config().name_separator;
        self.graph
            .descend(self.id, dotted.split(sep).filter(|s| !s.is_empty()))
            .map(|id| self.rebind(id))
    }

    /// Children selected by `query`.
    pub fn children(&self, query: &ChildQuery<'_>) -> Result<Vec<Self>, GraphError> {
        Ok(self
            .graph
            .get_children(self.id, query)?
            .into_iter()
            .map(|id| self.rebind(id))
            .collect())
    }

    /// Type node of this instance.
    #[must_use]
    pub fn type_of(&self) -> Option<Self> {
        self.graph.type_of(self.id).map(|id| self.rebind(id))
    }

    /// Nodes on the same interface bus.
    pub fn connected(&self) -> Result<Vec<Self>, GraphError> {
        Ok(self
            .graph
            .connected_interfaces(self.id)?
            .into_iter()
            .map(|id| self.rebind(id))
            .collect())
    }

    fn rebind(&self, id: NodeId) -> Self {
        Self {
            graph: self.graph,
            id,
        }
    }
}

impl PartialEq for BoundNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for BoundNode<'_> {}

impl fmt::Debug for BoundNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.graph.full_name(self.id) {
            Ok(name) => write!(f, "<{name}@{}>", self.id),
            Err(_) => write!(f, "<dead@{}>", self.id),
        }
    }
}

impl Graph {
    /// Binds `id` to this graph.
    pub fn bind(&self, id: NodeId) -> Result<BoundNode<'_>, GraphError> {
        self.check_node(id)?;
        Ok(BoundNode { graph: self, id })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn bound_nodes_navigate_without_the_graph_argument() {
        let mut g = Graph::new();
        let top = g.hold(NodeRecord::new("App").with_label("app"));
        let r = g.hold(NodeRecord::new("Resistor").with_attr("resistance", 1000_i64));
        let p = g.hold(NodeRecord::new("Electrical"));
        g.attach(top, r, "r1").expect("r1");
        g.attach(r, p, "p1").expect("p1");

        let app = g.bind(top).expect("bind");
        let pin = app.at("r1.p1").expect("path");
        assert_eq!(pin.id(), p);
        assert_eq!(pin.full_name().expect("name"), "app.r1.p1");
        let res = pin.parent().expect("parent");
        assert_eq!(res.attr("resistance").and_then(Literal::as_int), Some(1000));
        assert_eq!(res.parent(), Some(app));
        assert!(app.child("missing").is_none());
        assert_eq!(format!("{res:?}"), format!("<app.r1@{r}>"));
    }
}
