// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! InterfaceConnection edges and bus reachability.
use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::edge::{ConnectionMode, EdgeKind, EdgeTag, FilterResult, LinkCondition};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::{EdgeId, NodeId};
use crate::path::Path;
use crate::record::EdgeRecord;

/// A node found on an interface bus together with the path that reached it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusMember {
    /// Connected node.
    pub node: NodeId,
    /// Route from the queried node, including any hierarchy hops used to
    /// derive the connection.
    pub path: Path,
}

/// Result of [`Graph::bus`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bus {
    /// Connected nodes in discovery order, excluding the queried node.
    pub members: Vec<BusMember>,
    /// A condition returned [`FilterResult::FailUnrecoverable`]; `members`
    /// holds what was found before the search stopped.
    pub aborted: bool,
}

impl Bus {
    /// Connected node handles in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().map(|m| m.node)
    }
}

impl Graph {
    /// Connects `a` and `b` with a deep, unconditional edge.
    ///
    /// # Errors
    /// - [`GraphError::SelfConnection`] if `a == b`.
    /// - [`GraphError::LinkExists`] if the pair is already connected.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId, GraphError> {
        self.connect_with(a, b, ConnectionMode::Deep, None)
    }

    /// Connects only `a` and `b` themselves; the connection does not carry
    /// over to their children.
    pub fn connect_shallow(&mut self, a: NodeId, b: NodeId) -> Result<EdgeId, GraphError> {
        self.connect_with(a, b, ConnectionMode::Shallow, None)
    }

    /// Connects `a` and `b` with an edge that is present only on paths
    /// accepted by `condition`.
    pub fn connect_conditional(
        &mut self,
        a: NodeId,
        b: NodeId,
        mode: ConnectionMode,
        condition: LinkCondition,
    ) -> Result<EdgeId, GraphError> {
        self.connect_with(a, b, mode, Some(condition))
    }

    /// Connects `a` and `b` because `path` was found to link them; the new
    /// edge inherits every condition recorded along `path`.
    pub fn connect_derived(&mut self, a: NodeId, b: NodeId, path: &Path) -> Result<EdgeId, GraphError> {
        let condition = LinkCondition::derived(self, path);
        self.connect_with(a, b, ConnectionMode::Deep, Some(condition))
    }

    fn connect_with(
        &mut self,
        a: NodeId,
        b: NodeId,
        mode: ConnectionMode,
        condition: Option<LinkCondition>,
    ) -> Result<EdgeId, GraphError> {
        self.check_node(a)?;
        self.check_node(b)?;
        if a == b {
            return Err(GraphError::SelfConnection(a));
        }
        if let Some(existing) = self.interface_edge_between(a, b) {
            return Err(GraphError::LinkExists {
                from: a,
                to: b,
                existing: existing.id,
            });
        }
        self.insert_edge(a, b, EdgeKind::InterfaceConnection { mode, condition })
    }

    /// Interface edges touching `node` in insertion order.
    pub fn interface_edges(&self, node: NodeId) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.incident(node)
            .filter(|e| e.tag() == EdgeTag::InterfaceConnection)
    }

    /// Interface edge joining `a` and `b` in either direction.
    #[must_use]
    pub fn interface_edge_between(&self, a: NodeId, b: NodeId) -> Option<&EdgeRecord> {
        self.interface_edges(a).find(|e| e.other(a) == Some(b))
    }

    /// Returns `true` if an interface edge joins `a` and `b`.
    #[must_use]
    pub fn is_directly_connected(&self, a: NodeId, b: NodeId) -> bool {
        self.interface_edge_between(a, b).is_some()
    }

    /// Nodes joined to `node` by a direct interface edge.
    #[must_use]
    pub fn direct_interfaces(&self, node: NodeId) -> Vec<NodeId> {
        self.interface_edges(node)
            .filter_map(|e| e.other(node))
            .collect()
    }

    /// Removes the interface edge joining `a` and `b`, if any.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<Option<EdgeRecord>, GraphError> {
        self.check_node(a)?;
        match self.interface_edge_between(a, b).map(|e| e.id) {
            Some(edge) => self.remove_edge(edge).map(Some),
            None => Ok(None),
        }
    }

    /// Explores the bus `start` belongs to.
    ///
    /// Two sources of connectivity are combined breadth-first:
    /// - direct interface edges, whose conditions are evaluated against the
    ///   candidate path;
    /// - hierarchy propagation: when an ancestor `P` of the current node is
    ///   joined to `Q` by a deep edge, the node at the same relative path
    ///   below `Q` is connected too. Shallow edges never propagate.
    ///
    /// A recoverable filter failure rejects only that candidate; the node
    /// may still be reached another way.
    pub fn bus(&self, start: NodeId) -> Result<Bus, GraphError> {
        self.check_node(start)?;
        let mut bus = Bus::default();
        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut queue = VecDeque::from([Path::new(start)]);

        while let Some(path) = queue.pop_front() {
            let current = path.last();
            let mut candidates = Vec::new();

            for edge in self.interface_edges(current) {
                if let Some(other) = edge.other(current) {
                    candidates.push((edge, other, path.extended(edge.id, other)));
                }
            }

            let mut up = path.clone();
            let mut relative: Vec<&EdgeRecord> = Vec::new();
            let mut cursor = current;
            while let Some(parent_edge) = self.get_parent_edge(cursor) {
                relative.push(parent_edge);
                cursor = parent_edge.from;
                up = up.extended(parent_edge.id, cursor);
                for edge in self.interface_edges(cursor) {
                    if !matches!(
                        edge.kind,
                        EdgeKind::InterfaceConnection {
                            mode: ConnectionMode::Deep,
                            ..
                        }
                    ) {
                        continue;
                    }
                    let Some(peer) = edge.other(cursor) else {
                        continue;
                    };
                    if let Some((target, route)) =
                        self.descend_mirrored(peer, &relative, up.extended(edge.id, peer))
                    {
                        candidates.push((edge, target, route));
                    }
                }
            }

            for (edge, target, candidate) in candidates {
                if visited.contains(&target) {
                    continue;
                }
                let verdict = edge
                    .kind
                    .condition()
                    .map_or(FilterResult::Pass, |c| c.evaluate(self, &candidate));
                match verdict {
                    FilterResult::Pass => {
                        trace!(from = %current, to = %target, "bus member");
                        visited.insert(target);
                        bus.members.push(BusMember {
                            node: target,
                            path: candidate.clone(),
                        });
                        queue.push_back(candidate);
                    }
                    FilterResult::FailRecoverable => {}
                    FilterResult::FailUnrecoverable => {
                        debug!(%start, %target, "bus search aborted by condition");
                        bus.aborted = true;
                        return Ok(bus);
                    }
                }
            }
        }
        Ok(bus)
    }

    /// Walks down from `peer` along the names of `relative` (stored bottom-up)
    /// and extends `route` with each Composition hop.
    fn descend_mirrored(
        &self,
        peer: NodeId,
        relative: &[&EdgeRecord],
        mut route: Path,
    ) -> Option<(NodeId, Path)> {
        let mut node = peer;
        for hop in relative.iter().rev() {
            let name = hop.kind.identifier()?;
            let child_edge = self
                .outgoing(node)
                .find(|e| e.tag() == EdgeTag::Composition && e.kind.identifier() == Some(name))?;
            node = child_edge.to;
            route = route.extended(child_edge.id, node);
        }
        Some((node, route))
    }

    /// Every node on the bus of `start`, excluding `start`.
    pub fn connected_interfaces(&self, start: NodeId) -> Result<Vec<NodeId>, GraphError> {
        Ok(self.bus(start)?.nodes().collect())
    }

    /// Returns `true` if `b` is on the bus of `a`.
    pub fn are_connected(&self, a: NodeId, b: NodeId) -> Result<bool, GraphError> {
        Ok(a == b || self.bus(a)?.nodes().any(|n| n == b))
    }
}
