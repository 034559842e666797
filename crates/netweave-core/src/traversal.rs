// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Breadth-first traversal scoped by edge kind and gated by filters.
//!
//! At each step the engine builds the candidate path (the current path
//! extended by the edge under consideration), then evaluates the edge's own
//! condition, if any, and the caller's global filter against it. The most
//! severe outcome wins:
//! - [`FilterResult::Pass`] accepts the candidate and enqueues it;
//! - [`FilterResult::FailRecoverable`] drops the candidate only, so its
//!   target may still be reached through another path;
//! - [`FilterResult::FailUnrecoverable`] ends the search.
use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::edge::{EdgeKindSet, EdgeTag, FilterResult};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::NodeId;
use crate::path::Path;
use crate::record::EdgeRecord;

/// Which endpoint of a directed edge the traversal may leave through.
///
/// InterfaceConnection edges are symmetric and are followed both ways
/// regardless of the direction chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Direction {
    /// Follow edges from `from` to `to`.
    #[default]
    Outgoing,
    /// Follow edges from `to` back to `from`.
    Incoming,
    /// Follow edges either way.
    Both,
}

type GlobalFilter<'f> = Box<dyn Fn(&Graph, &Path, &EdgeRecord) -> FilterResult + 'f>;

/// Configured breadth-first search over one graph.
pub struct Traversal<'g> {
    graph: &'g Graph,
    starts: Vec<NodeId>,
    kinds: EdgeKindSet,
    direction: Direction,
    max_depth: Option<usize>,
    filter: Option<GlobalFilter<'g>>,
}

/// What a traversal found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalOutcome {
    /// Accepted paths in discovery order; starts appear as single-node paths.
    pub paths: Vec<Path>,
    /// The search was ended by [`FilterResult::FailUnrecoverable`].
    pub aborted: bool,
}

impl TraversalOutcome {
    /// Reached nodes in discovery order, starts included.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.paths.iter().map(Path::last)
    }

    /// Accepted path ending at `node`.
    #[must_use]
    pub fn path_to(&self, node: NodeId) -> Option<&Path> {
        self.paths.iter().find(|p| p.last() == node)
    }
}

impl<'g> Traversal<'g> {
    /// Traversal of `graph` following every edge kind outward.
    #[must_use]
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            starts: Vec::new(),
            kinds: EdgeKindSet::ALL,
            direction: Direction::Outgoing,
            max_depth: None,
            filter: None,
        }
    }

    /// Adds a start node.
    #[must_use]
    pub fn start(mut self, start: NodeId) -> Self {
        self.starts.push(start);
        self
    }

    /// Adds several start nodes.
    #[must_use]
    pub fn starts(mut self, starts: impl IntoIterator<Item = NodeId>) -> Self {
        self.starts.extend(starts);
        self
    }

    /// Restricts the edge kinds followed.
    #[must_use]
    pub fn kinds(mut self, kinds: EdgeKindSet) -> Self {
        self.kinds = kinds;
        self
    }

    /// Sets the direction directed edges are followed in.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Limits the number of edges on any accepted path.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Installs a filter evaluated on every candidate step in addition to
    /// the edge's own condition.
    #[must_use]
    pub fn filter(
        mut self,
        filter: impl Fn(&Graph, &Path, &EdgeRecord) -> FilterResult + 'g,
    ) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    fn neighbours(&self, node: NodeId) -> Vec<(&'g EdgeRecord, NodeId)> {
        let graph = self.graph;
        let mut out = Vec::new();
        let follow_out = matches!(self.direction, Direction::Outgoing | Direction::Both);
        let follow_in = matches!(self.direction, Direction::Incoming | Direction::Both);
        for edge in graph.incident(node) {
            if !self.kinds.contains(edge.tag()) {
                continue;
            }
            let symmetric = edge.tag() == EdgeTag::InterfaceConnection;
            if edge.from == node && (follow_out || symmetric) {
                out.push((edge, edge.to));
            } else if edge.to == node && (follow_in || symmetric) {
                out.push((edge, edge.from));
            }
        }
        out
    }

    /// Runs the search.
    pub fn run(&self) -> Result<TraversalOutcome, GraphError> {
        let graph = self.graph;
        let mut outcome = TraversalOutcome::default();
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::new();
        for start in &self.starts {
            graph.check_node(*start)?;
            if visited.insert(*start) {
                let path = Path::new(*start);
                outcome.paths.push(path.clone());
                queue.push_back(path);
            }
        }

        while let Some(path) = queue.pop_front() {
            if self.max_depth.is_some_and(|d| path.len() > d) {
                continue;
            }
            for (edge, next) in self.neighbours(path.last()) {
                if visited.contains(&next) {
                    continue;
                }
                let candidate = path.extended(edge.id, next);
                let own = edge
                    .kind
                    .condition()
                    .map_or(FilterResult::Pass, |c| c.evaluate(graph, &candidate));
                let global = self
                    .filter
                    .as_ref()
                    .map_or(FilterResult::Pass, |f| f(graph, &candidate, edge));
                match own.and(global) {
                    FilterResult::Pass => {
                        visited.insert(next);
                        outcome.paths.push(candidate.clone());
                        queue.push_back(candidate);
                    }
                    FilterResult::FailRecoverable => {}
                    FilterResult::FailUnrecoverable => {
                        debug!(at = %next, "traversal aborted by filter");
                        outcome.aborted = true;
                        return Ok(outcome);
                    }
                }
            }
        }
        Ok(outcome)
    }
}

impl Graph {
    /// Nodes reachable from `starts` through outgoing edges of `kinds`, in
    /// breadth-first order with the starts first.
    pub fn bfs_visit(
        &self,
        starts: impl IntoIterator<Item = NodeId>,
        kinds: EdgeKindSet,
    ) -> Result<Vec<NodeId>, GraphError> {
        Ok(Traversal::new(self)
            .starts(starts)
            .kinds(kinds)
            .run()?
            .nodes()
            .collect())
    }

    /// Shortest accepted path from `from` to `to` over edges of `kinds`,
    /// followed in both directions.
    pub fn find_path(
        &self,
        from: NodeId,
        to: NodeId,
        kinds: EdgeKindSet,
    ) -> Result<Option<Path>, GraphError> {
        self.check_node(to)?;
        let outcome = Traversal::new(self)
            .start(from)
            .kinds(kinds)
            .direction(Direction::Both)
            .run()?;
        Ok(outcome.path_to(to).cloned())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use crate::edge::{ConnectionMode, LinkCondition};
    use crate::record::NodeRecord;

    fn chain() -> (Graph, [NodeId; 4]) {
        let mut g = Graph::new();
        let ids = [0, 1, 2, 3].map(|_| g.hold(NodeRecord::new("Electrical")));
        g.connect(ids[0], ids[1]).expect("0-1");
        g.connect(ids[1], ids[2]).expect("1-2");
        g.add_pointer(ids[2], ids[3], None, None).expect("2->3");
        (g, ids)
    }

    #[test]
    fn kinds_scope_the_search() {
        let (g, ids) = chain();
        let iface = EdgeKindSet::only(EdgeTag::InterfaceConnection);
        assert_eq!(
            g.bfs_visit([ids[2]], iface).expect("bfs"),
            vec![ids[2], ids[1], ids[0]]
        );
        assert_eq!(
            g.bfs_visit([ids[0]], EdgeKindSet::ALL).expect("bfs"),
            vec![ids[0], ids[1], ids[2], ids[3]]
        );
    }

    #[test]
    fn direction_applies_to_directed_edges_only() {
        let (g, ids) = chain();
        let out = Traversal::new(&g)
            .start(ids[3])
            .run()
            .expect("run");
        assert_eq!(out.nodes().collect::<Vec<_>>(), vec![ids[3]]);
        let back = Traversal::new(&g)
            .start(ids[3])
            .direction(Direction::Incoming)
            .run()
            .expect("run");
        assert_eq!(back.nodes().count(), 4);
    }

    #[test]
    fn depth_limit_and_global_filter() {
        let (g, ids) = chain();
        let shallow = Traversal::new(&g).start(ids[0]).max_depth(1).run().expect("run");
        assert_eq!(shallow.nodes().collect::<Vec<_>>(), vec![ids[0], ids[1]]);

        let stop_at_two = ids[2];
        let gated = Traversal::new(&g)
            .start(ids[0])
            .filter(move |_, path, _| {
                if path.last() == stop_at_two {
                    FilterResult::FailUnrecoverable
                } else {
                    FilterResult::Pass
                }
            })
            .run()
            .expect("run");
        assert!(gated.aborted);
        assert_eq!(gated.nodes().collect::<Vec<_>>(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn filters_see_the_candidate_path() {
        let mut g = Graph::new();
        let a = g.hold(NodeRecord::new("Electrical"));
        let b = g.hold(NodeRecord::new("Electrical"));
        g.connect_conditional(
            a,
            b,
            ConnectionMode::Deep,
            LinkCondition::new(move |_, path| FilterResult::from(path.len() == 2 && path.last() == b)),
        )
        .expect("connect");
        let out = g
            .bfs_visit([a], EdgeKindSet::only(EdgeTag::InterfaceConnection))
            .expect("bfs");
        assert_eq!(out, vec![a, b]);
    }

    #[test]
    fn find_path_follows_both_directions() {
        let (g, ids) = chain();
        let path = g
            .find_path(ids[3], ids[0], EdgeKindSet::ALL)
            .expect("search")
            .expect("found");
        assert_eq!(path.nodes().collect::<Vec<_>>(), vec![ids[3], ids[2], ids[1], ids[0]]);
    }
}
