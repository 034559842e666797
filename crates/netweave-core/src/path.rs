// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Immutable routes produced by traversals.

use std::fmt;

use crate::graph::Remap;
use crate::ident::{EdgeId, NodeId};

/// One step of a path: the node reached and the edge used to reach it.
///
/// The first step of every path has no edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Step {
    /// Node reached by this step.
    pub node: NodeId,
    /// Edge traversed to reach `node`; `None` for the starting step.
    pub edge: Option<EdgeId>,
}

/// The last two steps of a path, giving filters one step of context.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Triangle {
    /// Step before the current one.
    pub previous: Step,
    /// Node reached by the last edge.
    pub current: NodeId,
    /// Last edge of the path.
    pub edge: EdgeId,
}

/// Ordered, immutable sequence of steps.
///
/// Paths hold handles only, never nodes, so keeping a path around does not
/// extend the lifetime of anything it mentions.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Path consisting of a single starting node.
    #[must_use]
    pub fn new(start: NodeId) -> Self {
        Self {
            steps: vec![Step {
                node: start,
                edge: None,
            }],
        }
    }

    /// Returns a new path extended by one step.
    #[must_use]
    pub fn extended(&self, edge: EdgeId, node: NodeId) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(Step {
            node,
            edge: Some(edge),
        });
        Self { steps }
    }

    /// Steps in order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of nodes on the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Paths always contain their start; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Starting node.
    #[must_use]
    pub fn first(&self) -> NodeId {
        self.steps[0].node
    }

    /// Last node reached.
    #[must_use]
    pub fn last(&self) -> NodeId {
        self.steps[self.steps.len() - 1].node
    }

    /// Nodes in order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.steps.iter().map(|s| s.node)
    }

    /// Edges in order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.steps.iter().filter_map(|s| s.edge)
    }

    /// Membership test for a node.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.steps.iter().any(|s| s.node == node)
    }

    /// Membership test for an edge.
    #[must_use]
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.steps.iter().any(|s| s.edge == Some(edge))
    }

    /// Position of `node` on the path.
    #[must_use]
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.steps.iter().position(|s| s.node == node)
    }

    /// Returns `true` if `prefix` is a prefix of this path.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.steps.starts_with(&prefix.steps)
    }

    /// Last edge traversed, if the path has more than one node.
    #[must_use]
    pub fn last_edge(&self) -> Option<EdgeId> {
        self.steps.last().and_then(|s| s.edge)
    }

    /// Same route expressed in the handles of a copy.
    ///
    /// Steps whose node or edge was not copied keep their original handle.
    pub(crate) fn remapped(&self, remap: &Remap) -> Self {
        let steps = self
            .steps
            .iter()
            .map(|step| Step {
                node: remap.node(step.node).unwrap_or(step.node),
                edge: step.edge.map(|e| remap.edge(e).unwrap_or(e)),
            })
            .collect();
        Self { steps }
    }

    /// Last edge together with the step preceding it.
    #[must_use]
    pub fn last_triangle(&self) -> Option<Triangle> {
        let n = self.steps.len();
        if n < 2 {
            return None;
        }
        let current = self.steps[n - 1];
        Some(Triangle {
            previous: self.steps[n - 2],
            current: current.node,
            edge: current.edge?,
        })
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path(")?;
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", step.node)?;
        }
        write!(f, ")")
    }
}
