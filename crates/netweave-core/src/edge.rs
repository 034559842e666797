// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Edge taxonomy: the closed set of relation kinds and their payloads.
//!
//! Each kind carries only its own payload. Traversal code matches on
//! [`EdgeTag`] instead of dispatching through a generic labelled edge, so
//! per-kind invariants (one parent per node, at most one Source per subject)
//! hold without re-validation by consumers.

use std::fmt;
use std::sync::Arc;

use crate::graph::{Graph, Remap};
use crate::path::Path;

/// Relation kind carried by an edge, with its kind-specific payload.
#[derive(Clone, Debug)]
pub enum EdgeKind {
    /// Ownership: `from` is the parent, `to` the child.
    Composition {
        /// Child name, unique among the parent's children.
        name: String,
    },
    /// Instance-of: `from` is the type node, `to` the instance.
    Type {
        /// Identifier the instance was declared under, if any.
        identifier: Option<String>,
    },
    /// Capability attachment: `from` is the host, `to` the trait node.
    Trait,
    /// Non-owning reference from `from` to `to`.
    Pointer {
        /// Discriminates several pointers held by one node.
        identifier: Option<String>,
        /// Optional position among the holder's pointers.
        order: Option<u32>,
    },
    /// Membership of `to` in the operand set of expression `from`.
    Operand {
        /// Named operand slot, if any.
        identifier: Option<String>,
        /// Position in the ordered operand set.
        order: u32,
    },
    /// Provenance: `from` is the subject, `to` the node it was derived from.
    Source,
    /// Symmetric electrical/logical equivalence.
    InterfaceConnection {
        /// Whether the connection propagates to children.
        mode: ConnectionMode,
        /// Path-dependent validity, if any.
        condition: Option<LinkCondition>,
    },
}

impl EdgeKind {
    /// Kind discriminant without payload.
    #[must_use]
    pub fn tag(&self) -> EdgeTag {
        match self {
            Self::Composition { .. } => EdgeTag::Composition,
            Self::Type { .. } => EdgeTag::Type,
            Self::Trait => EdgeTag::Trait,
            Self::Pointer { .. } => EdgeTag::Pointer,
            Self::Operand { .. } => EdgeTag::Operand,
            Self::Source => EdgeTag::Source,
            Self::InterfaceConnection { .. } => EdgeTag::InterfaceConnection,
        }
    }

    /// Identifier payload for kinds that carry one.
    ///
    /// Composition edges report their child name.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::Composition { name } => Some(name),
            Self::Type { identifier }
            | Self::Pointer { identifier, .. }
            | Self::Operand { identifier, .. } => identifier.as_deref(),
            Self::Trait | Self::Source | Self::InterfaceConnection { .. } => None,
        }
    }

    /// Conditional filter for InterfaceConnection edges that carry one.
    #[must_use]
    pub fn condition(&self) -> Option<&LinkCondition> {
        match self {
            Self::InterfaceConnection { condition, .. } => condition.as_ref(),
            _ => None,
        }
    }
}

/// Kind discriminant of an edge.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeTag {
    /// See [`EdgeKind::Composition`].
    Composition,
    /// See [`EdgeKind::Type`].
    Type,
    /// See [`EdgeKind::Trait`].
    Trait,
    /// See [`EdgeKind::Pointer`].
    Pointer,
    /// See [`EdgeKind::Operand`].
    Operand,
    /// See [`EdgeKind::Source`].
    Source,
    /// See [`EdgeKind::InterfaceConnection`].
    InterfaceConnection,
}

impl EdgeTag {
    /// All kinds in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Composition,
        Self::Type,
        Self::Trait,
        Self::Pointer,
        Self::Operand,
        Self::Source,
        Self::InterfaceConnection,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Stable display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Composition => "Composition",
            Self::Type => "Type",
            Self::Trait => "Trait",
            Self::Pointer => "Pointer",
            Self::Operand => "Operand",
            Self::Source => "Source",
            Self::InterfaceConnection => "InterfaceConnection",
        }
    }
}

impl fmt::Display for EdgeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of edge kinds used to scope a traversal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct EdgeKindSet(u8);

impl EdgeKindSet {
    /// No kinds.
    pub const EMPTY: Self = Self(0);
    /// Every kind.
    pub const ALL: Self = Self(0b111_1111);

    /// Set containing exactly `tag`.
    #[must_use]
    pub const fn only(tag: EdgeTag) -> Self {
        Self(tag.bit())
    }

    /// Returns a copy of this set with `tag` added.
    #[must_use]
    pub const fn with(self, tag: EdgeTag) -> Self {
        Self(self.0 | tag.bit())
    }

    /// Returns a copy of this set with `tag` removed.
    #[must_use]
    pub const fn without(self, tag: EdgeTag) -> Self {
        Self(self.0 & !tag.bit())
    }

    /// Membership test.
    #[must_use]
    pub const fn contains(self, tag: EdgeTag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Returns `true` when no kind is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<EdgeTag> for EdgeKindSet {
    fn from_iter<I: IntoIterator<Item = EdgeTag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// Propagation mode of an InterfaceConnection edge.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionMode {
    /// Connecting `a ~ b` also connects every pair of same-named descendants.
    #[default]
    Deep,
    /// Only `a` and `b` themselves are connected.
    Shallow,
}

/// Three-way outcome of a traversal filter.
///
/// The distinction between the two failure kinds is load-bearing: a
/// recoverable failure discards one candidate path, an unrecoverable one
/// ends the whole search.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum FilterResult {
    /// The candidate path is accepted.
    Pass,
    /// Reject this path only; other paths to the same node stay eligible.
    FailRecoverable,
    /// Abort the traversal.
    FailUnrecoverable,
}

impl FilterResult {
    /// Combines two outcomes, keeping the more severe one.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        self.max(other)
    }

    /// Returns `true` for [`FilterResult::Pass`].
    #[must_use]
    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }
}

impl From<bool> for FilterResult {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::FailRecoverable
        }
    }
}

/// Filter function evaluated against the path taken so far.
pub type EdgeFilterFn = dyn Fn(&Graph, &Path) -> FilterResult + Send + Sync;

/// How a [`LinkCondition`] came to exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConditionOrigin {
    /// Supplied directly by the caller.
    Declared,
    /// Generated from the conditions found along a recorded path.
    Derived(Path),
}

/// Conditional filter attached to an InterfaceConnection edge.
#[derive(Clone)]
pub struct LinkCondition {
    filter: Arc<EdgeFilterFn>,
    origin: ConditionOrigin,
}

impl LinkCondition {
    /// Wraps a caller-supplied filter.
    pub fn new<F>(filter: F) -> Self
    where
        F: Fn(&Graph, &Path) -> FilterResult + Send + Sync + 'static,
    {
        Self {
            filter: Arc::new(filter),
            origin: ConditionOrigin::Declared,
        }
    }

    /// Builds the condition of a connection inferred from `path`.
    ///
    /// The derived filter replays every condition found on the
    /// InterfaceConnection edges of `path` and returns the most severe
    /// outcome. A path without conditional edges yields a filter that always
    /// passes.
    #[must_use]
    pub fn derived(graph: &Graph, path: &Path) -> Self {
        let inherited: Vec<Arc<EdgeFilterFn>> = path
            .edges()
            .filter_map(|edge| graph.edge(edge).ok())
            .filter_map(|record| record.kind.condition())
            .map(|condition| Arc::clone(&condition.filter))
            .collect();
        Self {
            filter: Arc::new(move |g: &Graph, p: &Path| {
                inherited
                    .iter()
                    .fold(FilterResult::Pass, |acc, f| acc.and(f(g, p)))
            }),
            origin: ConditionOrigin::Derived(path.clone()),
        }
    }

    /// Evaluates the filter.
    #[must_use]
    pub fn evaluate(&self, graph: &Graph, path: &Path) -> FilterResult {
        (self.filter)(graph, path)
    }

    /// Origin of this condition.
    #[must_use]
    pub fn origin(&self) -> &ConditionOrigin {
        &self.origin
    }

    pub(crate) fn remap_origin(&mut self, remap: &Remap) {
        if let ConditionOrigin::Derived(path) = &self.origin {
            self.origin = ConditionOrigin::Derived(path.remapped(remap));
        }
    }
}

impl fmt::Debug for LinkCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkCondition")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_set_membership() {
        let set = EdgeKindSet::only(EdgeTag::Composition).with(EdgeTag::Pointer);
        assert!(set.contains(EdgeTag::Composition));
        assert!(set.contains(EdgeTag::Pointer));
        assert!(!set.contains(EdgeTag::Trait));
        assert!(!set.without(EdgeTag::Pointer).contains(EdgeTag::Pointer));
        assert!(EdgeTag::ALL.iter().all(|t| EdgeKindSet::ALL.contains(*t)));
        assert!(EdgeKindSet::EMPTY.is_empty());
    }

    #[test]
    fn filter_results_combine_to_most_severe() {
        use FilterResult::{FailRecoverable, FailUnrecoverable, Pass};
        assert_eq!(Pass.and(Pass), Pass);
        assert_eq!(Pass.and(FailRecoverable), FailRecoverable);
        assert_eq!(FailUnrecoverable.and(FailRecoverable), FailUnrecoverable);
        assert_eq!(FilterResult::from(false), FailRecoverable);
    }
}
