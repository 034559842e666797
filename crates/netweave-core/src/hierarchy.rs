// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ownership hierarchy: Composition edges, names, and child queries.
use std::borrow::Cow;
use std::ops::ControlFlow;

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::edge::{EdgeKind, EdgeTag};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::{EdgeId, NodeId, TypeTag};
use crate::record::EdgeRecord;

/// Options for [`Graph::full_name_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameOptions {
    /// Append `|<type tag>` of the named node to the full name.
    pub types: bool,
    /// Allow a root to be named by its label or root id. When `false`, naming
    /// a root fails with [`GraphError::NoParent`].
    pub accept_no_parent: bool,
}

impl Default for NameOptions {
    fn default() -> Self {
        Self {
            types: false,
            accept_no_parent: true,
        }
    }
}

type ChildFilter<'q> = Box<dyn Fn(&Graph, NodeId) -> bool + 'q>;

/// Query for [`Graph::get_children`].
pub struct ChildQuery<'q> {
    direct_only: bool,
    types: Vec<TypeTag>,
    include_root: bool,
    sort: Option<bool>,
    filter: Option<ChildFilter<'q>>,
}

impl<'q> ChildQuery<'q> {
    /// Direct children only.
    #[must_use]
    pub fn direct() -> Self {
        Self {
            direct_only: true,
            types: Vec::new(),
            include_root: false,
            sort: None,
            filter: None,
        }
    }

    /// Every Composition descendant.
    #[must_use]
    pub fn transitive() -> Self {
        Self {
            direct_only: false,
            ..Self::direct()
        }
    }

    /// Keeps only nodes whose type tag is `tag`; repeated calls widen the set.
    #[must_use]
    pub fn of_type(mut self, tag: impl Into<TypeTag>) -> Self {
        self.types.push(tag.into());
        self
    }

    /// Also consider the queried node itself.
    #[must_use]
    pub fn including_root(mut self) -> Self {
        self.include_root = true;
        self
    }

    /// Overrides [`GraphConfig::sort_children`](crate::GraphConfig::sort_children).
    #[must_use]
    pub fn sorted(mut self, sort: bool) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Keeps only nodes accepted by `filter`.
    #[must_use]
    pub fn filter(mut self, filter: impl Fn(&Graph, NodeId) -> bool + 'q) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    fn accepts(&self, graph: &Graph, node: NodeId) -> bool {
        let type_ok = self.types.is_empty()
            || graph
                .node(node)
                .is_ok_and(|record| self.types.contains(&record.ty));
        type_ok && self.filter.as_ref().is_none_or(|f| f(graph, node))
    }
}

impl Graph {
    /// Places `child` under `parent` with a name unique among its siblings.
    ///
    /// # Errors
    /// - [`GraphError::AlreadyHasParent`] if `child` already has an owner.
    /// - [`GraphError::DuplicateChildName`] if `name` is taken under `parent`.
    /// - [`GraphError::CyclicAttach`] if `child` is `parent` or one of its
    ///   ancestors.
    pub fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        name: impl Into<String>,
    ) -> Result<EdgeId, GraphError> {
        let name = name.into();
        self.check_node(parent)?;
        self.check_node(child)?;
        if self.get_parent_edge(child).is_some() {
            return Err(GraphError::AlreadyHasParent(child));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(GraphError::CyclicAttach { parent, child });
        }
        if self.child_by_name(parent, &name).is_some() {
            return Err(GraphError::DuplicateChildName { parent, name });
        }
        trace!(%parent, %child, name = %name, "attach");
        self.insert_edge(parent, child, EdgeKind::Composition { name })
    }

    /// Removes `child` from its parent. Its own descendants move with it.
    ///
    /// Returns the former parent and the name the child held under it.
    ///
    /// # Errors
    /// [`GraphError::HasNoParent`] if `child` is a root.
    pub fn detach(&mut self, child: NodeId) -> Result<(NodeId, String), GraphError> {
        self.check_node(child)?;
        let edge = self
            .get_parent_edge(child)
            .map(|e| e.id)
            .ok_or(GraphError::HasNoParent(child))?;
        let record = self.remove_edge(edge)?;
        match record.kind {
            EdgeKind::Composition { name } => Ok((record.from, name)),
            other => Err(GraphError::WrongEdgeKind {
                edge,
                expected: EdgeTag::Composition,
                found: other.tag(),
            }),
        }
    }

    /// Composition edge ending at `node`, if any.
    #[must_use]
    pub fn get_parent_edge(&self, node: NodeId) -> Option<&EdgeRecord> {
        self.incoming(node).find(|e| e.tag() == EdgeTag::Composition)
    }

    /// Owner of `node`.
    #[must_use]
    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.get_parent_edge(node).map(|e| e.from)
    }

    /// Owner of `node` together with the name `node` holds under it.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<(NodeId, &str)> {
        self.get_parent_edge(node)
            .map(|e| (e.from, e.kind.identifier().unwrap_or_default()))
    }

    /// Returns `true` for nodes without an owner.
    #[must_use]
    pub fn is_root(&self, node: NodeId) -> bool {
        self.get_parent_edge(node).is_none()
    }

    /// Topmost ancestor of `node` (the node itself when it is a root).
    #[must_use]
    pub fn root_of(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            current = parent;
        }
        current
    }

    /// Ancestors of `node`, nearest first.
    #[must_use]
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            out.push(parent);
            current = parent;
        }
        out
    }

    /// Returns `true` if `ancestor` lies strictly above `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while let Some(parent) = self.parent_of(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Visits the Composition edges leaving `parent` in insertion order until
    /// the visitor breaks.
    pub fn visit_children_edges<B>(
        &self,
        parent: NodeId,
        mut visit: impl FnMut(&EdgeRecord) -> ControlFlow<B>,
    ) -> Option<B> {
        for edge in self
            .outgoing(parent)
            .filter(|e| e.tag() == EdgeTag::Composition)
        {
            if let ControlFlow::Break(out) = visit(edge) {
                return Some(out);
            }
        }
        None
    }

    /// Direct children in insertion order.
    #[must_use]
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        self.outgoing(parent)
            .filter(|e| e.tag() == EdgeTag::Composition)
            .map(|e| e.to)
            .collect()
    }

    /// Direct child registered under `name`.
    #[must_use]
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.visit_children_edges(parent, |e| {
            if e.kind.identifier() == Some(name) {
                ControlFlow::Break(e.to)
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Follows a sequence of child names from `from`.
    pub fn descend<'a>(
        &self,
        from: NodeId,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Option<NodeId> {
        names
            .into_iter()
            .try_fold(from, |node, name| self.child_by_name(node, name))
    }

    /// Names leading from `ancestor` down to `node`, or `None` if `ancestor`
    /// is not above `node`. Empty when both are the same node.
    #[must_use]
    pub fn relative_path(&self, ancestor: NodeId, node: NodeId) -> Option<Vec<&str>> {
        let mut names = Vec::new();
        let mut current = node;
        while current != ancestor {
            let (parent, name) = self.parent(current)?;
            names.push(name);
            current = parent;
        }
        names.reverse();
        Some(names)
    }

    /// Children of `node` selected by `query`.
    ///
    /// Transitive queries walk breadth-first; sorted results are ordered by
    /// the name path relative to `node`.
    pub fn get_children(
        &self,
        node: NodeId,
        query: &ChildQuery<'_>,
    ) -> Result<Vec<NodeId>, GraphError> {
        self.check_node(node)?;
        let mut found = Vec::new();
        let mut frontier = vec![node];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                for child in self.children(current) {
                    found.push(child);
                    if !query.direct_only {
                        next.push(child);
                    }
                }
            }
            frontier = next;
        }
        let mut selected: Vec<NodeId> = query
            .include_root
            .then_some(node)
            .into_iter()
            .chain(found)
            .filter(|n| query.accepts(self, *n))
            .collect();
        if query.sort.unwrap_or(self.config().sort_children) {
            selected.sort_by_cached_key(|n| self.relative_path(node, *n).unwrap_or_default().join("\0"));
        }
        Ok(selected)
    }

    /// Generated name of a root: `<root_prefix><arena index>`.
    #[must_use]
    pub fn root_id(&self, node: NodeId) -> String {
        format!("{}{}", self.config().root_prefix, node.index())
    }

    /// Name of a node: its Composition name, or for a root its label falling
    /// back to [`root_id`](Self::root_id).
    pub fn name(&self, node: NodeId) -> Result<Cow<'_, str>, GraphError> {
        let record = self.node(node)?;
        if let Some((_, name)) = self.parent(node) {
            return Ok(Cow::Borrowed(name));
        }
        Ok(record
            .label
            .as_deref()
            .map_or_else(|| Cow::Owned(self.root_id(node)), Cow::Borrowed))
    }

    /// Composition name of a node that must have a parent.
    pub fn relative_name(&self, node: NodeId) -> Result<&str, GraphError> {
        self.check_node(node)?;
        self.parent(node)
            .map(|(_, name)| name)
            .ok_or(GraphError::NoParent(node))
    }

    /// Dotted name from the root down to `node`.
    pub fn full_name(&self, node: NodeId) -> Result<String, GraphError> {
        self.full_name_with(node, NameOptions::default())
    }

    /// Dotted name from the root down to `node` with explicit options.
    ///
    /// A parent flagged `no_include_parents_in_full_name` hides itself and
    /// everything above it; a flagged root contributes no segment.
    pub fn full_name_with(&self, node: NodeId, opts: NameOptions) -> Result<String, GraphError> {
        self.check_node(node)?;
        if !opts.accept_no_parent && self.is_root(node) {
            return Err(GraphError::NoParent(node));
        }
        let mut segments: Vec<Cow<'_, str>> = Vec::new();
        let mut current = node;
        loop {
            match self.parent(current) {
                Some((parent, name)) => {
                    segments.push(Cow::Borrowed(name));
                    if self.node(parent)?.no_include_parents_in_full_name {
                        break;
                    }
                    current = parent;
                }
                None => {
                    if !self.node(current)?.no_include_parents_in_full_name {
                        segments.push(self.name(current)?);
                    }
                    break;
                }
            }
        }
        let sep = self.config().name_separator;
        let mut out = String::new();
        for (i, name) in segments.iter().rev().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_str(name);
        }
        if opts.types {
            out.push(self.config().type_separator);
            out.push_str(self.node(node)?.ty.as_str());
        }
        Ok(out)
    }

    /// Chain of `(node, name)` pairs from the root down to `node`.
    pub fn hierarchy(&self, node: NodeId) -> Result<Vec<(NodeId, String)>, GraphError> {
        self.check_node(node)?;
        let mut chain = vec![node];
        chain.extend(self.ancestors(node));
        chain.reverse();
        chain
            .into_iter()
            .map(|n| self.name(n).map(|name| (n, name.into_owned())))
            .collect()
    }

    /// Resolves full names to nodes in one pass over the vertex set.
    ///
    /// The result is aligned with `names`. When two nodes share a full name
    /// the first in arena order wins.
    pub fn nodes_by_names<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Option<NodeId>> {
        let mut index: FxHashMap<String, NodeId> = FxHashMap::default();
        for (id, _) in self.nodes() {
            if let Ok(name) = self.full_name(id) {
                index.entry(name).or_insert(id);
            }
        }
        names
            .into_iter()
            .map(|name| index.get(name).copied())
            .collect()
    }
}
