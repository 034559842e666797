// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph container: owns node and edge records and a lazily derived
//! adjacency cache.
use std::cell::OnceCell;
use std::fmt;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::config::GraphConfig;
use crate::edge::{ConditionOrigin, EdgeKind, EdgeTag, LinkCondition};
use crate::error::GraphError;
use crate::ident::{EdgeId, GraphId, NodeId};
use crate::record::{EdgeRecord, NodeRecord};

/// Canonical 256-bit digest of a graph's structure.
pub type Hash = [u8; 32];

/// Handle translation produced by [`Graph::copy_into`] and [`Graph::merge`].
#[derive(Clone, Debug, Default)]
pub struct Remap {
    /// Source node handle to target node handle.
    pub nodes: FxHashMap<NodeId, NodeId>,
    /// Source edge handle to target edge handle.
    pub edges: FxHashMap<EdgeId, EdgeId>,
}

impl Remap {
    /// Target handle of a copied node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).copied()
    }

    /// Target handle of a copied edge.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<EdgeId> {
        self.edges.get(&id).copied()
    }
}

/// Per-endpoint edge lists, each in insertion order.
#[derive(Clone, Debug, Default)]
struct Adjacency {
    outgoing: FxHashMap<NodeId, Vec<EdgeId>>,
    incoming: FxHashMap<NodeId, Vec<EdgeId>>,
}

/// In-memory object-relation graph for one connected design.
///
/// Invariants
/// - Every edge references two live nodes of this graph.
/// - A node is the `to` end of at most one Composition edge.
/// - The adjacency cache, when present, lists exactly the live edges of each
///   endpoint in insertion order. Bulk rewrites drop it through
///   [`Graph::invalidate`]; the next query rebuilds it from the edge arena.
pub struct Graph {
    id: GraphId,
    config: GraphConfig,
    nodes: Arena<NodeRecord>,
    edges: Arena<EdgeRecord>,
    adjacency: OnceCell<Adjacency>,
    next_seq: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("cache_valid", &self.is_cache_valid())
            .finish()
    }
}

impl Graph {
    /// Creates an empty graph with default naming conventions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    /// Creates an empty graph with the given configuration.
    #[must_use]
    pub fn with_config(config: GraphConfig) -> Self {
        let id = GraphId::fresh();
        debug!(graph = %id, "graph created");
        Self {
            id,
            config,
            nodes: Arena::default(),
            edges: Arena::default(),
            adjacency: OnceCell::new(),
            next_seq: 0,
        }
    }

    /// Identifier embedded in every handle this graph issues.
    #[must_use]
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// Naming conventions in effect.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Places a detached node record into the vertex set.
    pub fn hold(&mut self, record: NodeRecord) -> NodeId {
        let slot = self.nodes.insert(record);
        let id = NodeId {
            graph: self.id,
            slot,
        };
        trace!(node = %id, "node held");
        id
    }

    fn check_graph(&self, found: GraphId) -> Result<(), GraphError> {
        if found == self.id {
            Ok(())
        } else {
            Err(GraphError::ForeignHandle {
                expected: self.id,
                found,
            })
        }
    }

    /// Fails unless `id` refers to a live node of this graph.
    pub fn check_node(&self, id: NodeId) -> Result<(), GraphError> {
        self.node(id).map(|_| ())
    }

    /// Returns `true` if `id` refers to a live node of this graph.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        id.graph == self.id && self.nodes.contains(id.slot)
    }

    /// Returns `true` if `id` refers to a live edge of this graph.
    #[must_use]
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        id.graph == self.id && self.edges.contains(id.slot)
    }

    /// Looks up a node record.
    pub fn node(&self, id: NodeId) -> Result<&NodeRecord, GraphError> {
        self.check_graph(id.graph)?;
        self.nodes.get(id.slot).ok_or(GraphError::NodeNotFound(id))
    }

    /// Mutable access to a node record.
    ///
    /// Records carry no structural data, so editing one never stales the
    /// adjacency cache.
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord, GraphError> {
        self.check_graph(id.graph)?;
        self.nodes.get_mut(id.slot).ok_or(GraphError::NodeNotFound(id))
    }

    /// Looks up an edge record.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeRecord, GraphError> {
        self.check_graph(id.graph)?;
        self.edges.get(id.slot).ok_or(GraphError::EdgeNotFound(id))
    }

    /// Looks up an edge and checks its kind.
    pub fn edge_of_kind(&self, id: EdgeId, expected: EdgeTag) -> Result<&EdgeRecord, GraphError> {
        let record = self.edge(id)?;
        if record.tag() == expected {
            Ok(record)
        } else {
            Err(GraphError::WrongEdgeKind {
                edge: id,
                expected,
                found: record.tag(),
            })
        }
    }

    /// Live nodes in arena order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeRecord)> + '_ {
        self.nodes.iter().map(move |(slot, record)| {
            (
                NodeId {
                    graph: self.id,
                    slot,
                },
                record,
            )
        })
    }

    /// Live edges in arena order.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.edges.iter().map(|(_, record)| record)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Drops the adjacency cache; the next query re-derives it.
    pub fn invalidate(&mut self) {
        if self.adjacency.take().is_some() {
            trace!(graph = %self.id, "adjacency cache invalidated");
        }
    }

    /// Returns `true` while a derived adjacency cache is held.
    #[must_use]
    pub fn is_cache_valid(&self) -> bool {
        self.adjacency.get().is_some()
    }

    fn adjacency(&self) -> &Adjacency {
        self.adjacency.get_or_init(|| {
            let mut ordered: Vec<&EdgeRecord> = self.edges().collect();
            ordered.sort_by_key(|e| e.seq);
            let mut adjacency = Adjacency::default();
            for edge in ordered {
                adjacency.outgoing.entry(edge.from).or_default().push(edge.id);
                adjacency.incoming.entry(edge.to).or_default().push(edge.id);
            }
            trace!(graph = %self.id, edges = self.edges.len(), "adjacency cache rebuilt");
            adjacency
        })
    }

    /// Edges whose `from` endpoint is `node`, in insertion order.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.adjacency()
            .outgoing
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(move |e| self.edges.get(e.slot))
    }

    /// Edges whose `to` endpoint is `node`, in insertion order.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.adjacency()
            .incoming
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(move |e| self.edges.get(e.slot))
    }

    /// Every edge touching `node`; a self-loop is reported once.
    pub fn incident(&self, node: NodeId) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.outgoing(node)
            .chain(self.incoming(node).filter(move |e| e.from != node))
    }

    /// Inserts an edge between two live nodes and updates a live cache in
    /// place. Kind-specific rules are checked by the callers.
    pub(crate) fn insert_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        kind: EdgeKind,
    ) -> Result<EdgeId, GraphError> {
        self.check_node(from)?;
        self.check_node(to)?;
        let id = EdgeId {
            graph: self.id,
            slot: self.edges.peek_key(),
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        trace!(edge = %id, %from, %to, kind = %kind.tag(), "edge inserted");
        let slot = self.edges.insert(EdgeRecord {
            id,
            from,
            to,
            kind,
            seq,
        });
        debug_assert_eq!(slot, id.slot);
        if let Some(adjacency) = self.adjacency.get_mut() {
            adjacency.outgoing.entry(from).or_default().push(id);
            adjacency.incoming.entry(to).or_default().push(id);
        }
        Ok(id)
    }

    /// Removes one edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeRecord, GraphError> {
        self.check_graph(id.graph)?;
        let record = self.edges.remove(id.slot).ok_or(GraphError::EdgeNotFound(id))?;
        if let Some(adjacency) = self.adjacency.get_mut() {
            if let Some(list) = adjacency.outgoing.get_mut(&record.from) {
                list.retain(|e| *e != id);
            }
            if let Some(list) = adjacency.incoming.get_mut(&record.to) {
                list.retain(|e| *e != id);
            }
        }
        trace!(edge = %id, kind = %record.tag(), "edge removed");
        Ok(record)
    }

    /// Destroys a node and every edge touching it.
    ///
    /// # Errors
    /// [`GraphError::HasChildren`] if the node still owns children; detach or
    /// [`destroy_subtree`](Self::destroy_subtree) them first.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<NodeRecord, GraphError> {
        self.check_node(id)?;
        if self.outgoing(id).any(|e| e.tag() == EdgeTag::Composition) {
            return Err(GraphError::HasChildren(id));
        }
        let touching: Vec<EdgeId> = self.incident(id).map(|e| e.id).collect();
        for edge in touching {
            self.remove_edge(edge)?;
        }
        if let Some(adjacency) = self.adjacency.get_mut() {
            adjacency.outgoing.remove(&id);
            adjacency.incoming.remove(&id);
        }
        let record = self.nodes.remove(id.slot).ok_or(GraphError::NodeNotFound(id))?;
        trace!(node = %id, "node destroyed");
        Ok(record)
    }

    /// Destroys `root` and all of its Composition descendants together with
    /// every edge touching any of them. Returns the number of nodes removed.
    pub fn destroy_subtree(&mut self, root: NodeId) -> Result<usize, GraphError> {
        self.check_node(root)?;
        let mut doomed = vec![root];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            doomed.extend(
                self.outgoing(current)
                    .filter(|e| e.tag() == EdgeTag::Composition)
                    .map(|e| e.to),
            );
            cursor += 1;
        }
        let touching: Vec<EdgeId> = {
            let mut ids: Vec<EdgeId> = doomed
                .iter()
                .flat_map(|n| self.incident(*n).map(|e| e.id))
                .collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        for edge in touching {
            self.edges.remove(edge.slot);
        }
        for node in &doomed {
            self.nodes.remove(node.slot);
        }
        self.invalidate();
        debug!(root = %root, nodes = doomed.len(), "subtree destroyed");
        Ok(doomed.len())
    }

    /// Structurally copies every node and edge of `self` into `target`.
    ///
    /// Edge insertion order is preserved. Derived link conditions have their
    /// recorded origin path translated to the new handles; caller-supplied
    /// filters are shared as-is and keep whatever handles they captured.
    pub fn copy_into(&self, target: &mut Self) -> Remap {
        let mut remap = Remap::default();
        for (id, record) in self.nodes() {
            let new_id = target.hold(record.clone());
            remap.nodes.insert(id, new_id);
        }
        let mut ordered: Vec<&EdgeRecord> = self.edges().collect();
        ordered.sort_by_key(|e| e.seq);
        let mut derived = Vec::new();
        for edge in ordered {
            let (Some(from), Some(to)) = (remap.node(edge.from), remap.node(edge.to)) else {
                continue;
            };
            let id = EdgeId {
                graph: target.id,
                slot: target.edges.peek_key(),
            };
            let seq = target.next_seq;
            target.next_seq += 1;
            target.edges.insert(EdgeRecord {
                id,
                from,
                to,
                kind: edge.kind.clone(),
                seq,
            });
            remap.edges.insert(edge.id, id);
            if matches!(
                edge.kind.condition().map(LinkCondition::origin),
                Some(ConditionOrigin::Derived(_))
            ) {
                derived.push(id);
            }
        }
        for id in derived {
            if let Some(record) = target.edges.get_mut(id.slot) {
                if let EdgeKind::InterfaceConnection {
                    condition: Some(condition),
                    ..
                } = &mut record.kind
                {
                    condition.remap_origin(&remap);
                }
            }
        }
        target.invalidate();
        debug!(
            source = %self.id,
            target = %target.id,
            nodes = remap.nodes.len(),
            edges = remap.edges.len(),
            "graph copied"
        );
        remap
    }

    /// Absorbs `other` into this graph.
    ///
    /// This is the only way two graphs combine: an edge between handles of
    /// two different graphs is rejected with [`GraphError::ForeignHandle`]
    /// until one side has been merged into the other. The returned [`Remap`]
    /// re-points every handle `other` issued.
    pub fn merge(&mut self, other: Self) -> Remap {
        let remap = other.copy_into(self);
        debug!(into = %self.id, from = %other.id, "graphs merged");
        remap
    }

    /// Collapses a set of found handles to the distinct live nodes they name.
    ///
    /// A traversal may reach one node through several edges; the projection
    /// keeps each node once, in first-seen order, and drops stale handles.
    pub fn node_projection(&self, found: impl IntoIterator<Item = NodeId>) -> Vec<NodeId> {
        let mut seen = rustc_hash::FxHashSet::default();
        found
            .into_iter()
            .filter(|n| self.contains_node(*n) && seen.insert(*n))
            .collect()
    }

    /// Digest of the graph structure independent of arena slot layout.
    ///
    /// Nodes are keyed by hierarchical name (unlabelled roots hash as
    /// anonymous), type tag, and attributes; edges by endpoint keys, kind, and
    /// payload. Both sets are sorted before hashing, so equal structures built
    /// in different orders hash equal.
    #[must_use]
    pub fn canonical_hash(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"NETWEAVE_GRAPH_HASH_V1\0");

        let keys: FxHashMap<NodeId, Vec<u8>> =
            self.nodes().map(|(id, _)| (id, self.canonical_key(id))).collect();

        let mut nodes: Vec<Vec<u8>> = self
            .nodes()
            .map(|(id, record)| {
                let mut buf = keys.get(&id).cloned().unwrap_or_default();
                buf.extend_from_slice(b"\0T");
                buf.extend_from_slice(record.ty.as_str().as_bytes());
                for (key, value) in &record.attrs {
                    buf.extend_from_slice(b"\0A");
                    buf.extend_from_slice(key.as_bytes());
                    buf.push(b'=');
                    buf.extend_from_slice(value.kind().name().as_bytes());
                    buf.push(b':');
                    buf.extend_from_slice(value.to_string().as_bytes());
                }
                buf
            })
            .collect();
        nodes.sort_unstable();
        hasher.update(&(nodes.len() as u64).to_le_bytes());
        for node in &nodes {
            hasher.update(b"N\0");
            hasher.update(&(node.len() as u64).to_le_bytes());
            hasher.update(node);
        }

        let mut edges: Vec<Vec<u8>> = self
            .edges()
            .map(|edge| {
                let mut buf = Vec::new();
                for endpoint in [edge.from, edge.to] {
                    let key = keys.get(&endpoint).map_or(&[][..], Vec::as_slice);
                    buf.extend_from_slice(&(key.len() as u64).to_le_bytes());
                    buf.extend_from_slice(key);
                }
                buf.extend_from_slice(edge.tag().name().as_bytes());
                match &edge.kind {
                    EdgeKind::Pointer { order, .. } => {
                        buf.extend_from_slice(&order.map_or(u64::MAX, u64::from).to_le_bytes());
                    }
                    EdgeKind::Operand { order, .. } => {
                        buf.extend_from_slice(&u64::from(*order).to_le_bytes());
                    }
                    EdgeKind::InterfaceConnection { mode, condition } => {
                        buf.push(*mode as u8);
                        buf.push(u8::from(condition.is_some()));
                    }
                    _ => {}
                }
                if let Some(ident) = edge.kind.identifier() {
                    buf.push(b'#');
                    buf.extend_from_slice(ident.as_bytes());
                }
                buf
            })
            .collect();
        edges.sort_unstable();
        hasher.update(&(edges.len() as u64).to_le_bytes());
        for edge in &edges {
            hasher.update(b"E\0");
            hasher.update(&(edge.len() as u64).to_le_bytes());
            hasher.update(edge);
        }

        *hasher.finalize().as_bytes()
    }

    /// Hierarchical key of a node with anonymous roots.
    fn canonical_key(&self, node: NodeId) -> Vec<u8> {
        let mut parts = Vec::new();
        let mut current = node;
        while let Some(edge) = self.get_parent_edge(current) {
            parts.push(edge.kind.identifier().unwrap_or_default());
            current = edge.from;
        }
        let root = self
            .node(current)
            .ok()
            .and_then(|r| r.label.as_deref())
            .unwrap_or("~");
        parts.push(root);
        parts.reverse();
        parts.join("\u{1f}").into_bytes()
    }
}
