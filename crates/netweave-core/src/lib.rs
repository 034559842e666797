// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! netweave-core: typed object-relation graph for hardware design compilation.
//!
//! Instances and type definitions live in the same kind of [`Graph`]: nodes
//! with literal attributes, related by seven closed edge kinds
//! (Composition, Type, Trait, Pointer, Operand, Source,
//! InterfaceConnection). A [`TypeGraph`] records types as MakeChild /
//! MakeLink declarations, the [`Linker`] binds forward type references, and
//! [`TypeGraph::instantiate`] materialises a type into an instance graph.
//!
//! All handles are plain copyable ids scoped to the graph that minted them;
//! a [`BoundNode`] pairs one with its graph for convenience.
#![forbid(unsafe_code)]

mod arena;
mod bound;
mod config;
mod edge;
mod edges;
mod error;
mod graph;
mod hierarchy;
mod ident;
mod linker;
mod literal;
mod path;
mod record;
mod render;
mod traversal;
mod typegraph;

/// Node handle bound to its graph.
pub use bound::BoundNode;
/// Construction-time settings.
pub use config::{GraphConfig, TypeGraphConfig};
/// Edge taxonomy and interface-connection conditions.
pub use edge::{
    ConditionOrigin, ConnectionMode, EdgeFilterFn, EdgeKind, EdgeKindSet, EdgeTag, FilterResult,
    LinkCondition,
};
/// Electrical reachability results.
pub use edges::{Bus, BusMember};
/// Structural errors of the graph primitives.
pub use error::GraphError;
/// Graph container, handle remapping, and canonical digests.
pub use graph::{Graph, Hash, Remap};
/// Child queries and naming options.
pub use hierarchy::{ChildQuery, NameOptions};
/// Handles and tags.
pub use ident::{EdgeId, GraphId, HostHandle, NodeId, TypeTag};
/// Type reference resolution.
pub use linker::{LinkReport, Linker, TypeLookup};
/// Attribute values.
pub use literal::{Attributes, Literal, LiteralKind};
/// Traversal routes.
pub use path::{Path, Step, Triangle};
/// Stored node and edge records.
pub use record::{EdgeRecord, NodeRecord};
/// Text rendering of instance and type trees.
pub use render::{render_instance, render_type, HIDDEN_PREFIX};
/// Breadth-first traversal.
pub use traversal::{Direction, Traversal, TraversalOutcome};
/// Type definitions, declarations, and their errors.
pub use typegraph::{
    ChildRole, ChildTarget, LinkKind, MakeChildDecl, MakeLinkDecl, RefPath, RefSegment, TypeGraph,
    TypeGraphError,
};
