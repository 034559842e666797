// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type graph: type definitions built from the same primitives as instances.
//!
//! A [`TypeGraph`] owns a private [`Graph`] whose roots are Type nodes. Each
//! Type owns, through Composition edges:
//! - MakeChild nodes, named by the child key (`identifier`, or
//!   `mount.identifier` for nested declarations), each holding a
//!   `type_ref` TypeReference and an optional `mount` reference chain;
//! - MakeLink nodes (`link#N`) holding `lhs`/`rhs` reference chains;
//! - attribute declarations (`@name`).
//!
//! A TypeReference is resolved when it holds a Pointer edge named
//! `resolved` to a Type node. References are bound by the
//! [`Linker`](crate::Linker), never implicitly.

mod error;
mod inherit;
mod instantiate;
mod make_child;
mod make_link;
mod reference;
mod validate;

pub use error::TypeGraphError;
pub use make_child::{ChildRole, ChildTarget, MakeChildDecl};
pub use make_link::{LinkKind, MakeLinkDecl};
pub use reference::{RefPath, RefSegment};

use std::ops::ControlFlow;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::TypeGraphConfig;
use crate::edge::{EdgeKind, EdgeTag};
use crate::graph::Graph;
use crate::ident::NodeId;
use crate::literal::LiteralKind;
use crate::record::NodeRecord;

use reference::hold_under;

pub(crate) mod tags {
    pub(crate) const TYPE: &str = "Type";
    pub(crate) const MAKE_CHILD: &str = "MakeChild";
    pub(crate) const MAKE_LINK: &str = "MakeLink";
    pub(crate) const TYPE_REFERENCE: &str = "TypeReference";
    pub(crate) const REFERENCE: &str = "Reference";
    pub(crate) const ATTRIBUTE_DECL: &str = "AttributeDecl";

    pub(crate) const ATTR_NAME: &str = "name";
    pub(crate) const ATTR_IDENTIFIER: &str = "identifier";
    pub(crate) const ATTR_KIND: &str = "kind";
    pub(crate) const ATTR_SOFT: &str = "soft";
    pub(crate) const ATTR_ROLE: &str = "role";
    pub(crate) const ATTR_SHALLOW: &str = "shallow";
    pub(crate) const DEFAULT_PREFIX: &str = "set:";

    pub(crate) const TYPE_REF: &str = "type_ref";
    pub(crate) const MOUNT: &str = "mount";
    pub(crate) const LHS: &str = "lhs";
    pub(crate) const RHS: &str = "rhs";
    pub(crate) const NEXT: &str = "next";
    pub(crate) const RESOLVED: &str = "resolved";

    pub(crate) const LINK_PREFIX: &str = "link#";
    pub(crate) const ATTRIBUTE_PREFIX: &str = "@";
}

pub(crate) fn type_reference_record(identifier: &str) -> NodeRecord {
    NodeRecord::new(tags::TYPE_REFERENCE).with_attr(tags::ATTR_IDENTIFIER, identifier)
}

/// Registry of type definitions and their declared structure.
#[derive(Debug)]
pub struct TypeGraph {
    graph: Graph,
    config: TypeGraphConfig,
    types: FxHashMap<String, NodeId>,
    next_link: u32,
}

impl Default for TypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGraph {
    /// Empty type graph with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TypeGraphConfig::default())
    }

    /// Empty type graph with explicit settings.
    #[must_use]
    pub fn with_config(config: TypeGraphConfig) -> Self {
        Self {
            graph: Graph::with_config(config.graph.clone()),
            config,
            types: FxHashMap::default(),
            next_link: 0,
        }
    }

    /// Underlying graph holding the definitions.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Settings in effect.
    #[must_use]
    pub fn config(&self) -> &TypeGraphConfig {
        &self.config
    }

    fn has_tag(&self, node: NodeId, tag: &str) -> bool {
        self.graph
            .node(node)
            .is_ok_and(|record| record.ty.as_str() == tag)
    }

    /// Defines a new, empty type.
    ///
    /// # Errors
    /// [`TypeGraphError::DuplicateType`] if the name is taken.
    pub fn add_type(&mut self, identifier: &str) -> Result<NodeId, TypeGraphError> {
        if self.types.contains_key(identifier) {
            return Err(TypeGraphError::DuplicateType(identifier.to_owned()));
        }
        let node = self.graph.hold(
            NodeRecord::new(tags::TYPE)
                .with_label(identifier)
                .with_attr(tags::ATTR_NAME, identifier),
        );
        self.types.insert(identifier.to_owned(), node);
        debug!(ty = identifier, "type added");
        Ok(node)
    }

    /// Type node registered under `identifier`.
    #[must_use]
    pub fn type_by_name(&self, identifier: &str) -> Option<NodeId> {
        self.types.get(identifier).copied()
    }

    /// Name of a Type node.
    #[must_use]
    pub fn type_name(&self, ty: NodeId) -> Option<&str> {
        if !self.is_type(ty) {
            return None;
        }
        self.graph
            .node(ty)
            .ok()
            .and_then(|r| r.attr(tags::ATTR_NAME))
            .and_then(|v| v.as_str())
    }

    /// Returns `true` if `node` is a Type node of this graph.
    #[must_use]
    pub fn is_type(&self, node: NodeId) -> bool {
        self.has_tag(node, tags::TYPE)
    }

    pub(crate) fn require_type(&self, node: NodeId) -> Result<&str, TypeGraphError> {
        self.type_name(node).ok_or(TypeGraphError::NotAType(node))
    }

    /// All Type nodes, sorted by name.
    #[must_use]
    pub fn types(&self) -> Vec<NodeId> {
        let mut named: Vec<(&String, &NodeId)> = self.types.iter().collect();
        named.sort();
        named.into_iter().map(|(_, id)| *id).collect()
    }

    /// Creates a free-standing reference to the type named `identifier`,
    /// to be bound later by the [`Linker`](crate::Linker).
    pub fn add_type_reference(&mut self, identifier: &str) -> NodeId {
        self.graph.hold(type_reference_record(identifier))
    }

    /// Returns `true` if `node` is a TypeReference.
    #[must_use]
    pub fn is_type_reference(&self, node: NodeId) -> bool {
        self.has_tag(node, tags::TYPE_REFERENCE)
    }

    /// Identifier a TypeReference names.
    #[must_use]
    pub fn type_reference_identifier(&self, reference: NodeId) -> Option<&str> {
        if !self.is_type_reference(reference) {
            return None;
        }
        self.graph
            .node(reference)
            .ok()
            .and_then(|r| r.attr(tags::ATTR_IDENTIFIER))
            .and_then(|v| v.as_str())
    }

    /// Every TypeReference in creation order.
    #[must_use]
    pub fn type_references(&self) -> Vec<NodeId> {
        self.graph
            .nodes()
            .filter(|(_, r)| r.ty.as_str() == tags::TYPE_REFERENCE)
            .map(|(id, _)| id)
            .collect()
    }

    /// Type a reference is bound to.
    pub(crate) fn resolution(&self, reference: NodeId) -> Option<NodeId> {
        self.graph.visit_pointer_edges(reference, |e| {
            if e.kind.identifier() == Some(tags::RESOLVED) {
                ControlFlow::Break(e.to)
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// Binds `reference` to `ty`, replacing any previous binding. Returns
    /// the previous target.
    pub(crate) fn set_resolution(
        &mut self,
        reference: NodeId,
        ty: NodeId,
    ) -> Result<Option<NodeId>, TypeGraphError> {
        if !self.is_type_reference(reference) {
            return Err(TypeGraphError::NotATypeReference(reference));
        }
        self.require_type(ty)?;
        let previous: Vec<(crate::ident::EdgeId, NodeId)> = self
            .graph
            .outgoing(reference)
            .filter(|e| {
                e.tag() == EdgeTag::Pointer && e.kind.identifier() == Some(tags::RESOLVED)
            })
            .map(|e| (e.id, e.to))
            .collect();
        for (edge, _) in &previous {
            self.graph.remove_edge(*edge)?;
        }
        self.graph.insert_edge(
            reference,
            ty,
            EdgeKind::Pointer {
                identifier: Some(tags::RESOLVED.to_owned()),
                order: None,
            },
        )?;
        Ok(previous.first().map(|(_, to)| *to))
    }

    /// Declares an attribute that instances of `ty` accept.
    ///
    /// # Errors
    /// [`TypeGraphError::ChildAlreadyExists`] if the attribute is already
    /// declared.
    pub fn declare_attribute(
        &mut self,
        ty: NodeId,
        name: &str,
        kind: LiteralKind,
    ) -> Result<NodeId, TypeGraphError> {
        let type_name = self.require_type(ty)?.to_owned();
        let key = format!("{}{name}", tags::ATTRIBUTE_PREFIX);
        if self.graph.child_by_name(ty, &key).is_some() {
            return Err(TypeGraphError::ChildAlreadyExists {
                ty: type_name,
                identifier: key,
            });
        }
        let record = NodeRecord::new(tags::ATTRIBUTE_DECL)
            .with_attr(tags::ATTR_NAME, name)
            .with_attr(tags::ATTR_KIND, kind.name());
        Ok(hold_under(&mut self.graph, ty, record, &key)?)
    }

    /// Declared kind of attribute `name` on `ty`.
    #[must_use]
    pub fn attribute_kind(&self, ty: NodeId, name: &str) -> Option<LiteralKind> {
        let decl = self
            .graph
            .child_by_name(ty, &format!("{}{name}", tags::ATTRIBUTE_PREFIX))?;
        self.graph
            .node(decl)
            .ok()?
            .attr(tags::ATTR_KIND)?
            .as_str()
            .and_then(LiteralKind::from_name)
    }

    /// Attribute declarations of `ty` in declaration order.
    #[must_use]
    pub fn declared_attributes(&self, ty: NodeId) -> Vec<(String, LiteralKind)> {
        self.children_tagged(ty, tags::ATTRIBUTE_DECL)
            .into_iter()
            .filter_map(|decl| {
                let record = self.graph.node(decl).ok()?;
                let name = record.attr(tags::ATTR_NAME)?.as_str()?;
                let kind = record
                    .attr(tags::ATTR_KIND)?
                    .as_str()
                    .and_then(LiteralKind::from_name)?;
                Some((name.to_owned(), kind))
            })
            .collect()
    }

    fn children_tagged(&self, ty: NodeId, tag: &str) -> Vec<NodeId> {
        self.graph
            .children(ty)
            .into_iter()
            .filter(|c| self.has_tag(*c, tag))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn types_are_unique_by_name() {
        let mut tg = TypeGraph::new();
        let r = tg.add_type("Resistor").expect("add");
        assert_eq!(
            tg.add_type("Resistor"),
            Err(TypeGraphError::DuplicateType("Resistor".to_owned()))
        );
        assert_eq!(tg.type_by_name("Resistor"), Some(r));
        assert_eq!(tg.type_name(r), Some("Resistor"));
        let c = tg.add_type("Capacitor").expect("add");
        assert_eq!(tg.types(), vec![c, r]);
    }

    #[test]
    fn attribute_declarations() {
        let mut tg = TypeGraph::new();
        let r = tg.add_type("Resistor").expect("add");
        tg.declare_attribute(r, "resistance", LiteralKind::Float)
            .expect("declare");
        assert!(matches!(
            tg.declare_attribute(r, "resistance", LiteralKind::Int),
            Err(TypeGraphError::ChildAlreadyExists { .. })
        ));
        assert_eq!(tg.attribute_kind(r, "resistance"), Some(LiteralKind::Float));
        assert_eq!(tg.attribute_kind(r, "tolerance"), None);
        assert_eq!(
            tg.declared_attributes(r),
            vec![("resistance".to_owned(), LiteralKind::Float)]
        );
    }

    #[test]
    fn free_standing_references_start_unresolved() {
        let mut tg = TypeGraph::new();
        let reference = tg.add_type_reference("Later");
        assert!(tg.is_type_reference(reference));
        assert_eq!(tg.type_reference_identifier(reference), Some("Later"));
        assert_eq!(tg.resolution(reference), None);
        let later = tg.add_type("Later").expect("add");
        assert_eq!(tg.set_resolution(reference, later), Ok(None));
        assert_eq!(tg.resolution(reference), Some(later));
    }
}
