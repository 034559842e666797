// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! MakeChild declarations.
use tracing::trace;

use crate::ident::NodeId;
use crate::literal::Literal;
use crate::record::NodeRecord;

use super::reference::{hold_under, load_path, store_path};
use super::{tags, type_reference_record, RefPath, RefSegment, TypeGraph, TypeGraphError};

/// What a declared child becomes when instantiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChildRole {
    /// Plain structural child.
    #[default]
    Field,
    /// Child that is also attached to its host through a Trait edge.
    Trait,
}

impl ChildRole {
    fn name(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Trait => "trait",
        }
    }
}

/// Type a declared child is created from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildTarget {
    /// A concrete Type node; the reference is bound immediately.
    Type(NodeId),
    /// A type name bound later by the linker.
    Deferred(String),
}

/// Full description of one MakeChild.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MakeChildDecl {
    /// Name of the child under its host.
    pub identifier: String,
    /// Child type.
    pub target: ChildTarget,
    /// Path from the instance root to the host; `None` hosts the child on
    /// the root itself.
    pub mount: Option<RefPath>,
    /// Soft children are skipped at instantiation while their type is
    /// unresolved.
    pub soft: bool,
    /// Structural role.
    pub role: ChildRole,
}

impl MakeChildDecl {
    /// Hard field declaration hosted on the root.
    pub fn new(identifier: impl Into<String>, target: ChildTarget) -> Self {
        Self {
            identifier: identifier.into(),
            target,
            mount: None,
            soft: false,
            role: ChildRole::Field,
        }
    }

    /// Marks the child optional.
    #[must_use]
    pub fn soft(mut self) -> Self {
        self.soft = true;
        self
    }

    /// Hosts the child below `path` instead of the root.
    #[must_use]
    pub fn mounted_at(mut self, path: RefPath) -> Self {
        self.mount = (!path.is_empty()).then_some(path);
        self
    }

    /// Declares the child as a trait of its host.
    #[must_use]
    pub fn as_trait(mut self) -> Self {
        self.role = ChildRole::Trait;
        self
    }

    /// Key the child is registered under on its type: the identifier,
    /// prefixed by the mount path when nested.
    #[must_use]
    pub fn key(&self) -> String {
        self.mount.as_ref().map_or_else(
            || self.identifier.clone(),
            |mount| mount.join(RefSegment::Child(self.identifier.clone())).to_string(),
        )
    }
}

impl TypeGraph {
    /// Declares a hard child of concrete type `child_type`.
    pub fn add_make_child(
        &mut self,
        ty: NodeId,
        identifier: &str,
        child_type: NodeId,
    ) -> Result<NodeId, TypeGraphError> {
        self.add_make_child_with(ty, MakeChildDecl::new(identifier, ChildTarget::Type(child_type)))
    }

    /// Declares a hard child whose type is named but resolved later, hosted
    /// on the root or below `parent_path`.
    pub fn add_make_child_deferred(
        &mut self,
        ty: NodeId,
        identifier: &str,
        type_identifier: &str,
        parent_path: Option<RefPath>,
    ) -> Result<NodeId, TypeGraphError> {
        let mut decl = MakeChildDecl::new(identifier, ChildTarget::Deferred(type_identifier.to_owned()));
        if let Some(path) = parent_path {
            decl = decl.mounted_at(path);
        }
        self.add_make_child_with(ty, decl)
    }

    /// Declares a trait child: instantiated like a field and also attached
    /// to its host through a Trait edge.
    pub fn add_make_trait(
        &mut self,
        ty: NodeId,
        identifier: &str,
        target: ChildTarget,
    ) -> Result<NodeId, TypeGraphError> {
        self.add_make_child_with(ty, MakeChildDecl::new(identifier, target).as_trait())
    }

    /// Declares a child from a full description.
    ///
    /// # Errors
    /// - [`TypeGraphError::NotAType`] if `ty` (or a concrete target) is not
    ///   a Type node.
    /// - [`TypeGraphError::ReservedIdentifier`] if the identifier starts
    ///   with `link#` or `@`.
    /// - [`TypeGraphError::ChildAlreadyExists`] if the key is taken on `ty`.
    pub fn add_make_child_with(
        &mut self,
        ty: NodeId,
        decl: MakeChildDecl,
    ) -> Result<NodeId, TypeGraphError> {
        let type_name = self.require_type(ty)?.to_owned();
        if [tags::LINK_PREFIX, tags::ATTRIBUTE_PREFIX]
            .iter()
            .any(|prefix| decl.identifier.starts_with(prefix))
        {
            return Err(TypeGraphError::ReservedIdentifier {
                ty: type_name,
                identifier: decl.identifier,
            });
        }
        let key = decl.key();
        if self.graph.child_by_name(ty, &key).is_some() {
            return Err(TypeGraphError::ChildAlreadyExists {
                ty: type_name,
                identifier: key,
            });
        }
        let (reference_name, resolved) = match &decl.target {
            ChildTarget::Type(target) => (self.require_type(*target)?.to_owned(), Some(*target)),
            ChildTarget::Deferred(name) => (name.clone(), None),
        };

        let make_child = hold_under(
            &mut self.graph,
            ty,
            NodeRecord::new(tags::MAKE_CHILD)
                .with_attr(tags::ATTR_IDENTIFIER, decl.identifier.as_str())
                .with_attr(tags::ATTR_SOFT, decl.soft)
                .with_attr(tags::ATTR_ROLE, decl.role.name()),
            &key,
        )?;
        if let Err(err) = self.fill_make_child(make_child, &reference_name, resolved, decl.mount.as_ref()) {
            self.graph.destroy_subtree(make_child)?;
            return Err(err);
        }
        trace!(ty = %type_name, key = %key, reference = %reference_name, "make child");
        Ok(make_child)
    }

    /// Adds the type reference and mount chain below a fresh MakeChild.
    fn fill_make_child(
        &mut self,
        make_child: NodeId,
        reference_name: &str,
        resolved: Option<NodeId>,
        mount: Option<&RefPath>,
    ) -> Result<(), TypeGraphError> {
        let reference = hold_under(
            &mut self.graph,
            make_child,
            type_reference_record(reference_name),
            tags::TYPE_REF,
        )?;
        if let Some(target) = resolved {
            self.set_resolution(reference, target)?;
        }
        if let Some(mount) = mount {
            store_path(&mut self.graph, make_child, tags::MOUNT, mount)?;
        }
        Ok(())
    }

    fn is_make_child(&self, node: NodeId) -> bool {
        self.has_tag(node, tags::MAKE_CHILD)
    }

    /// MakeChild nodes of `ty` in declaration order.
    #[must_use]
    pub fn make_children(&self, ty: NodeId) -> Vec<NodeId> {
        self.children_tagged(ty, tags::MAKE_CHILD)
    }

    /// MakeChild registered on `ty` under `key`.
    #[must_use]
    pub fn make_child_by_key(&self, ty: NodeId, key: &str) -> Option<NodeId> {
        self.graph
            .child_by_name(ty, key)
            .filter(|n| self.is_make_child(*n))
    }

    /// Key of a MakeChild on its type.
    #[must_use]
    pub fn make_child_key(&self, make_child: NodeId) -> Option<&str> {
        if !self.is_make_child(make_child) {
            return None;
        }
        self.graph.relative_name(make_child).ok()
    }

    /// Identifier of a MakeChild (its name under the host).
    #[must_use]
    pub fn make_child_identifier(&self, make_child: NodeId) -> Option<&str> {
        self.graph
            .node(make_child)
            .ok()
            .filter(|r| r.ty.as_str() == tags::MAKE_CHILD)?
            .attr(tags::ATTR_IDENTIFIER)?
            .as_str()
    }

    /// Mount path of a nested MakeChild.
    #[must_use]
    pub fn make_child_mount(&self, make_child: NodeId) -> Option<RefPath> {
        load_path(&self.graph, make_child, tags::MOUNT)
    }

    /// Soft flag of a MakeChild.
    #[must_use]
    pub fn is_soft(&self, make_child: NodeId) -> bool {
        self.graph
            .node(make_child)
            .ok()
            .and_then(|r| r.attr(tags::ATTR_SOFT))
            .and_then(Literal::as_bool)
            .unwrap_or(false)
    }

    /// Role of a MakeChild.
    #[must_use]
    pub fn make_child_role(&self, make_child: NodeId) -> ChildRole {
        let role = self
            .graph
            .node(make_child)
            .ok()
            .and_then(|r| r.attr(tags::ATTR_ROLE))
            .and_then(Literal::as_str);
        if role == Some(ChildRole::Trait.name()) {
            ChildRole::Trait
        } else {
            ChildRole::Field
        }
    }

    /// TypeReference held by a MakeChild.
    #[must_use]
    pub fn make_child_type_reference(&self, make_child: NodeId) -> Option<NodeId> {
        if !self.is_make_child(make_child) {
            return None;
        }
        self.graph.child_by_name(make_child, tags::TYPE_REF)
    }

    /// TypeReference of the MakeChild registered on `ty` under `identifier`.
    #[must_use]
    pub fn make_child_type_reference_by_identifier(
        &self,
        ty: NodeId,
        identifier: &str,
    ) -> Option<NodeId> {
        self.make_child_by_key(ty, identifier)
            .and_then(|mc| self.make_child_type_reference(mc))
    }

    /// Resolved type of a MakeChild.
    pub(crate) fn make_child_type(&self, make_child: NodeId) -> Option<NodeId> {
        self.make_child_type_reference(make_child)
            .and_then(|r| self.resolution(r))
    }

    /// Keys of every MakeChild of `ty` in declaration order.
    #[must_use]
    pub fn declared_identifiers(&self, ty: NodeId) -> Vec<String> {
        self.make_children(ty)
            .into_iter()
            .filter_map(|mc| self.make_child_key(mc).map(str::to_owned))
            .collect()
    }

    /// Records a value for attribute `key` of the child instance; applied
    /// after structural instantiation, before caller-supplied attributes.
    pub fn set_make_child_attribute(
        &mut self,
        make_child: NodeId,
        key: &str,
        value: impl Into<Literal>,
    ) -> Result<(), TypeGraphError> {
        if !self.is_make_child(make_child) {
            return Err(TypeGraphError::NotAMakeChild(make_child));
        }
        self.graph
            .node_mut(make_child)?
            .attrs
            .insert(format!("{}{key}", tags::DEFAULT_PREFIX), value.into());
        Ok(())
    }

    /// Attribute values recorded with
    /// [`set_make_child_attribute`](Self::set_make_child_attribute).
    #[must_use]
    pub fn make_child_attributes(&self, make_child: NodeId) -> Vec<(String, Literal)> {
        self.graph
            .node(make_child)
            .map(|record| {
                record
                    .attrs
                    .iter()
                    .filter_map(|(k, v)| {
                        k.strip_prefix(tags::DEFAULT_PREFIX)
                            .map(|name| (name.to_owned(), v.clone()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
