// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recursive materialisation of a type into an instance graph.
use tracing::{debug, instrument, trace, warn};

use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::NodeId;
use crate::literal::{Attributes, Literal};
use crate::record::NodeRecord;

use super::reference::hold_under;
use super::{ChildRole, LinkKind, MakeLinkDecl, RefPath, TypeGraph, TypeGraphError};

/// Working state of one instantiation.
struct Build<'a> {
    types: &'a TypeGraph,
    target: &'a mut Graph,
    /// Types currently being built, outermost first.
    stack: Vec<NodeId>,
    /// MakeChild defaults to apply: (child instance, make child).
    defaults: Vec<(NodeId, NodeId)>,
}

impl TypeGraph {
    /// Builds an instance of the type named `type_identifier` in `target`
    /// and returns its root node.
    ///
    /// Structure is built first (children, then links, per type); attribute
    /// values are applied afterwards: MakeChild defaults, then `attributes`.
    /// Keys in `attributes` are dotted paths from the root whose last
    /// segment names the attribute. The root is left unlabelled, so it is
    /// named by its root id and repeated instances stay distinguishable.
    /// On error nothing is left in `target`.
    ///
    /// # Errors
    /// - [`TypeGraphError::UnknownType`] if no type has that name.
    /// - Everything [`instantiate_node`](Self::instantiate_node) reports.
    pub fn instantiate(
        &self,
        target: &mut Graph,
        type_identifier: &str,
        attributes: &Attributes,
    ) -> Result<NodeId, TypeGraphError> {
        let ty = self
            .type_by_name(type_identifier)
            .ok_or_else(|| TypeGraphError::UnknownType(type_identifier.to_owned()))?;
        self.instantiate_node(target, ty, attributes)
    }

    /// Builds an instance of Type node `ty` in `target`.
    ///
    /// # Errors
    /// - [`TypeGraphError::UnresolvedTypeReference`] for a hard child whose
    ///   type was never linked.
    /// - [`TypeGraphError::UnresolvedMount`] when a nested child's host
    ///   path does not resolve.
    /// - [`TypeGraphError::UnresolvedLinkEndpoint`] when a MakeLink path
    ///   does not resolve in the instance.
    /// - [`TypeGraphError::RecursiveType`] when a type contains itself or
    ///   nesting exceeds the configured depth.
    /// - [`TypeGraphError::UnknownAttribute`] /
    ///   [`TypeGraphError::AttributeTypeMismatch`] from the attribute pass.
    #[instrument(level = "debug", skip(self, target, attributes))]
    pub fn instantiate_node(
        &self,
        target: &mut Graph,
        ty: NodeId,
        attributes: &Attributes,
    ) -> Result<NodeId, TypeGraphError> {
        let name = self.require_type(ty)?;
        let root = target.hold(NodeRecord::new(name));
        let mut build = Build {
            types: self,
            target,
            stack: Vec::new(),
            defaults: Vec::new(),
        };
        let result = build
            .structure(root, ty, 0)
            .and_then(|()| build.apply_defaults())
            .and_then(|()| {
                attributes
                    .iter()
                    .try_for_each(|(key, value)| build.apply(root, key, value))
            });
        if let Err(err) = result {
            if let Err(cleanup) = build.target.destroy_subtree(root) {
                warn!(error = %cleanup, "failed to discard partial instance");
            }
            return Err(err);
        }
        debug!(ty = name, root = %root, nodes = build.target.node_count(), "instantiated");
        Ok(root)
    }
}

impl Build<'_> {
    fn structure(&mut self, node: NodeId, ty: NodeId, depth: usize) -> Result<(), TypeGraphError> {
        let types = self.types;
        let type_name = types.require_type(ty)?;
        if depth > types.config().max_instantiation_depth || self.stack.contains(&ty) {
            return Err(TypeGraphError::RecursiveType {
                ty: type_name.to_owned(),
                depth,
            });
        }
        self.stack.push(ty);

        // Nested children wait until their host exists.
        let mut pending = types.make_children(ty);
        while !pending.is_empty() {
            let before = pending.len();
            let mut waiting = Vec::new();
            for make_child in pending {
                let host = match types.make_child_mount(make_child) {
                    None => Some(node),
                    Some(mount) => mount.resolve(self.target, node)?,
                };
                match host {
                    Some(host) => self.child(host, ty, make_child, depth)?,
                    None => waiting.push(make_child),
                }
            }
            if waiting.len() == before {
                return Err(self.stuck_mount(ty, &waiting));
            }
            pending = waiting;
        }

        // Links retry until a pass makes no progress: a connect may route
        // through a pointer declared after it.
        let mut pending = types.make_link_decls(ty);
        while !pending.is_empty() {
            let before = pending.len();
            let mut waiting = Vec::new();
            for decl in pending {
                let lhs = decl.lhs.resolve(self.target, node)?;
                let rhs = decl.rhs.resolve(self.target, node)?;
                match lhs.zip(rhs) {
                    Some((lhs, rhs)) => self.link(lhs, rhs, &decl)?,
                    None => waiting.push(decl),
                }
            }
            if waiting.len() == before {
                return Err(self.stuck_link(node, type_name, &waiting));
            }
            pending = waiting;
        }
        self.stack.pop();
        Ok(())
    }

    fn child(
        &mut self,
        host: NodeId,
        owner: NodeId,
        make_child: NodeId,
        depth: usize,
    ) -> Result<(), TypeGraphError> {
        let types = self.types;
        let identifier = types
            .make_child_identifier(make_child)
            .ok_or(TypeGraphError::NotAMakeChild(make_child))?;
        let Some(child_ty) = types.make_child_type(make_child) else {
            if types.is_soft(make_child) {
                trace!(identifier, "soft child skipped");
                return Ok(());
            }
            let reference = types
                .make_child_type_reference(make_child)
                .and_then(|r| types.type_reference_identifier(r))
                .unwrap_or_default();
            return Err(TypeGraphError::UnresolvedTypeReference {
                ty: types.require_type(owner)?.to_owned(),
                identifier: types.make_child_key(make_child).unwrap_or(identifier).to_owned(),
                reference: reference.to_owned(),
            });
        };
        let child_name = types.require_type(child_ty)?;
        let child = hold_under(self.target, host, NodeRecord::new(child_name), identifier)?;
        if types.make_child_role(make_child) == ChildRole::Trait {
            self.target.add_trait(host, child)?;
        }
        if !types.make_child_attributes(make_child).is_empty() {
            self.defaults.push((child, make_child));
        }
        self.structure(child, child_ty, depth + 1)
    }

    fn stuck_mount(&self, ty: NodeId, waiting: &[NodeId]) -> TypeGraphError {
        let types = self.types;
        let first = waiting.first().copied();
        TypeGraphError::UnresolvedMount {
            ty: types.type_name(ty).unwrap_or_default().to_owned(),
            identifier: first
                .and_then(|mc| types.make_child_identifier(mc))
                .unwrap_or_default()
                .to_owned(),
            path: first
                .and_then(|mc| types.make_child_mount(mc))
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }

    /// Error for the first endpoint among `waiting` that does not resolve.
    fn stuck_link(&self, node: NodeId, type_name: &str, waiting: &[MakeLinkDecl]) -> TypeGraphError {
        let path = waiting
            .iter()
            .flat_map(|decl| [&decl.lhs, &decl.rhs])
            .find(|path| !matches!(path.resolve(self.target, node), Ok(Some(_))))
            .map(ToString::to_string)
            .unwrap_or_default();
        TypeGraphError::UnresolvedLinkEndpoint {
            ty: type_name.to_owned(),
            path,
        }
    }

    fn link(&mut self, lhs: NodeId, rhs: NodeId, decl: &MakeLinkDecl) -> Result<(), TypeGraphError> {
        match &decl.kind {
            LinkKind::InterfaceConnection { shallow } => {
                let result = if *shallow {
                    self.target.connect_shallow(lhs, rhs)
                } else {
                    self.target.connect(lhs, rhs)
                };
                match result {
                    Ok(_) | Err(GraphError::LinkExists { .. }) => {}
                    Err(err) => return Err(err.into()),
                }
            }
            LinkKind::Pointer { identifier } => {
                self.target.add_pointer(lhs, rhs, Some(identifier), None)?;
            }
        }
        trace!(lhs = %decl.lhs, rhs = %decl.rhs, "link materialised");
        Ok(())
    }

    fn apply_defaults(&mut self) -> Result<(), TypeGraphError> {
        let defaults = std::mem::take(&mut self.defaults);
        for (child, make_child) in defaults {
            for (key, value) in self.types.make_child_attributes(make_child) {
                self.apply(child, &key, &value)?;
            }
        }
        Ok(())
    }

    /// Sets attribute `key` (a dotted path relative to `origin`).
    fn apply(&mut self, origin: NodeId, key: &str, value: &Literal) -> Result<(), TypeGraphError> {
        let types = self.types;
        let (prefix, name) = key.rsplit_once('.').unwrap_or(("", key));
        let unknown = |ty: &str| TypeGraphError::UnknownAttribute {
            ty: ty.to_owned(),
            attribute: key.to_owned(),
        };
        let origin_type = self.target.node(origin)?.ty.as_str().to_owned();
        let node = RefPath::parse(prefix)
            .resolve(self.target, origin)?
            .ok_or_else(|| unknown(&origin_type))?;
        let node_type = self.target.node(node)?.ty.as_str().to_owned();
        let expected = types
            .type_by_name(&node_type)
            .and_then(|ty| types.attribute_kind(ty, name))
            .ok_or_else(|| unknown(&node_type))?;
        if value.kind() != expected {
            return Err(TypeGraphError::AttributeTypeMismatch {
                attribute: key.to_owned(),
                expected,
                found: value.kind(),
            });
        }
        self.target
            .node_mut(node)?
            .attrs
            .insert(name.to_owned(), value.clone());
        Ok(())
    }
}
