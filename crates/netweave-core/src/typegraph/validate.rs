// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type-level checks: path resolution against declared structure.
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::ident::NodeId;

use super::{ChildRole, LinkKind, RefPath, RefSegment, TypeGraph, TypeGraphError};

/// One view of a position inside a type: the node at `prefix` below the root
/// of an instance of `ty`. A position is described by every layer that
/// reaches it; the layer with an empty prefix names the node's own type.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Layer {
    ty: NodeId,
    prefix: RefPath,
}

impl Layer {
    fn root(ty: NodeId) -> Self {
        Self {
            ty,
            prefix: RefPath::root(),
        }
    }
}

fn push_unique(layers: &mut Vec<Layer>, layer: Layer) {
    if !layers.contains(&layer) {
        layers.push(layer);
    }
}

impl TypeGraph {
    /// Checks that every instance of `ty` can be built: hard children are
    /// resolved, mounts and link endpoints exist, defaults match declared
    /// attributes, and the type does not contain itself.
    ///
    /// # Errors
    /// The first problem [`validation_errors`](Self::validation_errors)
    /// reports.
    pub fn validate_type(&self, ty: NodeId) -> Result<(), TypeGraphError> {
        match self.validation_errors(ty).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every problem found in `ty`, in declaration order.
    #[must_use]
    pub fn validation_errors(&self, ty: NodeId) -> Vec<TypeGraphError> {
        let Ok(type_name) = self.require_type(ty) else {
            return vec![TypeGraphError::NotAType(ty)];
        };
        let mut errors = Vec::new();

        for make_child in self.make_children(ty) {
            let key = self.make_child_key(make_child).unwrap_or_default();
            let child_ty = self.make_child_type(make_child);
            if child_ty.is_none() && !self.is_soft(make_child) {
                let reference = self
                    .make_child_type_reference(make_child)
                    .and_then(|r| self.type_reference_identifier(r))
                    .unwrap_or_default();
                errors.push(TypeGraphError::UnresolvedTypeReference {
                    ty: type_name.to_owned(),
                    identifier: key.to_owned(),
                    reference: reference.to_owned(),
                });
            }
            if let Some(mount) = self.make_child_mount(make_child) {
                if self.resolve_in_type(ty, &mount).is_none() {
                    errors.push(TypeGraphError::UnresolvedMount {
                        ty: type_name.to_owned(),
                        identifier: self
                            .make_child_identifier(make_child)
                            .unwrap_or_default()
                            .to_owned(),
                        path: mount.to_string(),
                    });
                }
            }
            if let Some(child_ty) = child_ty {
                errors.extend(self.default_errors(make_child, child_ty));
            }
        }

        for decl in self.make_link_decls(ty) {
            for endpoint in [&decl.lhs, &decl.rhs] {
                if self.resolve_in_type(ty, endpoint).is_none() {
                    errors.push(TypeGraphError::UnresolvedLinkEndpoint {
                        ty: type_name.to_owned(),
                        path: endpoint.to_string(),
                    });
                }
            }
        }

        if let Some(depth) = self.recursion_depth(ty) {
            errors.push(TypeGraphError::RecursiveType {
                ty: type_name.to_owned(),
                depth,
            });
        }
        debug!(ty = type_name, errors = errors.len(), "type validated");
        errors
    }

    /// Type reached by following the child names in `path` from `ty`.
    ///
    /// Returns `None` when a hop is not declared or its type is not linked
    /// yet. The empty path returns `ty`.
    #[must_use]
    pub fn resolve_child_path(&self, ty: NodeId, path: &[&str]) -> Option<NodeId> {
        if !self.is_type(ty) {
            return None;
        }
        let position = self.resolve_in_type(ty, &RefPath::children(path.iter().copied()))?;
        position
            .iter()
            .find(|layer| layer.prefix.is_empty())
            .map(|layer| layer.ty)
    }

    fn resolve_in_type(&self, ty: NodeId, path: &RefPath) -> Option<Vec<Layer>> {
        self.resolve_with_budget(ty, path, self.config().max_instantiation_depth)
    }

    fn resolve_with_budget(&self, ty: NodeId, path: &RefPath, budget: usize) -> Option<Vec<Layer>> {
        let mut position = vec![Layer::root(ty)];
        for segment in path.segments() {
            position = self.step(&position, segment, budget)?;
        }
        Some(position)
    }

    fn step(&self, position: &[Layer], segment: &RefSegment, budget: usize) -> Option<Vec<Layer>> {
        let mut next = Vec::new();
        for layer in position {
            match segment {
                RefSegment::Child(_) => {
                    let prefix = layer.prefix.join(segment.clone());
                    if let Some(make_child) = self.make_child_by_key(layer.ty, &prefix.to_string()) {
                        self.enter(&mut next, layer.ty, prefix, make_child);
                    }
                }
                RefSegment::Trait(name) => {
                    let budget = budget.checked_sub(1)?;
                    for make_child in self.make_children(layer.ty) {
                        if self.make_child_role(make_child) != ChildRole::Trait {
                            continue;
                        }
                        let mount = self.make_child_mount(make_child).unwrap_or_default();
                        if !self.lands_on(&mount, layer, budget) {
                            continue;
                        }
                        let wanted = self
                            .make_child_type(make_child)
                            .and_then(|t| self.type_name(t))
                            == Some(name.as_str());
                        if let (true, Some(identifier)) = (wanted, self.make_child_identifier(make_child)) {
                            let prefix = layer.prefix.join(RefSegment::Child(identifier.to_owned()));
                            self.enter(&mut next, layer.ty, prefix, make_child);
                        }
                    }
                }
                RefSegment::Pointer(identifier) => {
                    let budget = budget.checked_sub(1)?;
                    for decl in self.make_link_decls(layer.ty) {
                        let named = matches!(
                            &decl.kind,
                            LinkKind::Pointer { identifier: id } if id == identifier
                        );
                        if !named || !self.lands_on(&decl.lhs, layer, budget) {
                            continue;
                        }
                        for reached in self
                            .resolve_with_budget(layer.ty, &decl.rhs, budget)
                            .unwrap_or_default()
                        {
                            push_unique(&mut next, reached);
                        }
                    }
                }
            }
        }
        (!next.is_empty()).then_some(next)
    }

    /// Returns `true` if `path`, resolved from the root of `layer.ty`,
    /// reaches the position `layer` describes.
    fn lands_on(&self, path: &RefPath, layer: &Layer, budget: usize) -> bool {
        if *path == layer.prefix {
            return true;
        }
        self.resolve_with_budget(layer.ty, path, budget)
            .is_some_and(|position| position.contains(layer))
    }

    fn enter(&self, next: &mut Vec<Layer>, ty: NodeId, prefix: RefPath, make_child: NodeId) {
        push_unique(next, Layer { ty, prefix });
        if let Some(child_ty) = self.make_child_type(make_child) {
            push_unique(next, Layer::root(child_ty));
        }
    }

    /// Defaults recorded on `make_child` checked against `child_ty`.
    fn default_errors(&self, make_child: NodeId, child_ty: NodeId) -> Vec<TypeGraphError> {
        let mut errors = Vec::new();
        for (key, value) in self.make_child_attributes(make_child) {
            let (prefix, name) = key.rsplit_once('.').unwrap_or(("", key.as_str()));
            let holder = self
                .resolve_in_type(child_ty, &RefPath::parse(prefix))
                .and_then(|p| p.into_iter().find(|l| l.prefix.is_empty()))
                .map(|l| l.ty);
            match holder.and_then(|t| self.attribute_kind(t, name).map(|k| (t, k))) {
                Some((_, expected)) if expected != value.kind() => {
                    errors.push(TypeGraphError::AttributeTypeMismatch {
                        attribute: key.clone(),
                        expected,
                        found: value.kind(),
                    });
                }
                Some(_) => {}
                None => errors.push(TypeGraphError::UnknownAttribute {
                    ty: holder
                        .and_then(|t| self.type_name(t))
                        .or_else(|| self.type_name(child_ty))
                        .unwrap_or_default()
                        .to_owned(),
                    attribute: key.clone(),
                }),
            }
        }
        errors
    }

    /// Depth at which `ty` reappears among its own resolved descendants.
    fn recursion_depth(&self, ty: NodeId) -> Option<usize> {
        let mut seen = FxHashSet::default();
        let mut frontier = vec![(ty, 0_usize)];
        while let Some((current, depth)) = frontier.pop() {
            for make_child in self.make_children(current) {
                let Some(child) = self.make_child_type(make_child) else {
                    continue;
                };
                if child == ty {
                    return Some(depth + 1);
                }
                if seen.insert(child) {
                    frontier.push((child, depth + 1));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use crate::literal::LiteralKind;
    use crate::typegraph::{ChildTarget, MakeChildDecl};

    #[test]
    fn child_paths_follow_resolved_types() {
        let mut tg = TypeGraph::new();
        let electrical = tg.add_type("Electrical").expect("type");
        let resistor = tg.add_type("Resistor").expect("type");
        tg.add_make_child(resistor, "p1", electrical).expect("p1");
        let divider = tg.add_type("Divider").expect("type");
        tg.add_make_child(divider, "r1", resistor).expect("r1");
        tg.add_make_child_deferred(divider, "r2", "Later", None)
            .expect("r2");

        assert_eq!(tg.resolve_child_path(divider, &[]), Some(divider));
        assert_eq!(tg.resolve_child_path(divider, &["r1"]), Some(resistor));
        assert_eq!(tg.resolve_child_path(divider, &["r1", "p1"]), Some(electrical));
        assert_eq!(tg.resolve_child_path(divider, &["r2"]), None);
        assert_eq!(tg.resolve_child_path(divider, &["r3"]), None);
    }

    #[test]
    fn reports_every_problem() {
        let mut tg = TypeGraph::new();
        let electrical = tg.add_type("Electrical").expect("type");
        let app = tg.add_type("App").expect("type");
        tg.add_make_child(app, "a", electrical).expect("a");
        tg.add_make_child_deferred(app, "b", "Missing", None)
            .expect("b");
        tg.add_make_child_with(
            app,
            MakeChildDecl::new("c", ChildTarget::Type(electrical)).mounted_at(RefPath::parse("nowhere")),
        )
        .expect("c");
        tg.add_make_link(app, &RefPath::parse("a"), &RefPath::parse("z"), LinkKind::CONNECT)
            .expect("link");

        assert_eq!(
            tg.validation_errors(app),
            vec![
                TypeGraphError::UnresolvedTypeReference {
                    ty: "App".to_owned(),
                    identifier: "b".to_owned(),
                    reference: "Missing".to_owned(),
                },
                TypeGraphError::UnresolvedMount {
                    ty: "App".to_owned(),
                    identifier: "c".to_owned(),
                    path: "nowhere".to_owned(),
                },
                TypeGraphError::UnresolvedLinkEndpoint {
                    ty: "App".to_owned(),
                    path: "z".to_owned(),
                },
            ]
        );
        assert!(tg.validate_type(electrical).is_ok());
    }

    #[test]
    fn pointer_and_trait_hops_resolve_through_declarations() {
        let mut tg = TypeGraph::new();
        let electrical = tg.add_type("Electrical").expect("type");
        let marker = tg.add_type("can_bridge").expect("type");
        let app = tg.add_type("App").expect("type");
        tg.add_make_child(app, "hv", electrical).expect("hv");
        tg.add_make_trait(app, "bridge", ChildTarget::Type(marker))
            .expect("trait");
        tg.add_make_link(
            app,
            &RefPath::parse("#can_bridge"),
            &RefPath::parse("hv"),
            LinkKind::Pointer {
                identifier: "out".to_owned(),
            },
        )
        .expect("pointer");
        tg.add_make_link(
            app,
            &RefPath::parse("#can_bridge.*out"),
            &RefPath::parse("hv"),
            LinkKind::CONNECT,
        )
        .expect("link");
        assert_eq!(tg.validate_type(app), Ok(()));
        assert_eq!(
            tg.resolve_in_type(app, &RefPath::parse("bridge.*out"))
                .and_then(|p| p.into_iter().find(|l| l.prefix.is_empty())),
            Some(Layer::root(electrical))
        );

        tg.add_make_link(
            app,
            &RefPath::parse("bridge.*in"),
            &RefPath::parse("hv"),
            LinkKind::CONNECT,
        )
        .expect("link");
        assert!(matches!(
            tg.validate_type(app),
            Err(TypeGraphError::UnresolvedLinkEndpoint { path, .. }) if path == "bridge.*in"
        ));
    }

    #[test]
    fn defaults_and_recursion() {
        let mut tg = TypeGraph::new();
        let r = tg.add_type("Resistor").expect("type");
        tg.declare_attribute(r, "resistance", LiteralKind::Float)
            .expect("attr");
        let board = tg.add_type("Board").expect("type");
        let mc = tg.add_make_child(board, "r1", r).expect("r1");
        tg.set_make_child_attribute(mc, "resistance", "10k").expect("set");
        tg.set_make_child_attribute(mc, "color", "red").expect("set");
        assert_eq!(
            tg.validation_errors(board),
            vec![
                TypeGraphError::UnknownAttribute {
                    ty: "Resistor".to_owned(),
                    attribute: "color".to_owned(),
                },
                TypeGraphError::AttributeTypeMismatch {
                    attribute: "resistance".to_owned(),
                    expected: LiteralKind::Float,
                    found: LiteralKind::Str,
                },
            ]
        );

        tg.add_make_child(r, "again", board).expect("cycle");
        assert!(tg
            .validation_errors(board)
            .contains(&TypeGraphError::RecursiveType {
                ty: "Board".to_owned(),
                depth: 2
            }));
    }
}
