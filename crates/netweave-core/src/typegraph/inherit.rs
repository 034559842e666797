// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Single-level inheritance by structural copy.
use tracing::{debug, instrument};

use crate::ident::NodeId;

use super::{ChildTarget, MakeChildDecl, TypeGraph, TypeGraphError};

impl TypeGraph {
    /// Copies the declared structure of `source` into `target`: MakeChilds
    /// (with their defaults and bindings), MakeLinks, and attribute
    /// declarations. Returns the keys of the copied MakeChilds.
    ///
    /// MakeChild keys listed in `skip` are left out; every other key must be
    /// free on `target`. Links already present on `target` with the same
    /// endpoints and kind, and attributes it already declares, are not
    /// duplicated. Nothing is modified when a collision is reported.
    ///
    /// # Errors
    /// - [`TypeGraphError::NotAType`] if either node is not a Type.
    /// - [`TypeGraphError::ChildAlreadyExists`] for the first colliding key.
    #[instrument(level = "debug", skip(self, skip))]
    pub fn copy_type_structure(
        &mut self,
        target: NodeId,
        source: NodeId,
        skip: &[&str],
    ) -> Result<Vec<String>, TypeGraphError> {
        let target_name = self.require_type(target)?.to_owned();
        self.require_type(source)?;

        let mut plan = Vec::new();
        for make_child in self.make_children(source) {
            let Some(key) = self.make_child_key(make_child) else {
                continue;
            };
            if skip.iter().any(|s| *s == key) {
                continue;
            }
            if self.make_child_by_key(target, key).is_some() {
                return Err(TypeGraphError::ChildAlreadyExists {
                    ty: target_name,
                    identifier: key.to_owned(),
                });
            }
            plan.push((make_child, key.to_owned()));
        }

        let mut copied = Vec::with_capacity(plan.len());
        for (make_child, key) in plan {
            self.copy_make_child(target, make_child)?;
            copied.push(key);
        }

        let existing = self.make_link_decls(target);
        let mut links = 0_usize;
        for decl in self.make_link_decls(source) {
            if existing.contains(&decl) {
                continue;
            }
            self.add_make_link(target, &decl.lhs, &decl.rhs, decl.kind)?;
            links += 1;
        }

        for (name, kind) in self.declared_attributes(source) {
            if self.attribute_kind(target, &name).is_none() {
                self.declare_attribute(target, &name, kind)?;
            }
        }

        debug!(ty = %target_name, children = copied.len(), links, "type structure copied");
        Ok(copied)
    }

    fn copy_make_child(&mut self, target: NodeId, make_child: NodeId) -> Result<NodeId, TypeGraphError> {
        let identifier = self
            .make_child_identifier(make_child)
            .ok_or(TypeGraphError::NotAMakeChild(make_child))?
            .to_owned();
        let reference = self
            .make_child_type_reference(make_child)
            .ok_or(TypeGraphError::NotAMakeChild(make_child))?;
        let reference_name = self
            .type_reference_identifier(reference)
            .unwrap_or_default()
            .to_owned();
        let resolved = self.resolution(reference);

        let mut decl = MakeChildDecl::new(identifier, ChildTarget::Deferred(reference_name))
            .mounted_at(self.make_child_mount(make_child).unwrap_or_default());
        decl.soft = self.is_soft(make_child);
        decl.role = self.make_child_role(make_child);
        let copy = self.add_make_child_with(target, decl)?;

        // Keep the source's binding even when the reference names an alias.
        if let (Some(ty), Some(new_reference)) = (resolved, self.make_child_type_reference(copy)) {
            self.set_resolution(new_reference, ty)?;
        }
        for (key, value) in self.make_child_attributes(make_child) {
            self.set_make_child_attribute(copy, &key, value)?;
        }
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use crate::literal::LiteralKind;
    use crate::typegraph::{LinkKind, RefPath};
    use crate::Linker;

    fn base(tg: &mut TypeGraph) -> (NodeId, NodeId) {
        let electrical = tg.add_type("Electrical").expect("type");
        let two_pin = tg.add_type("TwoPin").expect("type");
        tg.add_make_child(two_pin, "p1", electrical).expect("p1");
        tg.add_make_child(two_pin, "p2", electrical).expect("p2");
        tg.add_make_link(
            two_pin,
            &RefPath::parse("p1"),
            &RefPath::parse("p2"),
            LinkKind::InterfaceConnection { shallow: true },
        )
        .expect("link");
        tg.declare_attribute(two_pin, "package", LiteralKind::Str)
            .expect("attr");
        (electrical, two_pin)
    }

    #[test]
    fn copies_children_links_and_attributes() {
        let mut tg = TypeGraph::new();
        let (electrical, two_pin) = base(&mut tg);
        let cap = tg.add_type("Capacitor").expect("type");
        let copied = tg.copy_type_structure(cap, two_pin, &[]).expect("copy");
        assert_eq!(copied, vec!["p1", "p2"]);
        let reference = tg
            .make_child_type_reference_by_identifier(cap, "p2")
            .expect("p2");
        assert_eq!(Linker::get_resolved_type(&tg, reference), Some(electrical));
        assert_eq!(tg.make_link_decls(cap), tg.make_link_decls(two_pin));
        assert_eq!(tg.attribute_kind(cap, "package"), Some(LiteralKind::Str));
    }

    #[test]
    fn collisions_need_an_explicit_skip() {
        let mut tg = TypeGraph::new();
        let (electrical, two_pin) = base(&mut tg);
        let diode = tg.add_type("Diode").expect("type");
        tg.add_make_child(diode, "p1", electrical).expect("override");
        assert_eq!(
            tg.copy_type_structure(diode, two_pin, &[]),
            Err(TypeGraphError::ChildAlreadyExists {
                ty: "Diode".to_owned(),
                identifier: "p1".to_owned()
            })
        );
        assert_eq!(tg.declared_identifiers(diode), vec!["p1"]);
        assert!(tg.make_links(diode).is_empty());

        let copied = tg.copy_type_structure(diode, two_pin, &["p1"]).expect("copy");
        assert_eq!(copied, vec!["p2"]);
        assert_eq!(tg.declared_identifiers(diode), vec!["p1", "p2"]);
    }
}
