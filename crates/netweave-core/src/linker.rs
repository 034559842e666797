// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Binding of TypeReferences to Type nodes.
//!
//! Type definitions may name types that are declared later. References are
//! therefore created unresolved and bound in a separate pass; whatever is
//! still unbound at the end of compilation is reported by
//! [`Linker::collect_unresolved_type_references`].
use std::collections::HashMap;
use std::hash::BuildHasher;

use rustc_hash::FxHashMap;
use tracing::{debug, instrument, trace};

use crate::ident::NodeId;
use crate::typegraph::{TypeGraph, TypeGraphError};

/// Source of type bindings for a link pass.
pub trait TypeLookup {
    /// Type node a reference named `identifier` should bind to.
    fn lookup_type(&self, identifier: &str) -> Option<NodeId>;
}

impl TypeLookup for TypeGraph {
    fn lookup_type(&self, identifier: &str) -> Option<NodeId> {
        self.type_by_name(identifier)
    }
}

impl<S: BuildHasher> TypeLookup for HashMap<String, NodeId, S> {
    fn lookup_type(&self, identifier: &str) -> Option<NodeId> {
        self.get(identifier).copied()
    }
}

/// Outcome of a link pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkReport {
    /// References bound by this pass, with their types.
    pub linked: Vec<(NodeId, NodeId)>,
    /// References still unbound afterwards.
    pub unresolved: Vec<NodeId>,
}

impl LinkReport {
    /// Returns `true` when nothing is left unbound.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolves TypeReferences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linker;

impl Linker {
    /// Binds `reference` to `ty`. Binding again to the same type is a no-op.
    ///
    /// # Errors
    /// - [`TypeGraphError::AlreadyLinked`] if bound to a different type.
    /// - [`TypeGraphError::NotATypeReference`] / [`TypeGraphError::NotAType`]
    ///   for nodes of the wrong kind.
    pub fn link_type_reference(
        tg: &mut TypeGraph,
        reference: NodeId,
        ty: NodeId,
    ) -> Result<(), TypeGraphError> {
        match tg.resolution(reference) {
            Some(existing) if existing == ty => Ok(()),
            Some(existing) => Err(TypeGraphError::AlreadyLinked { reference, existing }),
            None => {
                tg.set_resolution(reference, ty)?;
                trace!(%reference, %ty, "reference linked");
                Ok(())
            }
        }
    }

    /// Binds `reference` to `ty`, replacing any earlier binding.
    pub fn update_type_reference(
        tg: &mut TypeGraph,
        reference: NodeId,
        ty: NodeId,
    ) -> Result<(), TypeGraphError> {
        let previous = tg.set_resolution(reference, ty)?;
        trace!(%reference, %ty, ?previous, "reference rebound");
        Ok(())
    }

    /// Type `reference` is bound to, if any.
    #[must_use]
    pub fn get_resolved_type(tg: &TypeGraph, reference: NodeId) -> Option<NodeId> {
        tg.resolution(reference)
    }

    /// Every reference in `tg` that is not bound yet, in creation order.
    #[must_use]
    pub fn collect_unresolved_type_references(tg: &TypeGraph) -> Vec<NodeId> {
        tg.type_references()
            .into_iter()
            .filter(|r| tg.resolution(*r).is_none())
            .collect()
    }

    /// Binds every unbound reference whose identifier `lookup` knows.
    #[instrument(level = "debug", skip_all)]
    pub fn link_with(
        tg: &mut TypeGraph,
        lookup: &impl TypeLookup,
    ) -> Result<LinkReport, TypeGraphError> {
        let pending: Vec<(NodeId, Option<NodeId>)> = Self::collect_unresolved_type_references(tg)
            .into_iter()
            .map(|reference| {
                let target = tg
                    .type_reference_identifier(reference)
                    .and_then(|name| lookup.lookup_type(name));
                (reference, target)
            })
            .collect();

        let mut report = LinkReport::default();
        for (reference, target) in pending {
            match target {
                Some(ty) => {
                    Self::link_type_reference(tg, reference, ty)?;
                    report.linked.push((reference, ty));
                }
                None => report.unresolved.push(reference),
            }
        }
        debug!(
            linked = report.linked.len(),
            unresolved = report.unresolved.len(),
            "link pass"
        );
        Ok(report)
    }

    /// Binds every unbound reference to the type of the same name in `tg`.
    pub fn link_all(tg: &mut TypeGraph) -> Result<LinkReport, TypeGraphError> {
        let names: FxHashMap<String, NodeId> = tg
            .types()
            .into_iter()
            .filter_map(|ty| tg.type_name(ty).map(|name| (name.to_owned(), ty)))
            .collect();
        Self::link_with(tg, &names)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn linking_is_explicit_and_checked() {
        let mut tg = TypeGraph::new();
        let reference = tg.add_type_reference("Resistor");
        let resistor = tg.add_type("Resistor").expect("type");
        let capacitor = tg.add_type("Capacitor").expect("type");
        assert_eq!(Linker::get_resolved_type(&tg, reference), None);
        assert_eq!(Linker::collect_unresolved_type_references(&tg), vec![reference]);

        Linker::link_type_reference(&mut tg, reference, resistor).expect("link");
        Linker::link_type_reference(&mut tg, reference, resistor).expect("idempotent");
        assert_eq!(
            Linker::link_type_reference(&mut tg, reference, capacitor),
            Err(TypeGraphError::AlreadyLinked {
                reference,
                existing: resistor
            })
        );
        Linker::update_type_reference(&mut tg, reference, capacitor).expect("update");
        assert_eq!(Linker::get_resolved_type(&tg, reference), Some(capacitor));
        assert!(Linker::collect_unresolved_type_references(&tg).is_empty());
        assert_eq!(
            Linker::link_type_reference(&mut tg, resistor, capacitor),
            Err(TypeGraphError::NotATypeReference(resistor))
        );
    }

    #[test]
    fn passes_use_the_lookup() {
        let mut tg = TypeGraph::new();
        let app = tg.add_type("App").expect("type");
        tg.add_make_child_deferred(app, "r", "Res", None).expect("r");
        tg.add_make_child_deferred(app, "x", "Unknown", None)
            .expect("x");
        let resistor = tg.add_type("Resistor").expect("type");

        let report = Linker::link_all(&mut tg).expect("pass");
        assert!(report.linked.is_empty());
        assert_eq!(report.unresolved.len(), 2);

        let aliases: HashMap<String, NodeId> = [("Res".to_owned(), resistor)].into_iter().collect();
        let report = Linker::link_with(&mut tg, &aliases).expect("pass");
        assert_eq!(report.linked.len(), 1);
        assert!(!report.is_complete());
        assert_eq!(tg.resolve_child_path(app, &["r"]), Some(resistor));
    }
}
