// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use netweave_core::{Attributes, ChildTarget, Graph, Linker, MakeChildDecl, TypeGraph};

#[test]
fn mutual_forward_references_close() {
    let mut tg = TypeGraph::new();
    let to_b = tg.add_type_reference("B");
    let to_a = tg.add_type_reference("A");
    assert_eq!(Linker::collect_unresolved_type_references(&tg), vec![to_b, to_a]);

    let a = tg.add_type("A").unwrap();
    let b = tg.add_type("B").unwrap();
    Linker::link_type_reference(&mut tg, to_b, b).unwrap();
    Linker::link_type_reference(&mut tg, to_a, a).unwrap();
    assert!(Linker::collect_unresolved_type_references(&tg).is_empty());
    assert_eq!(Linker::get_resolved_type(&tg, to_a), Some(a));
}

#[test]
fn forward_declared_children_instantiate_after_linking() {
    let mut tg = TypeGraph::new();
    let app = tg.add_type("App").unwrap();
    tg.add_make_child_deferred(app, "psu", "Power", None).unwrap();
    tg.add_make_child_with(
        app,
        MakeChildDecl::new("debug", ChildTarget::Deferred("DebugHeader".to_owned())).soft(),
    )
    .unwrap();
    let mut g = Graph::new();
    assert!(tg.instantiate(&mut g, "App", &Attributes::new()).is_err());

    let electrical = tg.add_type("Electrical").unwrap();
    let power = tg.add_type("Power").unwrap();
    tg.add_make_child(power, "hv", electrical).unwrap();

    let report = Linker::link_all(&mut tg).unwrap();
    assert_eq!(report.linked.len(), 1);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(tg.resolve_child_path(app, &["psu", "hv"]), Some(electrical));

    let root = tg.instantiate(&mut g, "App", &Attributes::new()).unwrap();
    assert_eq!(
        g.full_name(g.descend(root, ["psu", "hv"]).unwrap()).unwrap(),
        format!("{}.psu.hv", g.root_id(root))
    );
    assert!(g.child_by_name(root, "debug").is_none());
}
