// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use netweave_core::{render_type, Attributes, Graph, TypeGraphError};
use netweave_dry_tests::divider_library;

#[test]
fn copy_is_idempotent_once_skip_covers_the_copy() {
    let mut lib = divider_library();
    let base = lib.ty("Divider");
    let derived = lib.tg.add_type("TrimmedDivider").unwrap();

    let copied = lib.tg.copy_type_structure(derived, base, &[]).unwrap();
    assert_eq!(copied, vec!["r1", "r2"]);
    let snapshot = render_type(&lib.tg, derived);
    let links = lib.tg.make_link_decls(derived);

    assert_eq!(
        lib.tg.copy_type_structure(derived, base, &[]),
        Err(TypeGraphError::ChildAlreadyExists {
            ty: "TrimmedDivider".to_owned(),
            identifier: "r1".to_owned(),
        })
    );

    let skip: Vec<&str> = copied.iter().map(String::as_str).collect();
    assert_eq!(lib.tg.copy_type_structure(derived, base, &skip), Ok(Vec::new()));
    assert_eq!(render_type(&lib.tg, derived), snapshot);
    assert_eq!(lib.tg.make_link_decls(derived), links);
}

#[test]
fn overrides_keep_inherited_links_working() {
    let mut lib = divider_library();
    let base = lib.ty("Divider");
    let resistor = lib.ty("Resistor");
    let precise = lib.tg.add_type("PreciseResistor").unwrap();
    lib.tg.copy_type_structure(precise, resistor, &[]).unwrap();

    let derived = lib.tg.add_type("PreciseDivider").unwrap();
    lib.tg.add_make_child(derived, "r1", precise).unwrap();
    lib.tg.copy_type_structure(derived, base, &["r1"]).unwrap();
    assert_eq!(lib.tg.validate_type(derived), Ok(()));

    let mut g = Graph::new();
    let root = lib
        .tg
        .instantiate(&mut g, "PreciseDivider", &Attributes::new())
        .unwrap();
    let r1 = g.child_by_name(root, "r1").unwrap();
    assert_eq!(g.node(r1).unwrap().ty.as_str(), "PreciseResistor");
    let a = g.descend(root, ["r1", "p2"]).unwrap();
    let b = g.descend(root, ["r2", "p1"]).unwrap();
    assert!(g.are_connected(a, b).unwrap());
}
