// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use netweave_core::{
    render_instance, Attributes, Graph, LinkKind, Literal, RefPath, TypeGraph, TypeGraphError,
};
use netweave_dry_tests::{divider_library, init_tracing};

#[test]
fn single_child_instance() {
    init_tracing();
    let mut tg = TypeGraph::new();
    let a = tg.add_type("A").unwrap();
    let b = tg.add_type("B").unwrap();
    tg.add_make_child(a, "x", b).unwrap();

    let mut g = Graph::new();
    let root = tg.instantiate(&mut g, "A", &Attributes::new()).unwrap();
    assert_eq!(g.name(root).unwrap(), g.root_id(root));
    assert_eq!(g.node(root).unwrap().ty.as_str(), "A");
    let children = g.children(root);
    assert_eq!(children.len(), 1);
    let x = children[0];
    assert_eq!(g.relative_name(x).unwrap(), "x");
    assert_eq!(g.node(x).unwrap().ty.as_str(), "B");
    assert_eq!(g.node_count(), 2);
}

#[test]
fn missing_link_endpoint_fails_instantiation() {
    let mut tg = TypeGraph::new();
    let electrical = tg.add_type("Electrical").unwrap();
    let b = tg.add_type("B").unwrap();
    tg.add_make_child(b, "p1", electrical).unwrap();
    let a = tg.add_type("A").unwrap();
    tg.add_make_child(a, "x", b).unwrap();
    tg.add_make_link(
        a,
        &RefPath::children(["x", "p1"]),
        &RefPath::children(["y", "p1"]),
        LinkKind::CONNECT,
    )
    .unwrap();

    let mut g = Graph::new();
    assert_eq!(
        tg.instantiate(&mut g, "A", &Attributes::new()),
        Err(TypeGraphError::UnresolvedLinkEndpoint {
            ty: "A".to_owned(),
            path: "y.p1".to_owned(),
        })
    );
    assert_eq!(g.node_count(), 0);
    assert!(tg.validate_type(a).is_err());
}

#[test]
fn instantiated_types_validate_cleanly() {
    let lib = divider_library();
    for name in ["Electrical", "Resistor", "Divider"] {
        let mut g = Graph::new();
        lib.tg.instantiate(&mut g, name, &Attributes::new()).unwrap();
        assert_eq!(lib.tg.validate_type(lib.ty(name)), Ok(()), "{name}");
    }
}

#[test]
fn divider_links_pointers_and_attributes() {
    let lib = divider_library();
    let mut attrs = Attributes::new();
    attrs.insert("ratio".to_owned(), Literal::Float(0.5));
    attrs.insert("r1.resistance".to_owned(), Literal::Float(10_000.0));

    let mut g = Graph::new();
    let root = lib.tg.instantiate(&mut g, "Divider", &attrs).unwrap();
    let bound = g.bind(root).unwrap();
    let mid_a = bound.at("r1.p2").unwrap().id();
    let mid_b = bound.at("r2.p1").unwrap().id();
    assert!(g.is_directly_connected(mid_a, mid_b));
    assert_eq!(
        g.pointed_by_identifier(root, "top").unwrap(),
        bound.at("r1.p1").map(|n| n.id())
    );
    assert_eq!(bound.attr("ratio"), Some(&Literal::Float(0.5)));
    assert_eq!(
        bound.at("r1").unwrap().attr("resistance"),
        Some(&Literal::Float(10_000.0))
    );
    assert_eq!(bound.at("r2").unwrap().attr("resistance"), None);

    let head = format!("{}|Divider", g.root_id(root));
    let expected = [
        head.as_str(),
        "├── r1|Resistor",
        "│   ├── p1|Electrical",
        "│   └── p2|Electrical",
        "└── r2|Resistor",
        "    ├── p1|Electrical",
        "    └── p2|Electrical",
    ]
    .join("\n");
    assert_eq!(render_instance(&g, root), expected);
}

#[test]
fn instances_share_one_target_graph() {
    let lib = divider_library();
    let mut g = Graph::new();
    let first = lib.tg.instantiate(&mut g, "Resistor", &Attributes::new()).unwrap();
    let second = lib.tg.instantiate(&mut g, "Resistor", &Attributes::new()).unwrap();
    assert_ne!(first, second);
    assert_eq!(g.node_count(), 6);
    assert!(g.is_root(first) && g.is_root(second));

    let pins: Vec<_> = [first, second]
        .iter()
        .flat_map(|root| [*root, g.child_by_name(*root, "p1").unwrap()])
        .collect();
    let names: Vec<String> = pins.iter().map(|n| g.full_name(*n).unwrap()).collect();
    assert_ne!(names[0], names[2]);
    assert_ne!(names[1], names[3]);
    let found = g.nodes_by_names(names.iter().map(String::as_str));
    assert_eq!(found, pins.into_iter().map(Some).collect::<Vec<_>>());
}
