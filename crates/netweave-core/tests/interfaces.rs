// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use netweave_core::{
    ConditionOrigin, ConnectionMode, FilterResult, GraphError, LinkCondition, Path,
};
use netweave_dry_tests::{init_tracing, TreeBuilder};

#[test]
fn deep_connections_reach_matching_descendants() {
    init_tracing();
    let mut tree = TreeBuilder::new("top")
        .with_typed_path("i2c_a.scl", "Electrical")
        .with_typed_path("i2c_a.sda", "Electrical")
        .with_typed_path("i2c_b.scl", "Electrical")
        .with_typed_path("i2c_b.sda", "Electrical")
        .with_typed_path("i2c_c.scl", "Electrical")
        .build();
    let (a, b, c) = (tree.at("i2c_a"), tree.at("i2c_b"), tree.at("i2c_c"));
    let (a_scl, b_scl, c_scl) = (tree.at("i2c_a.scl"), tree.at("i2c_b.scl"), tree.at("i2c_c.scl"));
    let (a_sda, b_sda) = (tree.at("i2c_a.sda"), tree.at("i2c_b.sda"));
    let g = &mut tree.graph;

    g.connect(a, b).unwrap();
    g.connect_shallow(b, c).unwrap();

    assert!(g.are_connected(a_scl, b_scl).unwrap());
    assert!(g.are_connected(b_sda, a_sda).unwrap());
    assert!(g.are_connected(a, c).unwrap());
    // Shallow edges stop at the endpoints.
    assert!(!g.are_connected(b_scl, c_scl).unwrap());
    assert!(!g.is_directly_connected(a_scl, b_scl));

    assert!(matches!(g.connect(b, a), Err(GraphError::LinkExists { .. })));
    assert_eq!(g.connect(a, a), Err(GraphError::SelfConnection(a)));
}

#[test]
fn conditions_see_the_full_route() {
    let mut tree = TreeBuilder::new("top")
        .with_typed_path("left.hv", "Electrical")
        .with_typed_path("right.hv", "Electrical")
        .with_typed_path("far", "Electrical")
        .build();
    let (left, right, far) = (tree.at("left"), tree.at("right"), tree.at("far"));
    let (left_hv, right_hv) = (tree.at("left.hv"), tree.at("right.hv"));
    let g = &mut tree.graph;

    // Rejects routes that enter through the hierarchy.
    g.connect_conditional(
        left,
        right,
        ConnectionMode::Deep,
        LinkCondition::new(|_, path| (path.len() <= 2).into()),
    )
    .unwrap();
    g.connect(right, far).unwrap();

    assert!(g.are_connected(left, far).unwrap());
    assert!(!g.are_connected(left_hv, right_hv).unwrap());

    let route = g.bus(left).unwrap();
    let far_member = route.members.iter().find(|m| m.node == far).unwrap();
    assert_eq!(far_member.path.nodes().collect::<Vec<_>>(), vec![left, right, far]);

    // The inferred edge replays the left~right condition.
    let derived = g.connect_derived(left, far, &far_member.path).unwrap();
    let condition = g.edge(derived).unwrap().kind.condition().unwrap().clone();
    assert_eq!(condition.evaluate(g, &Path::new(left)), FilterResult::Pass);
    assert_eq!(
        condition.evaluate(g, &far_member.path),
        FilterResult::FailRecoverable
    );
    assert!(matches!(
        condition.origin(),
        ConditionOrigin::Derived(path) if path == &far_member.path
    ));
}
