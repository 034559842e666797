// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used)]
use proptest::prelude::*;

use netweave_core::{
    ConnectionMode, Direction, EdgeKindSet, EdgeTag, FilterResult, Graph, LinkCondition, NodeId,
    NodeRecord, Traversal,
};

type Wiring = Vec<(prop::sample::Index, prop::sample::Index, bool)>;

/// Builds `count` interface nodes wired per `wiring`. Edges flagged `true`
/// carry a condition that always passes when `conditional` is set.
fn wired(count: usize, wiring: &Wiring, conditional: bool) -> (Graph, Vec<NodeId>) {
    let mut g = Graph::new();
    let nodes: Vec<NodeId> = (0..count)
        .map(|i| g.hold(NodeRecord::new("Electrical").with_label(format!("n{i}"))))
        .collect();
    for (a, b, flagged) in wiring {
        let a = nodes[a.index(count)];
        let b = nodes[b.index(count)];
        let _ = if conditional && *flagged {
            g.connect_conditional(
                a,
                b,
                ConnectionMode::Deep,
                LinkCondition::new(|_, _| FilterResult::Pass),
            )
        } else {
            g.connect(a, b)
        };
    }
    (g, nodes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn passing_conditions_do_not_change_reachability(
        count in 2_usize..12,
        wiring in prop::collection::vec(
            (any::<prop::sample::Index>(), any::<prop::sample::Index>(), any::<bool>()),
            0..30,
        ),
        start in any::<prop::sample::Index>(),
    ) {
        let (plain, plain_nodes) = wired(count, &wiring, false);
        let (cond, cond_nodes) = wired(count, &wiring, true);
        let kinds = EdgeKindSet::only(EdgeTag::InterfaceConnection);
        let i = start.index(count);

        let index_of = |nodes: &[NodeId], n: NodeId| nodes.iter().position(|x| *x == n);
        let a: Vec<_> = plain
            .bfs_visit([plain_nodes[i]], kinds)
            .unwrap()
            .into_iter()
            .map(|n| index_of(&plain_nodes, n))
            .collect();
        let b: Vec<_> = cond
            .bfs_visit([cond_nodes[i]], kinds)
            .unwrap()
            .into_iter()
            .map(|n| index_of(&cond_nodes, n))
            .collect();
        prop_assert_eq!(a, b);

        let bus_a: Vec<_> = plain.connected_interfaces(plain_nodes[i]).unwrap()
            .into_iter().map(|n| index_of(&plain_nodes, n)).collect();
        let bus_b: Vec<_> = cond.connected_interfaces(cond_nodes[i]).unwrap()
            .into_iter().map(|n| index_of(&cond_nodes, n)).collect();
        prop_assert_eq!(bus_a, bus_b);
    }
}

fn chain(len: usize) -> (Graph, Vec<NodeId>) {
    let mut g = Graph::new();
    let nodes: Vec<NodeId> = (0..len)
        .map(|i| g.hold(NodeRecord::new("Electrical").with_label(format!("n{i}"))))
        .collect();
    for pair in nodes.windows(2) {
        g.connect(pair[0], pair[1]).unwrap();
    }
    (g, nodes)
}

#[test]
fn global_filter_outcomes() {
    let (g, n) = chain(5);
    let kinds = EdgeKindSet::only(EdgeTag::InterfaceConnection);

    let blocked = n[2];
    let recoverable = Traversal::new(&g)
        .start(n[0])
        .kinds(kinds)
        .filter(move |_, path, _| (path.last() != blocked).into())
        .run()
        .unwrap();
    assert!(!recoverable.aborted);
    assert_eq!(recoverable.nodes().collect::<Vec<_>>(), vec![n[0], n[1]]);

    let fatal = Traversal::new(&g)
        .start(n[0])
        .kinds(kinds)
        .filter(move |_, path, _| {
            if path.last() == blocked {
                FilterResult::FailUnrecoverable
            } else {
                FilterResult::Pass
            }
        })
        .run()
        .unwrap();
    assert!(fatal.aborted);
    assert!(fatal.path_to(n[3]).is_none());
}

#[test]
fn depth_and_direction() {
    let mut g = Graph::new();
    let a = g.hold(NodeRecord::new("Holder").with_label("a"));
    let b = g.hold(NodeRecord::new("Holder").with_label("b"));
    let c = g.hold(NodeRecord::new("Holder").with_label("c"));
    g.add_pointer(a, b, Some("next"), None).unwrap();
    g.add_pointer(b, c, Some("next"), None).unwrap();
    let pointers = EdgeKindSet::only(EdgeTag::Pointer);

    let shallow = Traversal::new(&g)
        .start(a)
        .kinds(pointers)
        .max_depth(1)
        .run()
        .unwrap();
    assert_eq!(shallow.nodes().collect::<Vec<_>>(), vec![a, b]);

    let backwards = Traversal::new(&g)
        .start(c)
        .kinds(pointers)
        .direction(Direction::Incoming)
        .run()
        .unwrap();
    assert_eq!(backwards.nodes().collect::<Vec<_>>(), vec![c, b, a]);

    let path = g.find_path(c, a, pointers).unwrap().unwrap();
    assert_eq!(path.nodes().collect::<Vec<_>>(), vec![c, b, a]);
    assert_eq!(g.find_path(a, c, EdgeKindSet::only(EdgeTag::Trait)).unwrap(), None);
}
