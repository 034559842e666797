// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canned type graphs.

use netweave_core::{LinkKind, LiteralKind, NodeId, RefPath, TypeGraph};

/// Type graph plus name lookup that panics on typos.
pub struct Library {
    /// The type graph.
    pub tg: TypeGraph,
}

impl Library {
    /// Type node named `name`.
    ///
    /// # Panics
    /// If the library has no such type.
    #[allow(clippy::expect_used)]
    pub fn ty(&self, name: &str) -> NodeId {
        self.tg.type_by_name(name).expect("fixture type exists")
    }
}

/// Small component library:
///
/// - `Electrical`: leaf interface.
/// - `Resistor`: `p1`, `p2: Electrical`; attribute `resistance: float`.
/// - `Divider`: `r1`, `r2: Resistor`; `r1.p2 ~ r2.p1` (deep),
///   pointer `*top` from the root to `r1.p1`; attribute `ratio: float`.
#[allow(clippy::expect_used)]
pub fn divider_library() -> Library {
    let mut tg = TypeGraph::new();
    let electrical = tg.add_type("Electrical").expect("Electrical");
    let resistor = tg.add_type("Resistor").expect("Resistor");
    tg.add_make_child(resistor, "p1", electrical).expect("p1");
    tg.add_make_child(resistor, "p2", electrical).expect("p2");
    tg.declare_attribute(resistor, "resistance", LiteralKind::Float)
        .expect("resistance");

    let divider = tg.add_type("Divider").expect("Divider");
    tg.add_make_child(divider, "r1", resistor).expect("r1");
    tg.add_make_child(divider, "r2", resistor).expect("r2");
    tg.add_make_link(
        divider,
        &RefPath::parse("r1.p2"),
        &RefPath::parse("r2.p1"),
        LinkKind::CONNECT,
    )
    .expect("r1.p2 ~ r2.p1");
    tg.add_make_link(
        divider,
        &RefPath::root(),
        &RefPath::parse("r1.p1"),
        LinkKind::Pointer {
            identifier: "top".to_owned(),
        },
    )
    .expect("*top");
    tg.declare_attribute(divider, "ratio", LiteralKind::Float)
        .expect("ratio");
    Library { tg }
}
