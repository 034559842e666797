// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Plain-text tree rendering of instances and types.
use std::borrow::Cow;

use crate::edge::EdgeTag;
use crate::graph::Graph;
use crate::ident::NodeId;
use crate::typegraph::TypeGraph;

/// Children whose name starts with this prefix are left out of instance
/// trees.
pub const HIDDEN_PREFIX: &str = "implements_";

const BRANCH: &str = "├── ";
const LAST: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders the Composition tree below `root`, one `name|Type` line per
/// node, children sorted by name.
pub fn render_instance(graph: &Graph, root: NodeId) -> String {
    let mut lines = Vec::new();
    let name = graph.name(root).map(Cow::into_owned).unwrap_or_default();
    let ty = graph.node(root).map(|r| r.ty.as_str()).unwrap_or("?");
    lines.push(format!("{name}{}{ty}", graph.config().type_separator));
    instance_children(graph, root, "", &mut lines);
    lines.join("\n")
}

fn instance_children(graph: &Graph, node: NodeId, indent: &str, lines: &mut Vec<String>) {
    let mut children: Vec<(&str, NodeId)> = graph
        .outgoing(node)
        .filter(|e| e.tag() == EdgeTag::Composition)
        .filter_map(|e| e.kind.identifier().map(|name| (name, e.to)))
        .filter(|(name, _)| !name.starts_with(HIDDEN_PREFIX))
        .collect();
    children.sort_unstable();
    let count = children.len();
    for (i, (name, child)) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let ty = graph.node(child).map(|r| r.ty.as_str()).unwrap_or("?");
        lines.push(format!(
            "{indent}{}{name}{}{ty}",
            if last { LAST } else { BRANCH },
            graph.config().type_separator
        ));
        let nested = format!("{indent}{}", if last { SPACE } else { PIPE });
        instance_children(graph, child, &nested, lines);
    }
}

/// Renders the declared child structure of `ty`, expanding resolved child
/// types, children sorted by key. Unresolved children show the referenced
/// name prefixed by `?`; a type that recurses into itself is shown once and
/// marked `...`.
pub fn render_type(tg: &TypeGraph, ty: NodeId) -> String {
    let mut lines = vec![tg.type_name(ty).unwrap_or("?").to_owned()];
    let mut stack = vec![ty];
    type_children(tg, ty, "", &mut stack, &mut lines);
    lines.join("\n")
}

fn type_children(
    tg: &TypeGraph,
    ty: NodeId,
    indent: &str,
    stack: &mut Vec<NodeId>,
    lines: &mut Vec<String>,
) {
    let mut children: Vec<(&str, NodeId)> = tg
        .make_children(ty)
        .into_iter()
        .map(|mc| (tg.make_child_key(mc).unwrap_or("?"), mc))
        .filter(|(key, _)| !key.starts_with(HIDDEN_PREFIX))
        .collect();
    children.sort_unstable();
    let count = children.len();
    for (i, (key, make_child)) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { LAST } else { BRANCH };
        let reference = tg.make_child_type_reference(make_child);
        let resolved = reference.and_then(|r| tg.resolution(r));
        let Some(child_ty) = resolved else {
            let name = reference
                .and_then(|r| tg.type_reference_identifier(r))
                .unwrap_or("?");
            lines.push(format!("{indent}{connector}{key}: ?{name}"));
            continue;
        };
        let name = tg.type_name(child_ty).unwrap_or("?");
        if stack.contains(&child_ty) {
            lines.push(format!("{indent}{connector}{key}: {name} ..."));
            continue;
        }
        lines.push(format!("{indent}{connector}{key}: {name}"));
        stack.push(child_ty);
        let nested = format!("{indent}{}", if last { SPACE } else { PIPE });
        type_children(tg, child_ty, &nested, stack, lines);
        stack.pop();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;
    use crate::literal::Attributes;

    fn divider() -> TypeGraph {
        let mut tg = TypeGraph::new();
        let electrical = tg.add_type("Electrical").expect("type");
        let resistor = tg.add_type("Resistor").expect("type");
        tg.add_make_child(resistor, "p1", electrical).expect("p1");
        tg.add_make_child(resistor, "p2", electrical).expect("p2");
        let divider = tg.add_type("Divider").expect("type");
        tg.add_make_child(divider, "r2", resistor).expect("r2");
        tg.add_make_child(divider, "r1", resistor).expect("r1");
        tg.add_make_child_deferred(divider, "out", "Missing", None)
            .expect("out");
        let marker = tg.add_type("Marker").expect("type");
        tg.add_make_trait(divider, "implements_marker", crate::ChildTarget::Type(marker))
            .expect("marker");
        tg
    }

    #[test]
    fn type_tree() {
        let tg = divider();
        let ty = tg.type_by_name("Divider").expect("type");
        let expected = [
            "Divider",
            "├── out: ?Missing",
            "├── r1: Resistor",
            "│   ├── p1: Electrical",
            "│   └── p2: Electrical",
            "└── r2: Resistor",
            "    ├── p1: Electrical",
            "    └── p2: Electrical",
        ]
        .join("\n");
        assert_eq!(render_type(&tg, ty), expected);
    }

    #[test]
    fn instance_tree_is_sorted_and_hides_markers() {
        let tg = divider();
        let mut g = Graph::new();
        let resistor = tg.type_by_name("Resistor").expect("type");
        let root = tg
            .instantiate_node(&mut g, resistor, &Attributes::new())
            .expect("instantiate");
        let marker = g.hold(crate::record::NodeRecord::new("Marker"));
        g.attach(root, marker, "implements_marker").expect("attach");
        let head = format!("{}|Resistor", g.root_id(root));
        let expected = [head.as_str(), "├── p1|Electrical", "└── p2|Electrical"].join("\n");
        assert_eq!(render_instance(&g, root), expected);
    }
}
