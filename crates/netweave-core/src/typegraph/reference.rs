// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Relative reference paths and their storage as Reference node chains.
use std::fmt;

use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::{NodeId, TypeTag};
use crate::record::NodeRecord;

use super::tags;

/// One hop of a [`RefPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefSegment {
    /// Composition child by name (`name`).
    Child(String),
    /// Pointer held by the current node, by identifier (`*name`).
    Pointer(String),
    /// Trait attached to the current node, by trait type name (`#Name`).
    Trait(String),
}

impl RefSegment {
    fn kind(&self) -> &'static str {
        match self {
            Self::Child(_) => "child",
            Self::Pointer(_) => "pointer",
            Self::Trait(_) => "trait",
        }
    }

    fn identifier(&self) -> &str {
        match self {
            Self::Child(s) | Self::Pointer(s) | Self::Trait(s) => s,
        }
    }

    fn from_parts(kind: &str, identifier: &str) -> Option<Self> {
        let identifier = identifier.to_owned();
        match kind {
            "child" => Some(Self::Child(identifier)),
            "pointer" => Some(Self::Pointer(identifier)),
            "trait" => Some(Self::Trait(identifier)),
            _ => None,
        }
    }
}

impl fmt::Display for RefSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Child(name) => f.write_str(name),
            Self::Pointer(name) => write!(f, "*{name}"),
            Self::Trait(name) => write!(f, "#{name}"),
        }
    }
}

/// Path relative to an instance (or, during validation, to a type), made of
/// child, pointer, and trait hops. The empty path denotes the origin itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RefPath {
    segments: Vec<RefSegment>,
}

impl RefPath {
    /// Path with no hops.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of plain child hops.
    pub fn children<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names
            .into_iter()
            .map(|n| RefSegment::Child(n.to_owned()))
            .collect()
    }

    /// Parses dotted text: `a.b` for children, `*p` for pointers, `#T` for
    /// traits. Empty segments are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        text.split('.')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if let Some(rest) = s.strip_prefix('*') {
                    RefSegment::Pointer(rest.to_owned())
                } else if let Some(rest) = s.strip_prefix('#') {
                    RefSegment::Trait(rest.to_owned())
                } else {
                    RefSegment::Child(s.to_owned())
                }
            })
            .collect()
    }

    /// Hops in order.
    #[must_use]
    pub fn segments(&self) -> &[RefSegment] {
        &self.segments
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns a copy extended by one hop.
    #[must_use]
    pub fn join(&self, segment: RefSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Resolves the path in an instance graph starting at `origin`.
    ///
    /// Returns `Ok(None)` when a hop is missing.
    ///
    /// # Errors
    /// [`GraphError::AmbiguousPointer`] when a pointer hop matches several
    /// pointers.
    pub fn resolve(&self, graph: &Graph, origin: NodeId) -> Result<Option<NodeId>, GraphError> {
        graph.check_node(origin)?;
        let mut current = origin;
        for segment in &self.segments {
            let next = match segment {
                RefSegment::Child(name) => graph.child_by_name(current, name),
                RefSegment::Pointer(name) => graph.pointed_by_identifier(current, name)?,
                RefSegment::Trait(name) => graph.trait_of_type(current, &TypeTag::new(name.as_str())),
            };
            match next {
                Some(node) => current = node,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

impl fmt::Display for RefPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<RefSegment> for RefPath {
    fn from_iter<I: IntoIterator<Item = RefSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl From<&str> for RefPath {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

/// Holds `record` and attaches it below `parent` as `name`. The node is
/// discarded again when the attach fails.
pub(crate) fn hold_under(
    graph: &mut Graph,
    parent: NodeId,
    record: NodeRecord,
    name: &str,
) -> Result<NodeId, GraphError> {
    let node = graph.hold(record);
    if let Err(err) = graph.attach(parent, node, name) {
        graph.destroy_node(node)?;
        return Err(err);
    }
    Ok(node)
}

/// Stores `path` below `owner` as a chain of Reference nodes: the first hop
/// is the child `name` of `owner`, each further hop the child `next` of the
/// previous one. An empty path stores a single terminal Reference node.
pub(crate) fn store_path(
    graph: &mut Graph,
    owner: NodeId,
    name: &str,
    path: &RefPath,
) -> Result<NodeId, GraphError> {
    let head = hold_under(
        graph,
        owner,
        NodeRecord::new(tags::REFERENCE).with_attr(tags::ATTR_KIND, "root"),
        name,
    )?;
    let chain = path.segments().iter().try_fold(head, |previous, segment| {
        hold_under(
            graph,
            previous,
            NodeRecord::new(tags::REFERENCE)
                .with_attr(tags::ATTR_KIND, segment.kind())
                .with_attr(tags::ATTR_IDENTIFIER, segment.identifier()),
            tags::NEXT,
        )
    });
    if let Err(err) = chain {
        graph.destroy_subtree(head)?;
        return Err(err);
    }
    Ok(head)
}

/// Reads back a chain written by [`store_path`].
pub(crate) fn load_path(graph: &Graph, owner: NodeId, name: &str) -> Option<RefPath> {
    let head = graph.child_by_name(owner, name)?;
    let mut segments = Vec::new();
    let mut cursor = graph.child_by_name(head, tags::NEXT);
    while let Some(node) = cursor {
        let record = graph.node(node).ok()?;
        let kind = record.attr(tags::ATTR_KIND)?.as_str()?;
        let identifier = record.attr(tags::ATTR_IDENTIFIER)?.as_str()?;
        segments.push(RefSegment::from_parts(kind, identifier)?);
        cursor = graph.child_by_name(node, tags::NEXT);
    }
    Some(RefPath { segments })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn parse_and_display_agree() {
        let path = RefPath::parse("power.*bus.#can_bridge.hv");
        assert_eq!(
            path.segments(),
            &[
                RefSegment::Child("power".to_owned()),
                RefSegment::Pointer("bus".to_owned()),
                RefSegment::Trait("can_bridge".to_owned()),
                RefSegment::Child("hv".to_owned()),
            ]
        );
        assert_eq!(path.to_string(), "power.*bus.#can_bridge.hv");
        assert!(RefPath::parse("").is_empty());
        assert_eq!(RefPath::children(["a", "b"]), RefPath::parse("a.b"));
    }

    #[test]
    fn stored_chains_round_trip() {
        let mut g = Graph::new();
        let owner = g.hold(NodeRecord::new("MakeLink"));
        let path = RefPath::parse("x.*p.#T");
        store_path(&mut g, owner, "lhs", &path).expect("store");
        store_path(&mut g, owner, "rhs", &RefPath::root()).expect("store");
        assert_eq!(load_path(&g, owner, "lhs"), Some(path.clone()));
        assert_eq!(load_path(&g, owner, "rhs"), Some(RefPath::root()));
        assert_eq!(load_path(&g, owner, "missing"), None);

        let before = g.node_count();
        assert!(matches!(
            store_path(&mut g, owner, "lhs", &path),
            Err(GraphError::DuplicateChildName { .. })
        ));
        assert_eq!(g.node_count(), before);
    }

    #[test]
    fn resolves_against_instances() {
        let mut g = Graph::new();
        let root = g.hold(NodeRecord::new("App"));
        let bus = g.hold(NodeRecord::new("I2C"));
        let scl = g.hold(NodeRecord::new("Electrical"));
        let bridge = g.hold(NodeRecord::new("can_bridge"));
        g.attach(root, bus, "i2c").expect("attach");
        g.attach(bus, scl, "scl").expect("attach");
        g.attach(root, bridge, "bridge").expect("attach");
        g.add_trait(root, bridge).expect("trait");
        g.add_pointer(bridge, scl, Some("out"), None).expect("pointer");

        assert_eq!(RefPath::parse("i2c.scl").resolve(&g, root), Ok(Some(scl)));
        assert_eq!(RefPath::parse("#can_bridge.*out").resolve(&g, root), Ok(Some(scl)));
        assert_eq!(RefPath::parse("i2c.sda").resolve(&g, root), Ok(None));
        assert_eq!(RefPath::root().resolve(&g, root), Ok(Some(root)));
    }
}
