// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Instance hierarchies built from dotted paths.

use netweave_core::{Graph, NodeId, NodeRecord};

/// Type tag given to nodes created without an explicit one.
pub const DEFAULT_TYPE: &str = "Node";

/// Builder for a single-rooted hierarchy.
///
/// # Example
///
/// ```
/// use netweave_dry_tests::TreeBuilder;
///
/// let tree = TreeBuilder::new("top")
///     .with_path("power.hv")
///     .with_typed_path("power.lv", "Electrical")
///     .build();
/// assert_eq!(tree.graph.full_name(tree.at("power.lv")).unwrap(), "top.power.lv");
/// ```
pub struct TreeBuilder {
    root_label: String,
    root_type: String,
    paths: Vec<(String, String)>,
}

impl TreeBuilder {
    /// Create a builder whose root is labelled `root_label`.
    pub fn new(root_label: &str) -> Self {
        Self {
            root_label: root_label.to_owned(),
            root_type: DEFAULT_TYPE.to_owned(),
            paths: Vec::new(),
        }
    }

    /// Set the root's type tag.
    pub fn with_root_type(mut self, ty: &str) -> Self {
        self.root_type = ty.to_owned();
        self
    }

    /// Add a node at `dotted`, creating missing ancestors.
    pub fn with_path(self, dotted: &str) -> Self {
        self.with_typed_path(dotted, DEFAULT_TYPE)
    }

    /// Add a node of type `ty` at `dotted`, creating missing ancestors.
    pub fn with_typed_path(mut self, dotted: &str, ty: &str) -> Self {
        self.paths.push((dotted.to_owned(), ty.to_owned()));
        self
    }

    /// Build into a fresh graph.
    pub fn build(self) -> TestTree {
        self.build_into(Graph::new())
    }

    /// Build into `graph`, which may already hold other nodes.
    #[allow(clippy::expect_used)]
    pub fn build_into(self, mut graph: Graph) -> TestTree {
        let root = graph.hold(NodeRecord::new(self.root_type.as_str()).with_label(self.root_label));
        for (dotted, ty) in &self.paths {
            let segments: Vec<&str> = dotted.split('.').collect();
            let mut parent = root;
            for (i, name) in segments.iter().enumerate() {
                parent = match graph.child_by_name(parent, name) {
                    Some(existing) => existing,
                    None => {
                        let tag = if i + 1 == segments.len() { ty.as_str() } else { DEFAULT_TYPE };
                        let node = graph.hold(NodeRecord::new(tag));
                        graph.attach(parent, node, *name).expect("attach fixture node");
                        node
                    }
                };
            }
        }
        TestTree { graph, root }
    }
}

/// Graph plus the root the builder created.
pub struct TestTree {
    /// The graph.
    pub graph: Graph,
    /// Root of the built hierarchy.
    pub root: NodeId,
}

impl TestTree {
    /// Node at `dotted` below the root; the empty string is the root.
    ///
    /// # Panics
    /// If no such node exists.
    #[allow(clippy::expect_used)]
    pub fn at(&self, dotted: &str) -> NodeId {
        self.graph
            .descend(self.root, dotted.split('.').filter(|s| !s.is_empty()))
            .expect("fixture path exists")
    }
}
