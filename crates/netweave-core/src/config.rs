// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Construction-time configuration for graphs and type graphs.

/// Naming and ordering conventions of one [`Graph`](crate::Graph).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GraphConfig {
    /// Separator between hierarchy levels in full names.
    pub name_separator: char,
    /// Separator between a full name and the type tag in typed names.
    pub type_separator: char,
    /// Prefix of the generated id used as the name of unlabelled roots.
    pub root_prefix: String,
    /// Default `sort` flag of [`ChildQuery`](crate::ChildQuery).
    pub sort_children: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name_separator: '.',
            type_separator: '|',
            root_prefix: "*".to_owned(),
            sort_children: true,
        }
    }
}

/// Settings of a [`TypeGraph`](crate::TypeGraph).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TypeGraphConfig {
    /// Maximum nesting depth `instantiate` will descend before reporting
    /// [`TypeGraphError::RecursiveType`](crate::TypeGraphError::RecursiveType).
    pub max_instantiation_depth: usize,
    /// Configuration of the graph holding the type definitions.
    pub graph: GraphConfig,
}

impl Default for TypeGraphConfig {
    fn default() -> Self {
        Self {
            max_instantiation_depth: 256,
            graph: GraphConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_dotted_names() {
        let cfg = GraphConfig::default();
        assert_eq!(cfg.name_separator, '.');
        assert_eq!(cfg.type_separator, '|');
        assert!(cfg.sort_children);
        assert_eq!(TypeGraphConfig::default().max_instantiation_depth, 256);
    }
}
