// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use thiserror::Error;

use crate::error::GraphError;
use crate::ident::NodeId;
use crate::literal::LiteralKind;

/// Error returned by [`TypeGraph`](crate::TypeGraph) construction,
/// instantiation, inheritance, and linking.
///
/// Lookups that may legitimately fail mid-construction return `Option`
/// instead; these variants are raised by the operations that assert full
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeGraphError {
    /// A type with this name already exists.
    #[error("type `{0}` is already defined")]
    DuplicateType(String),
    /// No type with this name exists.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// The node is not a Type node of this type graph.
    #[error("node {0} is not a type")]
    NotAType(NodeId),
    /// The type already declares a child under this identifier.
    #[error("type `{ty}` already declares `{identifier}`")]
    ChildAlreadyExists {
        /// Owning type.
        ty: String,
        /// Colliding identifier.
        identifier: String,
    },
    /// Child identifiers may not use the prefixes reserved for link and
    /// attribute declarations (`link#`, `@`).
    #[error("`{identifier}` on `{ty}` uses a reserved prefix")]
    ReservedIdentifier {
        /// Owning type.
        ty: String,
        /// Rejected identifier.
        identifier: String,
    },
    /// A hard child's type reference was never resolved.
    #[error("child `{identifier}` of `{ty}` refers to unresolved type `{reference}`")]
    UnresolvedTypeReference {
        /// Owning type.
        ty: String,
        /// Child identifier.
        identifier: String,
        /// Identifier the reference names.
        reference: String,
    },
    /// A link endpoint path does not resolve.
    #[error("link endpoint `{path}` of `{ty}` does not resolve")]
    UnresolvedLinkEndpoint {
        /// Owning type.
        ty: String,
        /// Endpoint path as written.
        path: String,
    },
    /// The parent path of a nested child declaration does not resolve.
    #[error("mount path `{path}` for child `{identifier}` of `{ty}` does not resolve")]
    UnresolvedMount {
        /// Owning type.
        ty: String,
        /// Child identifier.
        identifier: String,
        /// Mount path as written.
        path: String,
    },
    /// Instantiation recursed into a type already being built, or nested
    /// deeper than the configured limit.
    #[error("type `{ty}` recurses (depth {depth})")]
    RecursiveType {
        /// Type that closed the cycle or exceeded the limit.
        ty: String,
        /// Nesting depth reached.
        depth: usize,
    },
    /// The attribute is not declared on the target's type, or the target
    /// path does not exist.
    #[error("`{attribute}` is not a declared attribute of `{ty}`")]
    UnknownAttribute {
        /// Type the attribute was looked up on.
        ty: String,
        /// Attribute key as supplied.
        attribute: String,
    },
    /// The attribute value has the wrong literal kind.
    #[error("attribute `{attribute}` expects {expected}, got {found}")]
    AttributeTypeMismatch {
        /// Attribute key as supplied.
        attribute: String,
        /// Declared kind.
        expected: LiteralKind,
        /// Supplied kind.
        found: LiteralKind,
    },
    /// The reference is already bound to another type.
    #[error("type reference {reference} is already linked to {existing}")]
    AlreadyLinked {
        /// Reference node.
        reference: NodeId,
        /// Type it is bound to.
        existing: NodeId,
    },
    /// The node is not a MakeChild.
    #[error("node {0} is not a make-child declaration")]
    NotAMakeChild(NodeId),
    /// The node is not a TypeReference.
    #[error("node {0} is not a type reference")]
    NotATypeReference(NodeId),
    /// Underlying graph error.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
