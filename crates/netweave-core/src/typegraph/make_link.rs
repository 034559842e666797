// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! MakeLink declarations: connections between two relative paths of a type.
use tracing::trace;

use crate::ident::NodeId;
use crate::literal::Literal;
use crate::record::NodeRecord;

use super::reference::{hold_under, load_path, store_path};
use super::{tags, RefPath, TypeGraph, TypeGraphError};

/// Edge a MakeLink materialises between its endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Interface connection, deep unless `shallow`.
    InterfaceConnection {
        /// Restrict the connection to the endpoints themselves.
        shallow: bool,
    },
    /// Named pointer from `lhs` to `rhs`.
    Pointer {
        /// Pointer identifier.
        identifier: String,
    },
}

impl LinkKind {
    /// Deep interface connection.
    pub const CONNECT: Self = Self::InterfaceConnection { shallow: false };
}

/// Decoded MakeLink.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MakeLinkDecl {
    /// Source endpoint, relative to the instance root.
    pub lhs: RefPath,
    /// Target endpoint, relative to the instance root.
    pub rhs: RefPath,
    /// Edge to create.
    pub kind: LinkKind,
}

impl TypeGraph {
    /// Declares that the nodes at `lhs` and `rhs` must be linked in every
    /// instance of `ty`.
    ///
    /// Endpoints are not checked here; see
    /// [`validate_type`](Self::validate_type).
    pub fn add_make_link(
        &mut self,
        ty: NodeId,
        lhs: &RefPath,
        rhs: &RefPath,
        kind: LinkKind,
    ) -> Result<NodeId, TypeGraphError> {
        self.require_type(ty)?;
        let mut record = NodeRecord::new(tags::MAKE_LINK);
        match &kind {
            LinkKind::InterfaceConnection { shallow } => {
                record = record
                    .with_attr(tags::ATTR_KIND, "interface")
                    .with_attr(tags::ATTR_SHALLOW, *shallow);
            }
            LinkKind::Pointer { identifier } => {
                record = record
                    .with_attr(tags::ATTR_KIND, "pointer")
                    .with_attr(tags::ATTR_IDENTIFIER, identifier.as_str());
            }
        }
        let name = format!("{}{}", tags::LINK_PREFIX, self.next_link);
        let link = hold_under(&mut self.graph, ty, record, &name)?;
        self.next_link += 1;
        let stored = store_path(&mut self.graph, link, tags::LHS, lhs)
            .and_then(|_| store_path(&mut self.graph, link, tags::RHS, rhs));
        if let Err(err) = stored {
            self.graph.destroy_subtree(link)?;
            return Err(err.into());
        }
        trace!(%lhs, %rhs, ?kind, "make link");
        Ok(link)
    }

    /// MakeLink nodes of `ty` in declaration order.
    #[must_use]
    pub fn make_links(&self, ty: NodeId) -> Vec<NodeId> {
        self.children_tagged(ty, tags::MAKE_LINK)
    }

    /// Decodes a MakeLink node.
    #[must_use]
    pub fn make_link(&self, link: NodeId) -> Option<MakeLinkDecl> {
        let record = self.graph.node(link).ok()?;
        if record.ty.as_str() != tags::MAKE_LINK {
            return None;
        }
        let kind = match record.attr(tags::ATTR_KIND)?.as_str()? {
            "interface" => LinkKind::InterfaceConnection {
                shallow: record
                    .attr(tags::ATTR_SHALLOW)
                    .and_then(Literal::as_bool)
                    .unwrap_or(false),
            },
            "pointer" => LinkKind::Pointer {
                identifier: record.attr(tags::ATTR_IDENTIFIER)?.as_str()?.to_owned(),
            },
            _ => return None,
        };
        Some(MakeLinkDecl {
            lhs: load_path(&self.graph, link, tags::LHS)?,
            rhs: load_path(&self.graph, link, tags::RHS)?,
            kind,
        })
    }

    /// Decoded MakeLinks of `ty` in declaration order.
    #[must_use]
    pub fn make_link_decls(&self, ty: NodeId) -> Vec<MakeLinkDecl> {
        self.make_links(ty)
            .into_iter()
            .filter_map(|l| self.make_link(l))
            .collect()
    }
}
