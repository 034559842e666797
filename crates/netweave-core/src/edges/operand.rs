// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Operand edges: membership of a node in an expression's operand set.
use std::ops::ControlFlow;

use crate::edge::{EdgeKind, EdgeTag};
use crate::error::GraphError;
use crate::graph::Graph;
use crate::ident::{EdgeId, NodeId, TypeTag};
use crate::record::EdgeRecord;

impl Graph {
    /// Appends `operand` to the operand set of `expression`.
    ///
    /// The operand takes the position after the highest one in use. Named
    /// operands must be unique within one expression.
    ///
    /// # Errors
    /// - [`GraphError::OperandOrderExhausted`] if an operand already sits at
    ///   `u32::MAX`.
    /// - Everything [`add_operand_at`](Self::add_operand_at) reports.
    pub fn add_operand(
        &mut self,
        expression: NodeId,
        operand: NodeId,
        identifier: Option<&str>,
    ) -> Result<EdgeId, GraphError> {
        let order = match self.operand_edges(expression).last() {
            None => 0,
            Some(edge) => operand_order(edge)
                .checked_add(1)
                .ok_or(GraphError::OperandOrderExhausted(expression))?,
        };
        self.add_operand_at(expression, operand, identifier, order)
    }

    /// Adds `operand` at an explicit position.
    ///
    /// # Errors
    /// [`GraphError::DuplicateOperand`] if `identifier` is already used by
    /// another operand of `expression`.
    pub fn add_operand_at(
        &mut self,
        expression: NodeId,
        operand: NodeId,
        identifier: Option<&str>,
        order: u32,
    ) -> Result<EdgeId, GraphError> {
        self.check_node(expression)?;
        if let Some(name) = identifier {
            if self.operand_by_identifier(expression, name).is_some() {
                return Err(GraphError::DuplicateOperand {
                    expression,
                    identifier: name.to_owned(),
                });
            }
        }
        self.insert_edge(
            expression,
            operand,
            EdgeKind::Operand {
                identifier: identifier.map(str::to_owned),
                order,
            },
        )
    }

    fn operand_edges(&self, expression: NodeId) -> Vec<&EdgeRecord> {
        let mut edges: Vec<&EdgeRecord> = self
            .outgoing(expression)
            .filter(|e| e.tag() == EdgeTag::Operand)
            .collect();
        edges.sort_by_key(|e| operand_order(e));
        edges
    }

    /// Operands of `expression` by position.
    #[must_use]
    pub fn operands(&self, expression: NodeId) -> Vec<NodeId> {
        self.operand_edges(expression).iter().map(|e| e.to).collect()
    }

    /// Operand registered under `identifier`.
    #[must_use]
    pub fn operand_by_identifier(&self, expression: NodeId, identifier: &str) -> Option<NodeId> {
        self.outgoing(expression)
            .find(|e| e.tag() == EdgeTag::Operand && e.kind.identifier() == Some(identifier))
            .map(|e| e.to)
    }

    /// Expressions `operand` takes part in, in insertion order.
    #[must_use]
    pub fn expressions_of(&self, operand: NodeId) -> Vec<NodeId> {
        self.incoming(operand)
            .filter(|e| e.tag() == EdgeTag::Operand)
            .map(|e| e.from)
            .collect()
    }

    /// First expression `operand` takes part in.
    #[must_use]
    pub fn expression_of(&self, operand: NodeId) -> Option<NodeId> {
        self.incoming(operand)
            .find(|e| e.tag() == EdgeTag::Operand)
            .map(|e| e.from)
    }

    /// Visits, by position, the operands of `expression` whose type tag is
    /// `operand_type`.
    pub fn visit_operands_of_type<B>(
        &self,
        expression: NodeId,
        operand_type: &TypeTag,
        mut visit: impl FnMut(&EdgeRecord) -> ControlFlow<B>,
    ) -> Option<B> {
        for edge in self.operand_edges(expression) {
            if !self.node(edge.to).is_ok_and(|r| &r.ty == operand_type) {
                continue;
            }
            if let ControlFlow::Break(out) = visit(edge) {
                return Some(out);
            }
        }
        None
    }
}

fn operand_order(edge: &EdgeRecord) -> u32 {
    match edge.kind {
        EdgeKind::Operand { order, .. } => order,
        _ => 0,
    }
}
