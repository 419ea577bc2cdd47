//! Obligation transfer: returning a result hands it to the caller, binding it to a
//! variable hands it to that variable's later uses.

use super::Analysis;
use crate::parser::ast::{AssignOp, NodeId, NodeKind};
use crate::scope::Variable;
use crate::typeck::TypeOracle;

/// A value that must be handled, and the node that answers for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Obligation {
    pub(super) origin: NodeId,
    pub(super) report_as: NodeId,
    /// Variable uses reached through a deferral are never reported themselves.
    pub(super) is_reference: bool,
}

impl Obligation {
    pub(super) fn producer(node: NodeId) -> Self {
        Self { origin: node, report_as: node, is_reference: false }
    }

    pub(super) fn reference(identifier: NodeId, report_as: NodeId) -> Self {
        Self { origin: identifier, report_as, is_reference: true }
    }
}

/// Where a result was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Deferral {
    /// `const x = <result>`
    Declarator { declarator: NodeId, id: NodeId },
    /// `x = <result>`
    Assignment { target: NodeId },
}

/// A variable that took over the obligation, and the identifier to blame if no use discharges it.
pub(super) struct Transfer<'a> {
    pub(super) variable: &'a Variable,
    pub(super) binding: NodeId,
    pub(super) report_as: NodeId,
}

impl<'a, O: TypeOracle> Analysis<'a, O> {
    /// Whether `node` flows directly out of its function: a `return` argument or an
    /// arrow's expression body, before any enclosing block.
    pub(super) fn is_returned(&self, node: NodeId) -> bool {
        for ancestor in self.tree.ancestors(node) {
            let kind = self.tree.kind(ancestor);
            match kind {
                NodeKind::ArrowFunctionExpression { .. } | NodeKind::ReturnStatement { .. } => return true,
                _ if kind.is_block_boundary() || kind.is_declaration_boundary() => return false,
                _ => {}
            }
        }
        false
    }

    /// The binding that receives `node`'s value, if any, stopping at the enclosing block.
    pub(super) fn deferral_of(&self, node: NodeId) -> Option<Deferral> {
        let tree = self.tree;
        let mut child = node;
        for ancestor in tree.ancestors(node) {
            let kind = tree.kind(ancestor);
            match kind {
                NodeKind::VariableDeclarator { id, init: Some(init) }
                    if *init == child
                        && matches!(tree.kind(*id), NodeKind::Identifier { .. })
                        && self.is_result_like(*init) =>
                {
                    return Some(Deferral::Declarator { declarator: ancestor, id: *id });
                }
                NodeKind::AssignmentExpression { operator: AssignOp::Assign, left, right }
                    if *right == child
                        && matches!(tree.kind(*left), NodeKind::Identifier { .. })
                        && self.is_result_like(*right) =>
                {
                    return Some(Deferral::Assignment { target: *left });
                }
                _ if kind.is_block_boundary() => return None,
                _ => {}
            }
            child = ancestor;
        }
        None
    }

    /// Resolve a deferral to the variable now holding the result.
    pub(super) fn transfer(&self, deferral: Deferral) -> Option<Transfer<'a>> {
        match deferral {
            Deferral::Declarator { declarator, id } => {
                let variable = self
                    .scopes
                    .declared_variables(declarator)
                    .into_iter()
                    .find(|v| v.identifiers.contains(&id))?;
                let report_as = variable.references.first().map_or(id, |r| r.identifier);
                Some(Transfer { variable, binding: id, report_as })
            }
            Deferral::Assignment { target } => {
                let variable = self.scopes.resolve(target)?;
                Some(Transfer { variable, binding: target, report_as: target })
            }
        }
    }
}
