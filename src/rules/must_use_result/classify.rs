//! Producer and consumer classification: is a node's value a result, and does the
//! surrounding syntax terminate or check it.

use super::Analysis;
use crate::config::GuardPolicy;
use crate::parser::ast::{LogicalOp, NodeId, NodeKind, UnaryOp};
use crate::typeck::TypeOracle;

impl<O: TypeOracle> Analysis<'_, O> {
    /// True iff some union constituent of the node's apparent type exposes every
    /// required result member. An `await` is judged by its awaited operand type.
    pub(super) fn is_result_like(&self, node: NodeId) -> bool {
        let ty = match self.tree.kind(node) {
            NodeKind::AwaitExpression { argument } => {
                self.oracle.awaited_type(&self.oracle.type_of(*argument))
            }
            _ => self.oracle.type_of(node),
        };
        self.oracle
            .union_parts(&ty)
            .iter()
            .any(|part| self.options.required_members().all(|m| self.oracle.has_member(part, m)))
    }

    /// The node whose parent consumes `node`'s value, looking through `await`.
    fn outermost_await(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(parent) = self.tree.parent(current) {
            match self.tree.kind(parent) {
                NodeKind::AwaitExpression { .. } => current = parent,
                _ => break,
            }
        }
        current
    }

    /// If `node` is the object of a member access that is itself called, the call.
    fn invoked_member_of(&self, node: NodeId) -> Option<(NodeId, NodeId)> {
        let tree = self.tree;
        let member = tree.parent(node)?;
        let NodeKind::MemberExpression { object, .. } = tree.kind(member) else { return None };
        if *object != node {
            return None;
        }
        let call = tree.parent(member)?;
        match tree.kind(call) {
            NodeKind::CallExpression { callee, .. } if *callee == member => Some((member, call)),
            _ => None,
        }
    }

    /// `r.unwrapOr(x)`, `r.map(f).match(a, b)`, `r.inner.unwrapOr(x)`: the chain ends in a
    /// handler call. Intermediate calls and property reads are climbed through.
    pub(super) fn is_handled_result(&self, node: NodeId) -> bool {
        let tree = self.tree;
        let value = self.outermost_await(node);
        let Some(member) = tree.parent(value) else { return false };
        match tree.kind(member) {
            NodeKind::MemberExpression { object, .. } if *object == value => {}
            _ => return false,
        }
        let call = self.invoked_member_of(value).map(|(_, call)| call);
        if call.is_some() && tree.member_name(member).is_some_and(|name| self.options.is_handler(name)) {
            return true;
        }
        let next = call.unwrap_or(member);
        match tree.parent(next).map(|p| tree.kind(p)) {
            Some(NodeKind::ExpressionStatement { .. }) | None => false,
            Some(_) => self.is_handled_result(next),
        }
    }

    /// `if (r.isOk()) ...`: an identifier whose guard method is invoked.
    pub(super) fn is_checked_result(&self, node: NodeId) -> bool {
        if !matches!(self.tree.kind(node), NodeKind::Identifier { .. }) {
            return false;
        }
        let Some((member, call)) = self.invoked_member_of(node) else { return false };
        if !self.tree.member_name(member).is_some_and(|name| self.options.is_guard(name)) {
            return false;
        }
        match self.options.guard_policy {
            GuardPolicy::Anywhere => true,
            GuardPolicy::Controlling => self.controls_branch(call),
        }
    }

    /// Whether the value of `expr` decides a branch, possibly through `!`, `&&` and `||`.
    fn controls_branch(&self, expr: NodeId) -> bool {
        let tree = self.tree;
        let mut current = expr;
        while let Some(parent) = tree.parent(current) {
            match tree.kind(parent) {
                NodeKind::UnaryExpression { operator: UnaryOp::Not, .. }
                | NodeKind::LogicalExpression { operator: LogicalOp::And | LogicalOp::Or, .. } => current = parent,
                NodeKind::IfStatement { test, .. }
                | NodeKind::WhileStatement { test, .. }
                | NodeKind::DoWhileStatement { test, .. }
                | NodeKind::ConditionalExpression { test, .. } => return *test == current,
                NodeKind::ForStatement { test, .. } => return *test == Some(current),
                _ => return false,
            }
        }
        false
    }
}
