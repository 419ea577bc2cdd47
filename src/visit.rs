//! Syntax tree visitor infrastructure
//!
//! Nodes live in an arena, so a visitor receives the tree plus a [`NodeId`] instead of
//! a borrowed node. Implement [`Visitor`] for a pass, override the hooks you need, and
//! call [`walk_node`] inside an override to continue default recursion. Omitting the
//! walk call prunes traversal below that node.
//!
//! ```rust
//! use resultlint::parser::ast::{NodeId, NodeKind, SyntaxTree};
//! use resultlint::visit::{Visitor, walk_node};
//!
//! struct CallCounter {
//!     calls: usize,
//! }
//!
//! impl Visitor for CallCounter {
//!     fn visit_node(&mut self, tree: &SyntaxTree, id: NodeId) {
//!         if matches!(tree.kind(id), NodeKind::CallExpression { .. }) {
//!             self.calls += 1;
//!         }
//!         walk_node(self, tree, id);
//!     }
//! }
//! ```

use crate::parser::ast::{NodeId, SyntaxTree};
#[cfg(test)]
use crate::parser::ast::NodeKind;

/// Read-only tree visitor. The default implementation visits every node in source order.
pub trait Visitor: Sized {
    fn visit_node(&mut self, tree: &SyntaxTree, id: NodeId) {
        walk_node(self, tree, id);
    }
}

/// Visit the children of `id` in source order.
pub fn walk_node<V: Visitor>(visitor: &mut V, tree: &SyntaxTree, id: NodeId) {
    for child in tree.children(id) {
        visitor.visit_node(tree, child);
    }
}

/// Visit the whole tree from its root.
pub fn walk_tree<V: Visitor>(visitor: &mut V, tree: &SyntaxTree) {
    visitor.visit_node(tree, tree.root());
}

/// All nodes matching `pred`, in source order.
#[cfg(test)]
pub(crate) fn collect_nodes(tree: &SyntaxTree, pred: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
    struct Collector<F> {
        pred: F,
        found: Vec<NodeId>,
    }

    impl<F: Fn(&NodeKind) -> bool> Visitor for Collector<F> {
        fn visit_node(&mut self, tree: &SyntaxTree, id: NodeId) {
            if (self.pred)(tree.kind(id)) {
                self.found.push(id);
            }
            walk_node(self, tree, id);
        }
    }

    let mut collector = Collector { pred, found: Vec::new() };
    walk_tree(&mut collector, tree);
    collector.found
}
