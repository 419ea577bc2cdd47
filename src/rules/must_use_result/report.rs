use std::collections::HashSet;

use super::RULE_NAME;
use crate::diagnostics::{Diagnostic, DiagnosticSink, MessageId};
use crate::parser::ast::{NodeId, SyntaxTree};

/// Forwards findings to the sink, at most once per node for the whole run.
pub(super) struct Reporter<'s> {
    sink: &'s mut dyn DiagnosticSink,
    reported: HashSet<NodeId>,
}

impl<'s> Reporter<'s> {
    pub(super) fn new(sink: &'s mut dyn DiagnosticSink) -> Self {
        Self { sink, reported: HashSet::new() }
    }

    /// Returns false if `node` was already reported.
    pub(super) fn report(&mut self, tree: &SyntaxTree, node: NodeId) -> bool {
        if !self.reported.insert(node) {
            return false;
        }
        self.sink.report(Diagnostic {
            rule: RULE_NAME,
            message_id: MessageId::MustUseResult,
            node,
            span: tree.span(node),
        });
        true
    }

    pub(super) fn count(&self) -> usize {
        self.reported.len()
    }
}
