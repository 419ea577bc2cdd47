//! `must-use-result`: every result-typed value must reach a handler call, be checked,
//! be returned to the caller, or be stored in a variable whose uses do one of those.
//!
//! Producers are calls, `new` expressions and `await`s. For each producer the rule
//! asks, in order:
//!
//! 1. Is it in a type-level or declarative position? Then it is not a use at all.
//! 2. Is its value result-like? Otherwise there is nothing to track.
//! 3. Is it handled (`r.unwrapOr(x)`, `r.map(f).match(a, b)`) or, for a variable
//!    use, checked (`if (r.isOk())`)?
//! 4. Is it returned?
//! 5. Is it bound to a variable? Then the obligation moves to the variable's other
//!    references, and the binding identifier is what gets reported if none of
//!    them discharges it.

mod classify;
mod propagate;
mod report;

use std::collections::HashSet;

use tracing::{debug, trace};

use super::{Level, RuleMeta};
use crate::config::RuleOptions;
use crate::diagnostics::{DiagnosticSink, LintError};
use crate::parser::ast::{NodeId, NodeKind, SyntaxTree};
use crate::scope::ScopeAnalysis;
use crate::typeck::TypeOracle;
use crate::visit::{Visitor, walk_node, walk_tree};
use propagate::{Obligation, Transfer};
use report::Reporter;

pub const RULE_NAME: &str = "must-use-result";

pub const META: RuleMeta = RuleMeta {
    name: RULE_NAME,
    category: "Possible Errors",
    recommended: Level::Error,
    description: "Not handling a Result is a possible error because errors could remain unhandled.",
    requires_types: true,
};

/// Read-only inputs of one run.
struct Analysis<'a, O> {
    tree: &'a SyntaxTree,
    scopes: &'a ScopeAnalysis,
    oracle: &'a O,
    options: &'a RuleOptions,
}

/// How a producer's obligation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// Type-level or declarative position, or not a result.
    NotApplicable,
    Handled,
    Checked,
    Returned,
    /// Bound to a variable and some use of it discharged the obligation.
    Deferred,
    Unhandled,
}

impl Verdict {
    fn discharges(self) -> bool {
        self != Verdict::Unhandled
    }
}

struct MustUseResult<'a, 's, O> {
    analysis: Analysis<'a, O>,
    reporter: Reporter<'s>,
    /// Variable references currently being evaluated, to cut alias cycles.
    in_progress: HashSet<NodeId>,
}

/// Run the rule over one analyzed unit, reporting into `sink`.
///
/// Fails with [`LintError::TypesUnavailable`] before looking at any node when no
/// oracle is given. Returns the number of diagnostics reported.
pub fn run<O: TypeOracle>(
    tree: &SyntaxTree,
    scopes: &ScopeAnalysis,
    oracle: Option<&O>,
    options: &RuleOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<usize, LintError> {
    let Some(oracle) = oracle else {
        return Err(LintError::TypesUnavailable);
    };
    if !options.enabled {
        debug!(rule = RULE_NAME, "rule disabled");
        return Ok(0);
    }

    let mut rule = MustUseResult {
        analysis: Analysis { tree, scopes, oracle, options },
        reporter: Reporter::new(sink),
        in_progress: HashSet::new(),
    };
    walk_tree(&mut rule, tree);
    let reported = rule.reporter.count();
    debug!(rule = RULE_NAME, reported, "rule finished");
    Ok(reported)
}

impl<O: TypeOracle> Visitor for MustUseResult<'_, '_, O> {
    fn visit_node(&mut self, tree: &SyntaxTree, id: NodeId) {
        match tree.kind(id) {
            NodeKind::CallExpression { .. } if !self.is_awaited(id) => {
                self.process(Obligation::producer(id));
            }
            NodeKind::NewExpression { .. } | NodeKind::AwaitExpression { .. } => {
                self.process(Obligation::producer(id));
            }
            _ => {}
        }
        walk_node(self, tree, id);
    }
}

impl<O: TypeOracle> MustUseResult<'_, '_, O> {
    /// A call that is the direct operand of `await` is judged through the await.
    fn is_awaited(&self, call: NodeId) -> bool {
        let tree = self.analysis.tree;
        tree.parent(call)
            .is_some_and(|p| matches!(tree.kind(p), NodeKind::AwaitExpression { argument } if *argument == call))
    }

    /// Evaluate one producer or variable use, reporting it if it is an undischarged producer.
    fn process(&mut self, obligation: Obligation) -> Verdict {
        let verdict = self.evaluate(obligation);
        trace!(node = obligation.origin.index(), ?verdict, is_reference = obligation.is_reference, "evaluated");
        verdict
    }

    fn evaluate(&mut self, obligation: Obligation) -> Verdict {
        let Obligation { origin: node, mut report_as, is_reference } = obligation;
        let analysis = &self.analysis;
        let tree = analysis.tree;

        if let Some(parent) = tree.parent(node) {
            let parent = tree.kind(parent);
            if parent.is_type_level() || parent.is_declaration_boundary() {
                return Verdict::NotApplicable;
            }
        }
        if !analysis.is_result_like(node) {
            return Verdict::NotApplicable;
        }
        if analysis.is_handled_result(node) {
            return Verdict::Handled;
        }
        if is_reference && analysis.is_checked_result(node) {
            return Verdict::Checked;
        }
        if analysis.is_returned(node) {
            return Verdict::Returned;
        }

        if let Some(Transfer { variable, binding, report_as: blamed }) =
            analysis.deferral_of(node).and_then(|d| analysis.transfer(d))
        {
            report_as = blamed;
            let uses: Vec<NodeId> = variable
                .references
                .iter()
                .map(|r| r.identifier)
                .filter(|&ident| ident != binding)
                .collect();
            debug!(variable = %variable.name, uses = uses.len(), "result bound to variable");
            if self.any_use_discharges(&uses, report_as) {
                return Verdict::Deferred;
            }
        }

        if !is_reference {
            self.reporter.report(tree, report_as);
        }
        Verdict::Unhandled
    }

    fn any_use_discharges(&mut self, uses: &[NodeId], report_as: NodeId) -> bool {
        for &ident in uses {
            if !self.in_progress.insert(ident) {
                continue;
            }
            let verdict = self.process(Obligation::reference(ident, report_as));
            self.in_progress.remove(&ident);
            if verdict.discharges() {
                return true;
            }
        }
        false
    }
}
