mod common;
use common::{flagged, lint};

use resultlint::diagnostics::MessageId;

// ── Handled results ───────────────────────────────────────────

#[test]
fn unwrap_or_on_variable() {
    assert!(lint("const result = getResult()\n\nresult.unwrapOr()\n").is_empty());
}

#[test]
fn unwrap_or_after_chain() {
    assert!(lint("const result = getResult()\n\nresult.map(() => {}).unwrapOr('')\n").is_empty());
}

#[test]
fn match_on_variable() {
    assert!(lint("const result = getResult()\nresult.match(() => {}, () => {})\n").is_empty());
}

#[test]
fn unsafe_unwrap_directly() {
    assert!(lint("getResult()._unsafeUnwrap()\n").is_empty());
}

#[test]
fn long_chain_ending_in_handler() {
    assert!(lint("getResult().map(x => x).mapErr(e => e).andThen(x => getResult()).match(a => a, e => '')\n")
        .is_empty());
}

#[test]
fn returned_from_function() {
    assert!(lint("function main() {\n  return getResult().map(() => {})\n}\n").is_empty());
}

#[test]
fn returned_from_arrow_expression_body() {
    assert!(lint("const main = () => getResult().map(() => {})\n").is_empty());
}

#[test]
fn non_result_calls_are_ignored() {
    assert!(lint("getNormal()\n").is_empty());
    assert!(lint("mystery()\nconsole.log(getNormal())\n").is_empty());
}

#[test]
fn source_without_result_types() {
    let diags = resultlint::lint_source("getNormal()\n", &resultlint::Config::default()).unwrap();
    assert!(diags.is_empty());
}

// ── Unhandled results ─────────────────────────────────────────

#[test]
fn only_assignment() {
    assert_eq!(flagged("const result = getResult()\n"), vec!["result"]);
}

#[test]
fn map_is_not_a_handler() {
    assert_eq!(
        flagged("const result = getResult();\nresult.map(() => {})\n"),
        vec!["result", "result.map(() => {})"]
    );
}

#[test]
fn only_call() {
    assert_eq!(flagged("getResult()\n"), vec!["getResult()"]);
}

#[test]
fn passed_to_external_function() {
    assert_eq!(flagged("const v = getResult()\nexternaFunction(v)\n"), vec!["v"]);
}

#[test]
fn call_through_object_member() {
    assert_eq!(flagged("obj.get()\n"), vec!["obj.get()"]);
}

#[test]
fn handler_accessed_but_not_called() {
    assert_eq!(flagged("getResult().unwrapOr\n"), vec!["getResult()"]);
}

#[test]
fn chain_inside_function_body() {
    assert_eq!(
        flagged("function main() {\n  getResult().map(() => {})\n}\n"),
        vec!["getResult()", "getResult().map(() => {})"]
    );
}

#[test]
fn unhandled_inside_arrow_block_body() {
    assert_eq!(flagged("const f = () => {\n  getResult()\n}\n"), vec!["getResult()"]);
}

#[test]
fn new_result_instance() {
    assert_eq!(flagged("new Ok(1)\n"), vec!["new Ok(1)"]);
    assert!(lint("new Err('boom').unwrapOr(0)\n").is_empty());
}

#[test]
fn diagnostics_carry_message() {
    let diags = lint("getResult()\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule, "must-use-result");
    assert_eq!(diags[0].message_id, MessageId::MustUseResult);
    assert_eq!(diags[0].message(), "Result must be handled with either of match, unwrapOr or _unsafeUnwrap.");
}

#[test]
fn linting_is_idempotent() {
    let code = "const a = getResult()\nconst b = a\ngetResult().map(x => x)\nfunction f() { obj.get() }\n";
    assert_eq!(lint(code), lint(code));
}
