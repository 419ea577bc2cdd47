mod common;
use common::{config, flagged, flagged_with, lint, lint_with};

#[test]
fn if_is_ok() {
    assert!(lint("const r = getResult()\nif (r.isOk()) {\n  console.log('ok')\n}\n").is_empty());
}

#[test]
fn negated_and_combined_guards() {
    assert!(lint("const r = getResult()\nif (!r.isErr()) {}\n").is_empty());
    assert!(lint("const r = getResult()\nwhile (r.isOk() && getNormal() > 0) {}\n").is_empty());
    assert!(lint("const r = getResult()\nconst n = r.isOk() ? 1 : 2\n").is_empty());
}

#[test]
fn guard_outside_a_test_does_not_check() {
    assert_eq!(flagged("const r = getResult()\nconst ok = r.isOk()\n"), vec!["r"]);
}

#[test]
fn anywhere_policy_accepts_any_invoked_guard() {
    let cfg = config("[rules.must-use-result]\nguard-policy = \"anywhere\"\n");
    assert!(lint_with("const r = getResult()\nconst ok = r.isOk()\n", &cfg).is_empty());
}

#[test]
fn guard_on_producer_is_not_a_check() {
    assert_eq!(flagged("if (getResult().isOk()) {}\n"), vec!["getResult()"]);
}

#[test]
fn guard_must_be_called() {
    assert_eq!(flagged("const r = getResult()\nif (r.isOk) {}\n"), vec!["r"]);
}

#[test]
fn custom_guard_methods() {
    let cfg = config("[rules.must-use-result]\nguard-methods = [\"isErr\"]\n");
    assert_eq!(flagged_with("const r = getResult()\nif (r.isOk()) {}\n", &cfg), vec!["r"]);
    assert!(lint_with("const r = getResult()\nif (r.isErr()) {}\n", &cfg).is_empty());
}

#[test]
fn loop_tests_control_branches() {
    assert!(lint("const r = getResult()\nfor (; r.isOk(); ) {}\n").is_empty());
    assert!(lint("const r = getResult()\ndo {} while (!r.isErr())\n").is_empty());
}
