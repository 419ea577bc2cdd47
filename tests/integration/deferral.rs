mod common;
use common::{flagged, lint};

#[test]
fn any_handled_use_discharges() {
    assert!(lint("const r = getResult()\nconsole.log(r)\nr.unwrapOr('')\n").is_empty());
}

#[test]
fn unhandled_uses_blame_the_binding() {
    assert_eq!(flagged("const r = getResult()\nconsole.log(r)\nr.map(x => x)\n"), vec!["r", "r.map(x => x)"]);
}

#[test]
fn alias_that_is_handled() {
    assert!(lint("const a = getResult()\nconst b = a\nb.unwrapOr('')\n").is_empty());
}

#[test]
fn alias_chain_reports_once() {
    assert_eq!(flagged("const a = getResult()\nconst b = a\nconst c = b\n"), vec!["a"]);
}

#[test]
fn returned_variable() {
    assert!(lint("function f() {\n  const r = getResult()\n  return r\n}\n").is_empty());
    assert!(lint("const f = () => {\n  const r = getResult()\n  return r\n}\n").is_empty());
}

#[test]
fn use_inside_closure() {
    assert!(lint("const r = getResult()\nfunction g() {\n  return r.unwrapOr('')\n}\n").is_empty());
}

#[test]
fn reassignment_moves_obligation_to_variable() {
    let code = "let r: Result<string, Error> = getResult()\nr = getResult()\nr.match(() => 1, () => 2)\n";
    assert!(lint(code).is_empty());
}

#[test]
fn unhandled_reassignment_blames_target() {
    assert_eq!(flagged("let s = getResult()\ns = getResult()\n"), vec!["s", "s"]);
}

#[test]
fn both_branches_report_once() {
    assert_eq!(flagged("const r = getNormal() > 1 ? getResult() : getResult()\n"), vec!["r"]);
}

#[test]
fn shadowed_name_is_a_different_variable() {
    let code = "const r = getResult()\n{\n  const r = getNormal()\n  console.log(r)\n}\n";
    assert_eq!(flagged(code), vec!["r"]);
}

#[test]
fn hoisted_var_use_before_declaration() {
    assert!(lint("function f() {\n  r.unwrapOr('')\n  var r = getResult()\n}\n").is_empty());
}

#[test]
fn destructuring_does_not_defer() {
    assert_eq!(flagged("const { value } = new Ok(1)\n"), vec!["new Ok(1)"]);
}

#[test]
fn assigning_a_non_result_does_not_defer() {
    let code = "declare function toNum(r: Result<string, Error>): number\nlet n = 0\nn = toNum(getResult())\nconsole.log(n)\n";
    assert_eq!(flagged(code), vec!["getResult()"]);
}
