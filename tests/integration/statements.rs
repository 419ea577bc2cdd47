mod common;
use common::{PRELUDE, flagged, lint};

use resultlint::{Config, lint_source};

// ── Comments ──────────────────────────────────────────────────

#[test]
fn block_and_doc_comments_are_skipped() {
    let code = "/** Fetch the thing.\n * @returns a result\n */\n/* x * y */ getResult()\n";
    assert_eq!(flagged(code), vec!["getResult()"]);
}

#[test]
fn commented_prelude_still_lints() {
    let source = format!("/** Library declarations. */\n{PRELUDE}/* inline */ getResult() // trailing\n");
    let diags = lint_source(&source, &Config::default()).unwrap();
    assert_eq!(diags.len(), 1);
}

// ── Control flow ──────────────────────────────────────────────

#[test]
fn switch_cases_are_linted() {
    let code = "switch (getNormal()) {\n  case 1:\n    getResult()\n    break\n  case 2:\n    const r = getResult()\n    r.unwrapOr('')\n    break\n  default:\n    getResult().unwrapOr('')\n}\n";
    assert_eq!(flagged(code), vec!["getResult()"]);
}

#[test]
fn labeled_classic_for_with_holes() {
    let code = "outer: for (let i = 0; i < 3; i++) {\n  for (const x of [1, , 2]) {\n    if (x > 1) continue outer\n    getResult()\n  }\n}\n";
    assert_eq!(flagged(code), vec!["getResult()"]);
}

#[test]
fn for_in_do_while_and_try() {
    let code = "for (const key in { a: 1 }) {\n  getResult()\n}\n\
                do {\n  getResult().unwrapOr('')\n} while (getNormal() > 0)\n\
                try {\n  getResult()\n} catch (e) {\n  console.log(e)\n} finally {\n  getResult().match(() => 1, () => 2)\n}\n";
    assert_eq!(flagged(code), vec!["getResult()", "getResult()"]);
}

#[test]
fn optional_chaining() {
    assert!(lint("getResult()?.unwrapOr(1)\n").is_empty());
    assert_eq!(flagged("obj?.get()\nobj.get?.()\n"), vec!["obj?.get()", "obj.get?.()"]);
}

#[test]
fn array_destructuring_with_holes() {
    assert!(lint("const [first, , third] = [getNormal(), 2, 3]\nconsole.log(first, third)\n").is_empty());
}
