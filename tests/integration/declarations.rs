//! Positions that are not value uses, and producers nested in declarations.

mod common;
use common::{flagged, lint};

#[test]
fn class_property_initializer_is_ignored() {
    assert!(lint("class Service {\n  current = getResult()\n}\n").is_empty());
}

#[test]
fn type_level_wrappers_are_ignored() {
    assert!(lint("getResult() as unknown\n").is_empty());
    assert!(lint("getResult()!\n").is_empty());
    assert!(lint("getResult() satisfies Result<string, Error>\n").is_empty());
}

#[test]
fn method_bodies_are_analyzed() {
    assert_eq!(flagged("class Service {\n  run() {\n    getResult()\n  }\n}\n"), vec!["getResult()"]);
    assert!(lint("class Service {\n  run() {\n    return getResult()\n  }\n}\n").is_empty());
}

#[test]
fn function_expression_body() {
    assert_eq!(flagged("const f = function () {\n  obj.get()\n}\n"), vec!["obj.get()"]);
}

#[test]
fn object_literal_members() {
    let code = "const api = { load: getResult }\napi.load()\n";
    assert_eq!(flagged(code), vec!["api.load()"]);
    assert!(lint("const api = { load: () => getResult() }\n").is_empty());
}

#[test]
fn inferred_return_types() {
    let code = "function produce() {\n  return getResult()\n}\nproduce()\n";
    assert_eq!(flagged(code), vec!["produce()"]);
    assert!(lint("function produce() {\n  return getResult()\n}\nproduce().unwrapOr('')\n").is_empty());
}

#[test]
fn for_of_over_results() {
    let code = "declare const all: Result<string, Error>[]\nfor (const r of all) {\n  r.map(x => x)\n}\n";
    assert_eq!(flagged(code), vec!["r.map(x => x)"]);
}

#[test]
fn imports_are_skipped() {
    let code = "import { ok, err } from 'neverthrow'\ngetNormal()\n";
    assert!(lint(code).is_empty());
}
