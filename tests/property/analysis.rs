//! Property-based tests for the analysis pipeline.
//!
//! Programs are generated from a small statement grammar over a fixed set of
//! result-returning declarations.

use std::collections::HashSet;

use proptest::prelude::*;
use resultlint::{Config, lint_source};

const PRELUDE: &str = "\
declare class R<T> { isOk(): boolean; map<A>(f: (t: T) => A): R<A>; mapErr(): R<T>; andThen(): R<T>; orElse(): R<T>; match(): T; unwrapOr(v: T): T }
declare function getResult(): R<string>
declare function getNormal(): number
";

fn arb_var() -> impl Strategy<Value = String> {
    (0u8..4).prop_map(|n| format!("v{n}"))
}

fn arb_producer() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("getResult()".to_string()),
        Just("getResult().map(x => x)".to_string()),
        Just("new R()".to_string()),
        Just("getNormal()".to_string()),
    ]
}

fn arb_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        (arb_var(), arb_producer()).prop_map(|(v, p)| format!("var {v} = {p}")),
        (arb_var(), arb_producer()).prop_map(|(v, p)| format!("{v} = {p}")),
        arb_producer(),
        arb_producer().prop_map(|p| format!("{p}.unwrapOr('')")),
        arb_var().prop_map(|v| format!("{v}.match()")),
        arb_var().prop_map(|v| format!("if ({v}.isOk()) {{ getNormal() }}")),
        (arb_var(), arb_var()).prop_map(|(a, b)| format!("var {a} = {b}")),
        arb_producer().prop_map(|p| format!("function f() {{ return {p} }}")),
        arb_producer().prop_map(|p| format!("const g = () => {p}")),
    ]
}

fn arb_program() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_statement(), 1..8).prop_map(|stmts| stmts.join("\n"))
}

fn handled_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("getResult().unwrapOr('')".to_string()),
        Just("getResult().map(x => x).match()".to_string()),
        Just("function f() { return getResult() }".to_string()),
        Just("const g = () => getResult().map(x => x)".to_string()),
        Just("getNormal()".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn lint_is_idempotent(code in arb_program()) {
        let source = format!("{PRELUDE}{code}\n");
        let first = lint_source(&source, &Config::default()).unwrap();
        let second = lint_source(&source, &Config::default()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn each_node_reported_at_most_once(code in arb_program()) {
        let source = format!("{PRELUDE}{code}\n");
        let diags = lint_source(&source, &Config::default()).unwrap();
        let nodes: HashSet<_> = diags.iter().map(|d| d.node).collect();
        prop_assert_eq!(nodes.len(), diags.len());
        for d in &diags {
            prop_assert!(d.span.start < d.span.end && d.span.end <= source.len());
        }
    }

    #[test]
    fn handled_programs_are_clean(stmts in prop::collection::vec(handled_statement(), 1..6)) {
        let source = format!("{PRELUDE}{}\n", stmts.join("\n"));
        prop_assert!(lint_source(&source, &Config::default()).unwrap().is_empty());
    }

    #[test]
    fn disabling_the_rule_silences_everything(code in arb_program()) {
        let source = format!("{PRELUDE}{code}\n");
        let mut config = Config::default();
        config.must_use_result.enabled = false;
        prop_assert!(lint_source(&source, &config).unwrap().is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn truncated_input_does_not_panic(code in arb_program(), cut in 0usize..400) {
        let source = format!("{PRELUDE}{code}\n");
        let mut end = cut.min(source.len());
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        // Either outcome is fine; reaching here without a panic is the property.
        let _ = lint_source(&source[..end], &Config::default());
    }
}
