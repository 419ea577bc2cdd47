//! Snapshot tests for rendered diagnostics.
//!
//! Run `cargo insta review` to review changes.

use std::path::Path;

use insta::assert_snapshot;
use resultlint::diagnostics::{JsonDiagnostic, format_plain};
use resultlint::span::LineIndex;
use resultlint::{Config, lint_source};

const HEADER: &str = "\
declare class R { map(): R; mapErr(): R; andThen(): R; orElse(): R; match(): number; unwrapOr(): number }
declare function make(): R
";

#[test]
fn plain_format() {
    let source = format!("{HEADER}const kept = make()\nmake()\nmake().match()\n");
    let diags = lint_source(&source, &Config::default()).unwrap();
    assert_snapshot!(format_plain(Path::new("src/app.ts"), &source, &diags), @r"
    src/app.ts:3:7: must-use-result: Result must be handled with either of match, unwrapOr or _unsafeUnwrap.
    src/app.ts:4:1: must-use-result: Result must be handled with either of match, unwrapOr or _unsafeUnwrap.
    ");
}

#[test]
fn json_format() {
    let source = format!("{HEADER}make()\n");
    let diags = lint_source(&source, &Config::default()).unwrap();
    let index = LineIndex::new(&source);
    let items: Vec<_> = diags.iter().map(|d| JsonDiagnostic::new(Path::new("src/app.ts"), &index, d)).collect();
    assert_snapshot!(serde_json::to_string_pretty(&items).unwrap(), @r#"
    [
      {
        "file": "src/app.ts",
        "line": 3,
        "column": 1,
        "endLine": 3,
        "endColumn": 7,
        "rule": "must-use-result",
        "messageId": "mustUseResult",
        "message": "Result must be handled with either of match, unwrapOr or _unsafeUnwrap."
      }
    ]
    "#);
}

#[test]
fn clean_source_renders_nothing() {
    let source = format!("{HEADER}make().unwrapOr()\n");
    let diags = lint_source(&source, &Config::default()).unwrap();
    assert_snapshot!(format_plain(Path::new("src/app.ts"), &source, &diags), @"");
}
