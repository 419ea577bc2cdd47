mod common;
use common::{config, flagged, flagged_with, lint, lint_with};

const LITE: &str = "declare class Lite {\n  map(): Lite;\n  mapErr(): Lite;\n  andThen(): Lite;\n  orElse(): Lite;\n  match(): number;\n  unwrapOr(): number;\n}\ndeclare function lite(): Lite\n";

#[test]
fn disabled_rule() {
    let cfg = config("[rules.must-use-result]\nenabled = false\n");
    assert!(lint_with("getResult()\n", &cfg).is_empty());
}

#[test]
fn extra_handler_method() {
    let code = "getResult().map(x => x)\n";
    assert_eq!(lint(code).len(), 2);

    let cfg = config("[rules.must-use-result]\nhandler-methods = [\"match\", \"unwrapOr\", \"_unsafeUnwrap\", \"map\"]\n");
    assert_eq!(flagged_with(code, &cfg), vec!["getResult().map(x => x)"]);
}

#[test]
fn removed_handler_method() {
    let cfg = config("[rules.must-use-result]\nhandler-methods = [\"match\"]\n");
    assert_eq!(flagged_with("getResult().unwrapOr('')\n", &cfg), vec!["getResult()"]);
}

#[test]
fn require_guard_members() {
    let code = format!("{LITE}lite()\n");
    assert_eq!(flagged(&code), vec!["lite()"]);

    let cfg = config("[rules.must-use-result]\nrequire-guard-members = true\n");
    assert!(lint_with(&code, &cfg).is_empty());
    // the full result type still qualifies
    assert_eq!(lint_with("getResult()\n", &cfg).len(), 1);
}

#[test]
fn custom_result_members() {
    let code = "declare function maybe(): { unwrapOr(v: number): number }\nmaybe()\n";
    assert!(lint(code).is_empty());

    let cfg = config("[rules.must-use-result]\nresult-members = [\"unwrapOr\"]\n");
    assert_eq!(flagged_with(code, &cfg), vec!["maybe()"]);
}

#[test]
fn config_file_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resultlint.toml");
    std::fs::write(&path, "[rules.must-use-result]\nguard-policy = \"anywhere\"\n").unwrap();
    let cfg = resultlint::Config::load(&path).unwrap();
    assert_eq!(cfg.must_use_result.guard_policy, resultlint::config::GuardPolicy::Anywhere);
    assert_eq!(cfg.source.as_deref(), Some(path.as_path()));
}
