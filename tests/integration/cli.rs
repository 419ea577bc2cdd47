mod common;
use common::{PRELUDE, resultlint};

use std::path::{Path, PathBuf};

fn write_source(dir: &Path, name: &str, code: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("{PRELUDE}{code}")).unwrap();
    path
}

#[test]
fn clean_file_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "clean.ts", "getResult().unwrapOr('')\n");
    let output = resultlint().arg("check").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn findings_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "bad.ts", "getResult()\n");
    let output = resultlint().arg("check").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 problem(s) in 1 file(s)"), "{stderr}");
}

#[test]
fn json_output() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "bad.ts", "const r = getResult()\ngetResult()\n");
    let output = resultlint().args(["check", "--format", "json"]).arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["rule"], "must-use-result");
    assert_eq!(items[0]["messageId"], "mustUseResult");
    assert_eq!(items[0]["column"], 7);
    assert_eq!(items[1]["column"], 1);
    assert_eq!(items[1]["line"].as_u64().unwrap(), items[0]["line"].as_u64().unwrap() + 1);
}

#[test]
fn several_files_are_all_linted() {
    let dir = tempfile::tempdir().unwrap();
    let a = write_source(dir.path(), "a.ts", "getResult()\n");
    let b = write_source(dir.path(), "b.ts", "obj.get()\n");
    let output = resultlint().args(["check", "--format", "json"]).arg(&a).arg(&b).output().unwrap();
    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files: Vec<&str> = items.as_array().unwrap().iter().map(|i| i["file"].as_str().unwrap()).collect();
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("a.ts") && files[1].ends_with("b.ts"));
}

#[test]
fn syntax_error_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.ts");
    std::fs::write(&file, "const = ;\n").unwrap();
    let output = resultlint().arg("check").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Syntax error"));
}

#[test]
fn unparsable_file_does_not_hide_other_results() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.ts");
    std::fs::write(&broken, "const = ;\n").unwrap();
    let bad = write_source(dir.path(), "bad.ts", "getResult()\n");
    let output = resultlint().args(["check", "--format", "json"]).arg(&broken).arg(&bad).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("broken.ts"));

    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0]["file"].as_str().unwrap().ends_with("bad.ts"));
}

#[test]
fn missing_file_exits_two() {
    let output = resultlint().args(["check", "/nonexistent/missing.ts"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("I/O error"));
}

#[test]
fn sibling_config_is_discovered() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "bad.ts", "getResult()\n");
    std::fs::write(dir.path().join("resultlint.toml"), "[rules.must-use-result]\nenabled = false\n").unwrap();
    let output = resultlint().arg("check").arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn explicit_config_errors_exit_two() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_source(dir.path(), "bad.ts", "getResult()\n");
    let cfg = dir.path().join("custom.toml");
    std::fs::write(&cfg, "[rules.must-use-result]\nhandler-methods = \"match\"\n").unwrap();
    let output = resultlint().arg("check").arg("--config").arg(&cfg).arg(&file).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("config"));
}

#[test]
fn rules_lists_registry() {
    let output = resultlint().arg("rules").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("must-use-result"));
    assert!(stdout.contains("Possible Errors"));
}

#[test]
fn check_requires_files() {
    let output = resultlint().arg("check").output().unwrap();
    assert!(!output.status.success());
}
