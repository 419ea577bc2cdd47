mod common;
use common::{flagged, lint};

#[test]
fn awaited_results_handled_properly() {
    let code = "\
(await getRes()).unwrapOr(5);
const res1 = (await getRes()).unwrapOr(5);
const res2 = await getRes();
res2.unwrapOr(5);
";
    assert!(lint(code).is_empty());
}

#[test]
fn awaited_results_not_handled() {
    let code = "\
const res = await getRes();
const res1 = await getRes();
res1.unwrapOr;

await getRes();
";
    assert_eq!(flagged(code), vec!["res", "res1", "await getRes()"]);
}

#[test]
fn awaited_call_is_reported_once() {
    // the inner call is judged through its `await`
    assert_eq!(lint("await getRes()\n").len(), 1);
}

#[test]
fn pending_promise_is_not_a_result() {
    assert!(lint("const p = getRes()\n").is_empty());
    assert!(lint("getRes().then(r => r)\n").is_empty());
}

#[test]
fn awaited_inside_async_function() {
    assert!(lint("async function load() {\n  return await getRes()\n}\n").is_empty());
    assert_eq!(flagged("async function load() {\n  await getRes()\n}\n"), vec!["await getRes()"]);
}

#[test]
fn async_helper_result_awaited() {
    let code = "const load = async () => getResult()\nconst r = await load()\nr.match(v => v, e => '')\n";
    assert!(lint(code).is_empty());
    assert_eq!(flagged("const load = async () => getResult()\nawait load()\n"), vec!["await load()"]);
}
