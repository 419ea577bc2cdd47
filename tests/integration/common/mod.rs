#![allow(dead_code)]

use std::process::Command;

use resultlint::diagnostics::Diagnostic;
use resultlint::{Config, lint_source};

/// Declarations of a neverthrow-style result library plus a few producers.
pub const PRELUDE: &str = r#"
declare interface ErrorConfig {
  withStackTrace: boolean;
}
declare type InferOkTypes<R> = R extends Result<infer T, unknown> ? T : never;
declare type InferErrTypes<R> = R extends Result<unknown, infer E> ? E : never;
declare type Result<T, E> = Ok<T, E> | Err<T, E>;
interface IResult<T, E> {
  isOk(): this is Ok<T, E>;
  isErr(): this is Err<T, E>;
  map<A>(f: (t: T) => A): Result<A, E>;
  mapErr<U>(f: (e: E) => U): Result<T, U>;
  andThen<R extends Result<unknown, unknown>>(f: (t: T) => R): Result<InferOkTypes<R>, InferErrTypes<R> | E>;
  andThen<U, F>(f: (t: T) => Result<U, F>): Result<U, E | F>;
  orElse<R extends Result<unknown, unknown>>(f: (e: E) => R): Result<T, InferErrTypes<R>>;
  orElse<A>(f: (e: E) => Result<T, A>): Result<T, A>;
  asyncAndThen<U, F>(f: (t: T) => ResultAsync<U, F>): ResultAsync<U, E | F>;
  asyncMap<U>(f: (t: T) => Promise<U>): ResultAsync<U, E>;
  unwrapOr<A>(v: A): T | A;
  match<A>(ok: (t: T) => A, err: (e: E) => A): A;
  _unsafeUnwrap(config?: ErrorConfig): T;
  _unsafeUnwrapErr(config?: ErrorConfig): E;
}

declare class Ok<T, E> implements IResult<T, E> {
  readonly value: T;
  constructor(value: T);
  isOk(): this is Ok<T, E>;
  isErr(): this is Err<T, E>;
  map<A>(f: (t: T) => A): Result<A, E>;
  mapErr<U>(_f: (e: E) => U): Result<T, U>;
  andThen<R extends Result<unknown, unknown>>(f: (t: T) => R): Result<InferOkTypes<R>, InferErrTypes<R> | E>;
  andThen<U, F>(f: (t: T) => Result<U, F>): Result<U, E | F>;
  orElse<R extends Result<unknown, unknown>>(_f: (e: E) => R): Result<T, InferErrTypes<R>>;
  orElse<A>(_f: (e: E) => Result<T, A>): Result<T, A>;
  asyncAndThen<U, F>(f: (t: T) => ResultAsync<U, F>): ResultAsync<U, E | F>;
  asyncMap<U>(f: (t: T) => Promise<U>): ResultAsync<U, E>;
  unwrapOr<A>(_v: A): T | A;
  match<A>(ok: (t: T) => A, _err: (e: E) => A): A;
  _unsafeUnwrap(_?: ErrorConfig): T;
  _unsafeUnwrapErr(config?: ErrorConfig): E;
}

declare class Err<T, E> implements IResult<T, E> {
  readonly error: E;
  constructor(error: E);
  isOk(): this is Ok<T, E>;
  isErr(): this is Err<T, E>;
  map<A>(_f: (t: T) => A): Result<A, E>;
  mapErr<U>(f: (e: E) => U): Result<T, U>;
  andThen<R extends Result<unknown, unknown>>(_f: (t: T) => R): Result<InferOkTypes<R>, InferErrTypes<R> | E>;
  andThen<U, F>(_f: (t: T) => Result<U, F>): Result<U, E | F>;
  orElse<R extends Result<unknown, unknown>>(f: (e: E) => R): Result<T, InferErrTypes<R>>;
  orElse<A>(f: (e: E) => Result<T, A>): Result<T, A>;
  asyncAndThen<U, F>(_f: (t: T) => ResultAsync<U, F>): ResultAsync<U, E | F>;
  asyncMap<U>(_f: (t: T) => Promise<U>): ResultAsync<U, E>;
  unwrapOr<A>(v: A): T | A;
  match<A>(_ok: (t: T) => A, err: (e: E) => A): A;
  _unsafeUnwrap(config?: ErrorConfig): T;
  _unsafeUnwrapErr(_?: ErrorConfig): E;
}

declare function getResult(): Result<string, Error>
declare function getRes(): Promise<Result<string, Error>>
declare function getNormal(): number
const obj: { get: () => Result<string, Error> }

"#;

pub fn resultlint() -> Command {
    Command::new(env!("CARGO_BIN_EXE_resultlint"))
}

/// Lint `code` appended to the prelude with default options.
pub fn lint(code: &str) -> Vec<Diagnostic> {
    lint_with(code, &Config::default())
}

pub fn lint_with(code: &str, config: &Config) -> Vec<Diagnostic> {
    let source = format!("{PRELUDE}{code}");
    lint_source(&source, config).unwrap_or_else(|e| panic!("lint failed: {e}"))
}

/// Source text each diagnostic points at, in report order.
pub fn flagged(code: &str) -> Vec<String> {
    flagged_with(code, &Config::default())
}

pub fn flagged_with(code: &str, config: &Config) -> Vec<String> {
    let source = format!("{PRELUDE}{code}");
    lint_with(code, config)
        .iter()
        .map(|d| source[d.span.start..d.span.end].to_string())
        .collect()
}

pub fn config(toml: &str) -> Config {
    Config::from_toml_str(toml, std::path::Path::new("resultlint.toml")).unwrap()
}
