pub mod env;
pub mod infer;
pub mod types;

use std::collections::HashMap;
use std::fmt;

use crate::parser::ast::{MemberSig, NodeId, SyntaxTree, TypeExpr};
use crate::scope::ScopeAnalysis;
use env::TypeEnv;
use infer::Checker;
use types::{Primitive, Ty};

/// Type queries the analysis needs from a type checker.
pub trait TypeOracle {
    type Type: Clone + fmt::Debug;

    /// Apparent type of an expression node.
    fn type_of(&self, node: NodeId) -> Self::Type;

    /// Type produced by awaiting a value of type `ty`.
    fn awaited_type(&self, ty: &Self::Type) -> Self::Type;

    /// Constituents of a union type; a non-union yields itself.
    fn union_parts(&self, ty: &Self::Type) -> Vec<Self::Type>;

    /// Whether the type declares a property or method with this name.
    fn has_member(&self, ty: &Self::Type, name: &str) -> bool;
}

impl TypeOracle for Checker<'_> {
    type Type = Ty;

    fn type_of(&self, node: NodeId) -> Ty {
        Checker::type_of(self, node)
    }

    fn awaited_type(&self, ty: &Ty) -> Ty {
        self.awaited(ty)
    }

    fn union_parts(&self, ty: &Ty) -> Vec<Ty> {
        Checker::union_parts(self, ty)
    }

    fn has_member(&self, ty: &Ty, name: &str) -> bool {
        Checker::has_member(self, ty, name)
    }
}

/// Build the type oracle for a parsed unit.
pub fn type_check<'t>(tree: &'t SyntaxTree, scopes: &'t ScopeAnalysis) -> Checker<'t> {
    Checker::new(tree, scopes, TypeEnv::collect(tree))
}

/// Convert written type syntax to a [`Ty`], replacing type parameters from `subst`.
pub fn resolve_type(ty: &TypeExpr, subst: &HashMap<String, Ty>) -> Ty {
    match ty {
        TypeExpr::Named { name, args } => {
            if args.is_empty() {
                if let Some(bound) = subst.get(name) {
                    return bound.clone();
                }
            }
            let args: Vec<Ty> = args.iter().map(|a| resolve_type(a, subst)).collect();
            match name.as_str() {
                "string" => Ty::Prim(Primitive::String),
                "number" => Ty::Prim(Primitive::Number),
                "boolean" => Ty::Prim(Primitive::Boolean),
                "bigint" => Ty::Prim(Primitive::BigInt),
                "symbol" => Ty::Prim(Primitive::Symbol),
                "object" => Ty::Prim(Primitive::Object),
                "any" => Ty::Any,
                "unknown" => Ty::Unknown,
                "never" => Ty::Never,
                "void" => Ty::Void,
                "null" => Ty::Null,
                "undefined" => Ty::Undefined,
                "Function" => Ty::Function(Box::new(Ty::Any)),
                "Promise" | "PromiseLike" => {
                    Ty::Promise(Box::new(args.into_iter().next().unwrap_or(Ty::Unknown)))
                }
                "Array" | "ReadonlyArray" => Ty::Array(Box::new(args.into_iter().next().unwrap_or(Ty::Unknown))),
                _ => Ty::Named { name: name.clone(), args },
            }
        }
        TypeExpr::Union(parts) => Ty::union(parts.iter().map(|p| resolve_type(p, subst)).collect()),
        TypeExpr::Intersection(parts) => Ty::Intersection(parts.iter().map(|p| resolve_type(p, subst)).collect()),
        TypeExpr::Function { ret } => Ty::Function(Box::new(resolve_type(ret, subst))),
        TypeExpr::Object(members) => Ty::Object(
            members
                .iter()
                .filter_map(|m| {
                    let ty = match &m.sig {
                        MemberSig::Property(t) => resolve_type(t, subst),
                        MemberSig::Method { ret } => Ty::Function(Box::new(resolve_type(ret, subst))),
                        MemberSig::Constructor => return None,
                    };
                    Some((m.name.clone(), ty))
                })
                .collect(),
        ),
        TypeExpr::Array(inner) => Ty::Array(Box::new(resolve_type(inner, subst))),
        TypeExpr::Tuple(items) => Ty::Tuple(items.iter().map(|i| resolve_type(i, subst)).collect()),
        TypeExpr::Literal(text) => Ty::Literal(text.clone()),
        TypeExpr::Opaque => Ty::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::NodeKind;
    use crate::parser::parse;
    use crate::scope::analyze;
    use crate::visit::collect_nodes;

    const PRELUDE: &str = "\
interface IResult<T, E> { isOk(): this is Ok<T, E>; map<A>(f: (t: T) => A): Result<A, E>; mapErr<U>(f: (e: E) => U): Result<T, U>; unwrapOr<A>(v: A): T | A }
declare class Ok<T, E> implements IResult<T, E> { readonly value: T; constructor(value: T); map<A>(f: (t: T) => A): Result<A, E>; mapErr<U>(f: (e: E) => U): Result<T, U>; unwrapOr<A>(v: A): T | A }
declare class Err<T, E> implements IResult<T, E> { readonly error: E; constructor(error: E); map<A>(f: (t: T) => A): Result<A, E>; mapErr<U>(f: (e: E) => U): Result<T, U>; unwrapOr<A>(v: A): T | A }
declare type Result<T, E> = Ok<T, E> | Err<T, E>;
declare function getResult(): Result<string, Error>
declare function getRes(): Promise<Result<string, Error>>
declare function getNormal(): number
";

    /// Type of the init of the last declared variable in `src`.
    fn last_init_type(src: &str, check: impl Fn(&Checker<'_>, &Ty)) {
        let source = format!("{PRELUDE}{src}");
        let tree = parse(&source).unwrap_or_else(|e| panic!("{e}"));
        let scopes = analyze(&tree);
        let checker = type_check(&tree, &scopes);
        let declarators = collect_nodes(&tree, |k| matches!(k, NodeKind::VariableDeclarator { init: Some(_), .. }));
        let Some(&last) = declarators.last() else { panic!("no initialised declarator") };
        let NodeKind::VariableDeclarator { init: Some(init), .. } = tree.kind(last) else { unreachable!() };
        let ty = checker.type_of(*init);
        check(&checker, &ty);
    }

    fn is_result(checker: &Checker<'_>, ty: &Ty) -> bool {
        checker.union_parts(ty).iter().any(|p| ["map", "mapErr", "unwrapOr"].iter().all(|m| checker.has_member(p, m)))
    }

    #[test]
    fn call_of_declared_function() {
        last_init_type("const r = getResult()", |c, ty| {
            assert_eq!(c.union_parts(ty).len(), 2);
            assert!(is_result(c, ty));
        });
    }

    #[test]
    fn method_chain_keeps_result() {
        last_init_type("const r = getResult().map(x => x).mapErr(e => e)", |c, ty| assert!(is_result(c, ty)));
    }

    #[test]
    fn unwrap_or_leaves_result() {
        last_init_type("const r = getResult().unwrapOr('')", |c, ty| assert!(!is_result(c, ty)));
    }

    #[test]
    fn awaited_promise() {
        last_init_type("const p = getRes()", |c, ty| {
            assert!(!is_result(c, ty));
            assert!(is_result(c, &c.awaited(ty)));
        });
        last_init_type("const r = await getRes()", |c, ty| assert!(is_result(c, ty)));
    }

    #[test]
    fn new_instance_inherits_interface_members() {
        last_init_type("const r = new Ok(1)", |c, ty| {
            assert!(is_result(c, ty));
            assert!(c.has_member(ty, "isOk"));
        });
    }

    #[test]
    fn object_type_and_literal_members() {
        last_init_type("const obj: { get: () => Result<string, Error> } = x\nconst r = obj.get()", |c, ty| {
            assert!(is_result(c, ty))
        });
        last_init_type("const o = { get: getResult }\nconst r = o.get()", |c, ty| assert!(is_result(c, ty)));
    }

    #[test]
    fn inferred_function_returns() {
        last_init_type("function produce() { return getResult() }\nconst r = produce()", |c, ty| {
            assert!(is_result(c, ty))
        });
        last_init_type("const produce = async () => getResult()\nconst r = await produce()", |c, ty| {
            assert!(is_result(c, ty))
        });
    }

    #[test]
    fn any_and_unknown_have_no_members() {
        last_init_type("const r = mystery()", |c, ty| {
            assert_eq!(*ty, Ty::Unknown);
            assert!(!c.has_member(ty, "map"));
        });
        last_init_type("declare const a: any\nconst r = a", |c, ty| assert!(!c.has_member(ty, "map")));
    }

    #[test]
    fn self_referential_alias_terminates() {
        last_init_type("type Loop = Loop\ndeclare const l: Loop\nconst r = l", |c, ty| {
            assert!(c.union_parts(ty).iter().all(|p| !c.has_member(p, "map")));
        });
    }

    #[test]
    fn cyclic_variables_terminate() {
        last_init_type("let a = b\nlet b = a\nconst r = a", |c, ty| assert!(!is_result(c, ty)));
    }
}
