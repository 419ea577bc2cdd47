use std::collections::HashMap;
use std::fmt;

use crate::parser::ast::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
}

/// Static type as seen by the structural checker.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    Any,
    Unknown,
    Never,
    Void,
    Null,
    Undefined,
    Prim(Primitive),
    Literal(String),
    /// Reference to a declared interface, class or alias. Aliases are expanded on demand.
    Named { name: String, args: Vec<Ty> },
    /// Object type literal with its members already converted.
    Object(Vec<(String, Ty)>),
    /// Type of an object literal expression; member types are inferred from its properties.
    ObjectLiteral(NodeId),
    /// Callable value. Only the return type is tracked.
    Function(Box<Ty>),
    /// The value of a class identifier; `new` on it yields an instance.
    ClassRef(String),
    Promise(Box<Ty>),
    Array(Box<Ty>),
    Tuple(Vec<Ty>),
    Union(Vec<Ty>),
    Intersection(Vec<Ty>),
}

impl Ty {
    pub fn named(name: impl Into<String>) -> Self {
        Ty::Named { name: name.into(), args: Vec::new() }
    }

    /// Flattening union constructor; a single member collapses to itself.
    pub fn union(parts: Vec<Ty>) -> Self {
        fn push_flat(flat: &mut Vec<Ty>, part: Ty) {
            match part {
                Ty::Union(inner) => inner.into_iter().for_each(|p| push_flat(flat, p)),
                Ty::Never => {}
                other if !flat.contains(&other) => flat.push(other),
                _ => {}
            }
        }

        let mut flat = Vec::new();
        for part in parts {
            push_flat(&mut flat, part);
        }
        match flat.len() {
            0 => Ty::Never,
            1 => flat.remove(0),
            _ => Ty::Union(flat),
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Ty::Null | Ty::Undefined | Ty::Void)
    }

    /// Recursively transform all inner types via `f`, rebuilding the structure.
    pub fn map_inner_types(&self, f: &impl Fn(&Ty) -> Ty) -> Ty {
        match self {
            Ty::Named { name, args } => Ty::Named { name: name.clone(), args: args.iter().map(f).collect() },
            Ty::Object(members) => Ty::Object(members.iter().map(|(n, t)| (n.clone(), f(t))).collect()),
            Ty::Function(ret) => Ty::Function(Box::new(f(ret))),
            Ty::Promise(inner) => Ty::Promise(Box::new(f(inner))),
            Ty::Array(inner) => Ty::Array(Box::new(f(inner))),
            Ty::Tuple(items) => Ty::Tuple(items.iter().map(f).collect()),
            Ty::Union(parts) => Ty::Union(parts.iter().map(f).collect()),
            Ty::Intersection(parts) => Ty::Intersection(parts.iter().map(f).collect()),
            other => other.clone(),
        }
    }

    /// Replace type parameters by name.
    pub fn substitute(&self, subst: &HashMap<String, Ty>) -> Ty {
        if subst.is_empty() {
            return self.clone();
        }
        match self {
            Ty::Named { name, args } if args.is_empty() && subst.contains_key(name) => subst[name].clone(),
            other => other.map_inner_types(&|t| t.substitute(subst)),
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, items: &[Ty], sep: &str) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, "{sep}")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }

        match self {
            Ty::Any => write!(f, "any"),
            Ty::Unknown => write!(f, "unknown"),
            Ty::Never => write!(f, "never"),
            Ty::Void => write!(f, "void"),
            Ty::Null => write!(f, "null"),
            Ty::Undefined => write!(f, "undefined"),
            Ty::Prim(p) => write!(f, "{}", match p {
                Primitive::String => "string",
                Primitive::Number => "number",
                Primitive::Boolean => "boolean",
                Primitive::BigInt => "bigint",
                Primitive::Symbol => "symbol",
                Primitive::Object => "object",
            }),
            Ty::Literal(text) => write!(f, "{text}"),
            Ty::Named { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    list(f, args, ", ")?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Ty::Object(members) => {
                write!(f, "{{ ")?;
                for (name, ty) in members {
                    write!(f, "{name}: {ty}; ")?;
                }
                write!(f, "}}")
            }
            Ty::ObjectLiteral(_) => write!(f, "{{ ... }}"),
            Ty::Function(ret) => write!(f, "(...) => {ret}"),
            Ty::ClassRef(name) => write!(f, "typeof {name}"),
            Ty::Promise(inner) => write!(f, "Promise<{inner}>"),
            Ty::Array(inner) => write!(f, "{inner}[]"),
            Ty::Tuple(items) => {
                write!(f, "[")?;
                list(f, items, ", ")?;
                write!(f, "]")
            }
            Ty::Union(parts) => list(f, parts, " | "),
            Ty::Intersection(parts) => list(f, parts, " & "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_flattens_and_dedups() {
        let u = Ty::union(vec![
            Ty::named("A"),
            Ty::Union(vec![Ty::named("B"), Ty::named("A")]),
            Ty::Never,
        ]);
        assert_eq!(u, Ty::Union(vec![Ty::named("A"), Ty::named("B")]));
        let nested = Ty::union(vec![Ty::Union(vec![Ty::named("A"), Ty::Union(vec![Ty::named("A"), Ty::Null])])]);
        assert_eq!(nested, Ty::Union(vec![Ty::named("A"), Ty::Null]));
        assert_eq!(Ty::union(vec![Ty::Null]), Ty::Null);
        assert_eq!(Ty::union(vec![]), Ty::Never);
    }

    #[test]
    fn substitute_params() {
        let ty = Ty::Named { name: "Ok".into(), args: vec![Ty::named("T"), Ty::named("E")] };
        let subst = HashMap::from([("T".to_string(), Ty::Prim(Primitive::String))]);
        assert_eq!(
            ty.substitute(&subst),
            Ty::Named { name: "Ok".into(), args: vec![Ty::Prim(Primitive::String), Ty::named("E")] }
        );
    }

    #[test]
    fn display() {
        let ty = Ty::Promise(Box::new(Ty::Union(vec![Ty::named("Ok"), Ty::Null])));
        assert_eq!(ty.to_string(), "Promise<Ok | null>");
        assert_eq!(Ty::Array(Box::new(Ty::Prim(Primitive::Number))).to_string(), "number[]");
    }
}
