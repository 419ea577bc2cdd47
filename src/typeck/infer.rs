use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::env::{ClassMemberKind, TypeEnv};
use super::resolve_type;
use super::types::{Primitive, Ty};
use crate::parser::ast::{
    BinaryOp, LiteralValue, LogicalOp, MemberSig, NodeId, NodeKind, SyntaxTree, TypeExpr, UnaryOp,
};
use crate::scope::ScopeAnalysis;

/// Alias expansion and inheritance walks give up past this depth.
const MAX_DEPTH: usize = 32;

/// Structural checker over one syntax tree. Expression types are inferred lazily
/// and memoized; a node whose type is requested while it is still being inferred
/// (a cycle through variables) is `unknown`.
pub struct Checker<'t> {
    tree: &'t SyntaxTree,
    scopes: &'t ScopeAnalysis,
    env: TypeEnv,
    cache: RefCell<HashMap<NodeId, Ty>>,
    in_flight: RefCell<HashSet<NodeId>>,
}

impl<'t> Checker<'t> {
    pub fn new(tree: &'t SyntaxTree, scopes: &'t ScopeAnalysis, env: TypeEnv) -> Self {
        Self { tree, scopes, env, cache: RefCell::default(), in_flight: RefCell::default() }
    }

    pub fn env(&self) -> &TypeEnv {
        &self.env
    }

    /// Type of an expression node.
    pub fn type_of(&self, node: NodeId) -> Ty {
        if let Some(ty) = self.cache.borrow().get(&node) {
            return ty.clone();
        }
        if !self.in_flight.borrow_mut().insert(node) {
            return Ty::Unknown;
        }
        let ty = self.infer(node);
        self.in_flight.borrow_mut().remove(&node);
        trace!(node = node.index(), kind = self.tree.kind(node).name(), ty = %ty, "inferred");
        self.cache.borrow_mut().insert(node, ty.clone());
        ty
    }

    fn infer(&self, node: NodeId) -> Ty {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::Identifier { name, .. } => self.identifier_type(node, name),
            NodeKind::Literal { value } => match value {
                LiteralValue::Number(_) => Ty::Prim(Primitive::Number),
                LiteralValue::String(_) => Ty::Prim(Primitive::String),
                LiteralValue::Bool(_) => Ty::Prim(Primitive::Boolean),
                LiteralValue::Null => Ty::Null,
            },
            NodeKind::ThisExpression => self.this_type(node),
            NodeKind::CallExpression { callee, .. } => self.call_result(&self.type_of(*callee), 0),
            NodeKind::NewExpression { callee, .. } => self.instantiate(&self.type_of(*callee)),
            NodeKind::AwaitExpression { argument } => self.awaited(&self.type_of(*argument)),
            NodeKind::MemberExpression { object, property, computed, optional } => {
                let object_ty = self.type_of(*object);
                let object_ty = if *optional { strip_nullish(object_ty) } else { object_ty };
                if *computed {
                    return self.element_type(&object_ty);
                }
                match tree.identifier_name(*property) {
                    Some(name) => self.member_type(&object_ty, name).unwrap_or(Ty::Unknown),
                    None => Ty::Unknown,
                }
            }
            NodeKind::ArrowFunctionExpression { .. } | NodeKind::FunctionExpression { .. } => {
                Ty::Function(Box::new(self.return_type(node)))
            }
            NodeKind::AssignmentExpression { right, .. } => self.type_of(*right),
            NodeKind::LogicalExpression { operator, left, right } => match operator {
                LogicalOp::And => self.type_of(*right),
                LogicalOp::Or | LogicalOp::Nullish => {
                    Ty::union(vec![strip_nullish(self.type_of(*left)), self.type_of(*right)])
                }
            },
            NodeKind::BinaryExpression { operator, left, right } => match operator {
                BinaryOp::Add => {
                    let is_string = |ty: Ty| ty == Ty::Prim(Primitive::String);
                    if is_string(self.type_of(*left)) || is_string(self.type_of(*right)) {
                        Ty::Prim(Primitive::String)
                    } else {
                        Ty::Prim(Primitive::Number)
                    }
                }
                BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Ty::Prim(Primitive::Number),
                _ => Ty::Prim(Primitive::Boolean),
            },
            NodeKind::UnaryExpression { operator, .. } => match operator {
                UnaryOp::Not => Ty::Prim(Primitive::Boolean),
                UnaryOp::Neg | UnaryOp::Plus => Ty::Prim(Primitive::Number),
            },
            NodeKind::UpdateExpression { .. } => Ty::Prim(Primitive::Number),
            NodeKind::ConditionalExpression { consequent, alternate, .. } => {
                Ty::union(vec![self.type_of(*consequent), self.type_of(*alternate)])
            }
            NodeKind::ObjectExpression { .. } => Ty::ObjectLiteral(node),
            NodeKind::ArrayExpression { elements } => {
                let items = elements
                    .iter()
                    .map(|&el| match tree.kind(el) {
                        NodeKind::SpreadElement { argument } => self.element_type(&self.type_of(*argument)),
                        _ => self.type_of(el),
                    })
                    .collect();
                Ty::Array(Box::new(Ty::union(items)))
            }
            NodeKind::SpreadElement { argument } => self.type_of(*argument),
            NodeKind::AsExpression { expression, annotation } => match tree.kind(*annotation) {
                // `as const` and other unmodeled targets keep the expression's own type
                NodeKind::TypeAnnotation { ty: TypeExpr::Opaque } => self.type_of(*expression),
                NodeKind::TypeAnnotation { ty } => resolve_type(ty, &HashMap::new()),
                _ => Ty::Unknown,
            },
            NodeKind::SatisfiesExpression { expression, .. } => self.type_of(*expression),
            NodeKind::NonNullExpression { expression } => strip_nullish(self.type_of(*expression)),
            _ => Ty::Unknown,
        }
    }

    fn identifier_type(&self, ident: NodeId, name: &str) -> Ty {
        if let Some(var) = self.scopes.resolve(ident) {
            if let Some(&binding) = var.identifiers.first() {
                return self.binding_type(binding);
            }
        }
        match name {
            "undefined" => Ty::Undefined,
            "NaN" | "Infinity" => Ty::Prim(Primitive::Number),
            _ if self.env.classes.contains_key(name) => Ty::ClassRef(name.to_string()),
            _ => Ty::Unknown,
        }
    }

    /// Declared type of the variable bound by a binding identifier.
    fn binding_type(&self, binding: NodeId) -> Ty {
        let tree = self.tree;
        if let Some(annotated) = self.annotation_type(binding) {
            return annotated;
        }
        let Some(parent) = tree.parent(binding) else { return Ty::Unknown };
        match tree.kind(parent) {
            NodeKind::VariableDeclarator { id, init } if *id == binding => match init {
                Some(init) => self.type_of(*init),
                None => self.for_of_element(parent).unwrap_or(Ty::Unknown),
            },
            NodeKind::FunctionDeclaration { id, .. } if *id == binding => {
                Ty::Function(Box::new(self.return_type(parent)))
            }
            NodeKind::FunctionExpression { id: Some(id), .. } if *id == binding => {
                Ty::Function(Box::new(self.return_type(parent)))
            }
            NodeKind::ClassDeclaration { id, .. } if *id == binding => {
                tree.identifier_name(binding).map(|n| Ty::ClassRef(n.to_string())).unwrap_or(Ty::Unknown)
            }
            NodeKind::Property { key, .. } => self.destructured_type(parent, *key),
            kind if kind.is_function_like() => Ty::Any,
            _ => Ty::Unknown,
        }
    }

    /// `const { key } = init` picks the member type off the initializer.
    fn destructured_type(&self, property: NodeId, key: NodeId) -> Ty {
        let tree = self.tree;
        let pattern = tree.parent(property);
        let declarator = pattern.and_then(|p| tree.parent(p));
        let (Some(declarator), Some(name)) = (declarator, tree.identifier_name(key)) else {
            return Ty::Unknown;
        };
        match tree.kind(declarator) {
            NodeKind::VariableDeclarator { init: Some(init), .. } => {
                self.member_type(&self.type_of(*init), name).unwrap_or(Ty::Unknown)
            }
            _ => Ty::Unknown,
        }
    }

    fn for_of_element(&self, declarator: NodeId) -> Option<Ty> {
        let tree = self.tree;
        let stmt = tree.parent(tree.parent(declarator)?)?;
        match tree.kind(stmt) {
            NodeKind::ForOfStatement { right, .. } => Some(self.element_type(&self.type_of(*right))),
            NodeKind::ForInStatement { .. } => Some(Ty::Prim(Primitive::String)),
            _ => None,
        }
    }

    fn annotation_type(&self, ident: NodeId) -> Option<Ty> {
        let NodeKind::Identifier { type_annotation: Some(ann), .. } = self.tree.kind(ident) else {
            return None;
        };
        match self.tree.kind(*ann) {
            NodeKind::TypeAnnotation { ty } => Some(resolve_type(ty, &HashMap::new())),
            _ => None,
        }
    }

    fn this_type(&self, node: NodeId) -> Ty {
        for ancestor in self.tree.ancestors(node) {
            if let NodeKind::ClassDeclaration { id, type_params, .. } = self.tree.kind(ancestor) {
                if let Some(name) = self.tree.identifier_name(*id) {
                    let args = type_params.iter().map(Ty::named).collect();
                    return Ty::Named { name: name.to_string(), args };
                }
            }
        }
        Ty::Unknown
    }

    /// Declared or inferred return type of a function-like node.
    pub fn return_type(&self, func: NodeId) -> Ty {
        let tree = self.tree;
        let (return_type, body, is_async) = match tree.kind(func) {
            NodeKind::FunctionDeclaration { return_type, body, is_async, .. }
            | NodeKind::MethodDefinition { return_type, body, is_async, .. } => (*return_type, *body, *is_async),
            NodeKind::ArrowFunctionExpression { return_type, body, is_async, .. }
            | NodeKind::FunctionExpression { return_type, body, is_async, .. } => {
                (*return_type, Some(*body), *is_async)
            }
            _ => return Ty::Unknown,
        };
        if let Some(ann) = return_type {
            if let NodeKind::TypeAnnotation { ty } = tree.kind(ann) {
                return resolve_type(ty, &HashMap::new());
            }
        }
        let Some(body) = body else { return Ty::Unknown };
        let inferred = match tree.kind(body) {
            NodeKind::BlockStatement { .. } => {
                let mut returns = Vec::new();
                collect_returns(tree, body, &mut returns);
                if returns.is_empty() {
                    Ty::Void
                } else {
                    Ty::union(returns.into_iter().map(|r| r.map(|arg| self.type_of(arg)).unwrap_or(Ty::Void)).collect())
                }
            }
            _ => self.type_of(body),
        };
        if is_async { Ty::Promise(Box::new(self.awaited(&inferred))) } else { inferred }
    }

    fn call_result(&self, callee: &Ty, depth: usize) -> Ty {
        if depth > MAX_DEPTH {
            return Ty::Unknown;
        }
        match self.expand(callee) {
            Ty::Function(ret) => *ret,
            Ty::Any => Ty::Any,
            Ty::Union(parts) => Ty::union(parts.iter().map(|p| self.call_result(p, depth + 1)).collect()),
            _ => Ty::Unknown,
        }
    }

    fn instantiate(&self, callee: &Ty) -> Ty {
        match callee {
            Ty::ClassRef(name) => {
                let arity = self.env.classes.get(name).map(|c| c.type_params.len()).unwrap_or(0);
                Ty::Named { name: name.clone(), args: vec![Ty::Unknown; arity] }
            }
            Ty::Any => Ty::Any,
            _ => Ty::Unknown,
        }
    }

    fn element_type(&self, ty: &Ty) -> Ty {
        match self.expand(ty) {
            Ty::Array(inner) => *inner,
            Ty::Tuple(items) => Ty::union(items),
            Ty::Any => Ty::Any,
            _ => Ty::Unknown,
        }
    }

    /// Expand type aliases at the top of `ty` until a non-alias remains.
    pub fn expand(&self, ty: &Ty) -> Ty {
        let mut current = ty.clone();
        for _ in 0..MAX_DEPTH {
            let Ty::Named { name, args } = &current else { return current };
            let Some(alias) = self.env.aliases.get(name) else { return current };
            let subst = bind_params(&alias.type_params, args);
            current = resolve_type(&alias.ty, &subst);
        }
        Ty::Unknown
    }

    /// The type `await` produces: one or more promise layers peeled.
    pub fn awaited(&self, ty: &Ty) -> Ty {
        self.awaited_at(ty, 0)
    }

    fn awaited_at(&self, ty: &Ty, depth: usize) -> Ty {
        if depth > MAX_DEPTH {
            return Ty::Unknown;
        }
        match self.expand(ty) {
            Ty::Promise(inner) => self.awaited_at(&inner, depth + 1),
            Ty::Union(parts) => Ty::union(parts.iter().map(|p| self.awaited_at(p, depth + 1)).collect()),
            other => other,
        }
    }

    /// Union members after alias expansion, flattened.
    pub fn union_parts(&self, ty: &Ty) -> Vec<Ty> {
        let mut out = Vec::new();
        self.collect_union_parts(ty, 0, &mut out);
        out
    }

    fn collect_union_parts(&self, ty: &Ty, depth: usize, out: &mut Vec<Ty>) {
        if depth > MAX_DEPTH {
            return;
        }
        match self.expand(ty) {
            Ty::Union(parts) => {
                for part in &parts {
                    self.collect_union_parts(part, depth + 1, out);
                }
            }
            Ty::Never => {}
            other => out.push(other),
        }
    }

    /// Whether `ty` declares a property or method called `name`. `any` has no declared members.
    pub fn has_member(&self, ty: &Ty, name: &str) -> bool {
        !matches!(self.expand(ty), Ty::Any | Ty::Unknown) && self.member_type(ty, name).is_some()
    }

    pub fn member_type(&self, ty: &Ty, name: &str) -> Option<Ty> {
        self.member_type_at(ty, name, 0)
    }

    fn member_type_at(&self, ty: &Ty, name: &str, depth: usize) -> Option<Ty> {
        if depth > MAX_DEPTH {
            return None;
        }
        match self.expand(ty) {
            Ty::Any => Some(Ty::Any),
            Ty::Named { name: type_name, args } => self.named_member(&type_name, &args, name, depth),
            Ty::Object(members) => members.iter().rev().find(|(n, _)| n == name).map(|(_, t)| t.clone()),
            Ty::ObjectLiteral(node) => self.object_literal_member(node, name, depth),
            Ty::Union(parts) => {
                let found: Option<Vec<Ty>> =
                    parts.iter().map(|p| self.member_type_at(p, name, depth + 1)).collect();
                found.map(Ty::union)
            }
            Ty::Intersection(parts) => parts.iter().find_map(|p| self.member_type_at(p, name, depth + 1)),
            Ty::Promise(inner) => match name {
                "then" | "catch" | "finally" => Some(Ty::Function(Box::new(Ty::Promise(inner)))),
                _ => None,
            },
            Ty::Array(inner) => array_member(&inner, name),
            Ty::Tuple(items) => array_member(&Ty::union(items), name),
            Ty::Prim(Primitive::String) => match name {
                "length" => Some(Ty::Prim(Primitive::Number)),
                _ => None,
            },
            _ => None,
        }
    }

    fn named_member(&self, type_name: &str, args: &[Ty], name: &str, depth: usize) -> Option<Ty> {
        if let Some(iface) = self.env.interfaces.get(type_name) {
            let subst = bind_params(&iface.type_params, args);
            if let Some(sig) = self.env.interface_member(type_name, name) {
                return match sig {
                    MemberSig::Property(t) => Some(resolve_type(t, &subst)),
                    MemberSig::Method { ret } => Some(Ty::Function(Box::new(resolve_type(ret, &subst)))),
                    MemberSig::Constructor => None,
                };
            }
            for base in &iface.extends {
                if let Some(found) = self.member_type_at(&resolve_type(base, &subst), name, depth + 1) {
                    return Some(found);
                }
            }
        }
        if let Some(class) = self.env.classes.get(type_name) {
            let subst = bind_params(&class.type_params, args);
            if let Some(member) = self.env.class_member(type_name, name) {
                let ty = match member.kind {
                    ClassMemberKind::Method => Ty::Function(Box::new(self.return_type(member.node))),
                    ClassMemberKind::Property => self.property_type(member.node),
                    ClassMemberKind::Constructor => return None,
                };
                return Some(ty.substitute(&subst));
            }
            for base in &class.heritage {
                if let Some(found) = self.member_type_at(&resolve_type(base, &subst), name, depth + 1) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn property_type(&self, node: NodeId) -> Ty {
        let NodeKind::PropertyDefinition { type_annotation, value, .. } = self.tree.kind(node) else {
            return Ty::Unknown;
        };
        if let Some(ann) = type_annotation {
            if let NodeKind::TypeAnnotation { ty } = self.tree.kind(*ann) {
                return resolve_type(ty, &HashMap::new());
            }
        }
        value.map(|v| self.type_of(v)).unwrap_or(Ty::Unknown)
    }

    fn object_literal_member(&self, node: NodeId, name: &str, depth: usize) -> Option<Ty> {
        let tree = self.tree;
        let NodeKind::ObjectExpression { properties } = tree.kind(node) else { return None };
        for &prop in properties.iter().rev() {
            match tree.kind(prop) {
                NodeKind::Property { key, value, .. } if tree.identifier_name(*key) == Some(name) => {
                    return Some(self.type_of(*value));
                }
                NodeKind::SpreadElement { argument } => {
                    if let Some(found) = self.member_type_at(&self.type_of(*argument), name, depth + 1) {
                        return Some(found);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn bind_params(params: &[String], args: &[Ty]) -> HashMap<String, Ty> {
    params
        .iter()
        .enumerate()
        .map(|(i, p)| (p.clone(), args.get(i).cloned().unwrap_or(Ty::Unknown)))
        .collect()
}

fn strip_nullish(ty: Ty) -> Ty {
    match ty {
        Ty::Union(parts) => Ty::union(parts.into_iter().filter(|p| !p.is_nullish()).collect()),
        other => other,
    }
}

fn array_member(element: &Ty, name: &str) -> Option<Ty> {
    let ty = match name {
        "length" => Ty::Prim(Primitive::Number),
        "map" | "filter" | "slice" | "concat" => Ty::Function(Box::new(Ty::Array(Box::new(Ty::Unknown)))),
        "find" | "pop" | "shift" | "at" => Ty::Function(Box::new(Ty::union(vec![element.clone(), Ty::Undefined]))),
        "forEach" => Ty::Function(Box::new(Ty::Void)),
        "push" | "indexOf" => Ty::Function(Box::new(Ty::Prim(Primitive::Number))),
        "some" | "every" | "includes" => Ty::Function(Box::new(Ty::Prim(Primitive::Boolean))),
        _ => return None,
    };
    Some(ty)
}

/// `return` statements of a function body, not descending into nested functions.
fn collect_returns(tree: &SyntaxTree, node: NodeId, out: &mut Vec<Option<NodeId>>) {
    for child in tree.children(node) {
        let kind = tree.kind(child);
        if kind.is_function_like() || matches!(kind, NodeKind::ClassDeclaration { .. }) {
            continue;
        }
        if let NodeKind::ReturnStatement { argument } = kind {
            out.push(*argument);
        }
        collect_returns(tree, child, out);
    }
}
