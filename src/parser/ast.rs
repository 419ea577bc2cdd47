//! Arena-backed, parent-linked syntax tree.
//!
//! Every node lives in a single `Vec<Node>` owned by [`SyntaxTree`] and is addressed by a
//! [`NodeId`]. Children are stored as ids inside [`NodeKind`]; parent links are derived
//! once when the tree is finished and never change afterwards. Type-level syntax
//! (annotations, aliases, interfaces) is kept as plain [`TypeExpr`] values hanging off
//! type-level nodes, since nothing walks into it node by node.

use crate::span::Span;

/// Handle of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    StrictEq,
    StrictNeq,
    Lt,
    Gt,
    LtEq,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

/// Type syntax as written in annotations and declarations.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// `Foo`, `Result<T, E>`, `ns.Foo`
    Named { name: String, args: Vec<TypeExpr> },
    Union(Vec<TypeExpr>),
    Intersection(Vec<TypeExpr>),
    /// `(a: A) => R`; only the return type matters to the checker
    Function { ret: Box<TypeExpr> },
    /// `{ a: A; m(): R }`
    Object(Vec<TypeMember>),
    Array(Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    /// String/number/boolean literal types
    Literal(String),
    /// Syntax the checker does not model (conditional types, `infer`, `typeof`, ...)
    Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMember {
    pub name: String,
    pub sig: MemberSig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberSig {
    Property(TypeExpr),
    Method { ret: TypeExpr },
    /// `constructor(...)` inside an interface or declared class
    Constructor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Statements
    Program { body: Vec<NodeId> },
    BlockStatement { body: Vec<NodeId> },
    ExpressionStatement { expression: NodeId },
    EmptyStatement,
    VariableDeclaration { kind: DeclKind, declarations: Vec<NodeId>, declare: bool },
    VariableDeclarator { id: NodeId, init: Option<NodeId> },
    FunctionDeclaration {
        id: NodeId,
        params: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: Option<NodeId>,
        is_async: bool,
    },
    ClassDeclaration {
        id: NodeId,
        type_params: Vec<String>,
        heritage: Vec<TypeExpr>,
        body: Vec<NodeId>,
        declare: bool,
    },
    MethodDefinition {
        key: NodeId,
        params: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: Option<NodeId>,
        is_async: bool,
        is_static: bool,
    },
    PropertyDefinition {
        key: NodeId,
        type_annotation: Option<NodeId>,
        value: Option<NodeId>,
        is_static: bool,
    },
    ReturnStatement { argument: Option<NodeId> },
    IfStatement { test: NodeId, consequent: NodeId, alternate: Option<NodeId> },
    WhileStatement { test: NodeId, body: NodeId },
    DoWhileStatement { body: NodeId, test: NodeId },
    ForStatement { init: Option<NodeId>, test: Option<NodeId>, update: Option<NodeId>, body: NodeId },
    ForOfStatement { left: NodeId, right: NodeId, body: NodeId },
    ForInStatement { left: NodeId, right: NodeId, body: NodeId },
    SwitchStatement { discriminant: NodeId, cases: Vec<NodeId> },
    /// `case test:` or `default:` (no test) and the statements under it
    SwitchCase { test: Option<NodeId>, consequent: Vec<NodeId> },
    LabeledStatement { label: String, body: NodeId },
    BreakStatement { label: Option<String> },
    ContinueStatement { label: Option<String> },
    TryStatement { block: NodeId, handler: Option<NodeId>, finalizer: Option<NodeId> },
    CatchClause { param: Option<NodeId>, body: NodeId },
    ThrowStatement { argument: NodeId },
    TypeAliasDeclaration { id: NodeId, type_params: Vec<String>, annotation: NodeId },
    InterfaceDeclaration {
        id: NodeId,
        type_params: Vec<String>,
        extends: Vec<TypeExpr>,
        members: Vec<TypeMember>,
    },

    // Expressions
    Identifier { name: String, type_annotation: Option<NodeId> },
    Literal { value: LiteralValue },
    ThisExpression,
    CallExpression { callee: NodeId, arguments: Vec<NodeId> },
    NewExpression { callee: NodeId, arguments: Vec<NodeId> },
    AwaitExpression { argument: NodeId },
    /// `optional` marks `a?.b` and `a?.[b]`
    MemberExpression { object: NodeId, property: NodeId, computed: bool, optional: bool },
    ArrowFunctionExpression {
        params: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: NodeId,
        is_async: bool,
    },
    FunctionExpression {
        id: Option<NodeId>,
        params: Vec<NodeId>,
        return_type: Option<NodeId>,
        body: NodeId,
        is_async: bool,
    },
    AssignmentExpression { operator: AssignOp, left: NodeId, right: NodeId },
    BinaryExpression { operator: BinaryOp, left: NodeId, right: NodeId },
    LogicalExpression { operator: LogicalOp, left: NodeId, right: NodeId },
    UnaryExpression { operator: UnaryOp, argument: NodeId },
    /// `++x`, `x--`
    UpdateExpression { argument: NodeId, increment: bool, prefix: bool },
    ConditionalExpression { test: NodeId, consequent: NodeId, alternate: NodeId },
    ObjectExpression { properties: Vec<NodeId> },
    Property { key: NodeId, value: NodeId, shorthand: bool },
    /// Holes (`[a, , b]`) are elided, here and in `ArrayPattern`.
    ArrayExpression { elements: Vec<NodeId> },
    SpreadElement { argument: NodeId },
    RestElement { argument: NodeId },
    ObjectPattern { properties: Vec<NodeId> },
    ArrayPattern { elements: Vec<NodeId> },

    // Type-level
    AsExpression { expression: NodeId, annotation: NodeId },
    SatisfiesExpression { expression: NodeId, annotation: NodeId },
    NonNullExpression { expression: NodeId },
    TypeAnnotation { ty: TypeExpr },
}

impl NodeKind {
    /// ESTree-style kind name, used in logs and debug dumps.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::EmptyStatement => "EmptyStatement",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::ClassDeclaration { .. } => "ClassDeclaration",
            NodeKind::MethodDefinition { .. } => "MethodDefinition",
            NodeKind::PropertyDefinition { .. } => "PropertyDefinition",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForOfStatement { .. } => "ForOfStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::BreakStatement { .. } => "BreakStatement",
            NodeKind::ContinueStatement { .. } => "ContinueStatement",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::ThrowStatement { .. } => "ThrowStatement",
            NodeKind::TypeAliasDeclaration { .. } => "TSTypeAliasDeclaration",
            NodeKind::InterfaceDeclaration { .. } => "TSInterfaceDeclaration",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::AwaitExpression { .. } => "AwaitExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::ArrowFunctionExpression { .. } => "ArrowFunctionExpression",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::BinaryExpression { .. } => "BinaryExpression",
            NodeKind::LogicalExpression { .. } => "LogicalExpression",
            NodeKind::UnaryExpression { .. } => "UnaryExpression",
            NodeKind::UpdateExpression { .. } => "UpdateExpression",
            NodeKind::ConditionalExpression { .. } => "ConditionalExpression",
            NodeKind::ObjectExpression { .. } => "ObjectExpression",
            NodeKind::Property { .. } => "Property",
            NodeKind::ArrayExpression { .. } => "ArrayExpression",
            NodeKind::SpreadElement { .. } => "SpreadElement",
            NodeKind::RestElement { .. } => "RestElement",
            NodeKind::ObjectPattern { .. } => "ObjectPattern",
            NodeKind::ArrayPattern { .. } => "ArrayPattern",
            NodeKind::AsExpression { .. } => "TSAsExpression",
            NodeKind::SatisfiesExpression { .. } => "TSSatisfiesExpression",
            NodeKind::NonNullExpression { .. } => "TSNonNullExpression",
            NodeKind::TypeAnnotation { .. } => "TSTypeAnnotation",
        }
    }

    /// Nodes that only exist for the type system.
    pub fn is_type_level(&self) -> bool {
        matches!(
            self,
            NodeKind::AsExpression { .. }
                | NodeKind::SatisfiesExpression { .. }
                | NodeKind::NonNullExpression { .. }
                | NodeKind::TypeAnnotation { .. }
                | NodeKind::TypeAliasDeclaration { .. }
                | NodeKind::InterfaceDeclaration { .. }
        )
    }

    /// Declarative positions where a value is not "used" by statements.
    pub fn is_declaration_boundary(&self) -> bool {
        matches!(
            self,
            NodeKind::ClassDeclaration { .. }
                | NodeKind::FunctionDeclaration { .. }
                | NodeKind::MethodDefinition { .. }
                | NodeKind::PropertyDefinition { .. }
        )
    }

    /// Nodes holding a statement list.
    pub fn is_block_boundary(&self) -> bool {
        matches!(self, NodeKind::BlockStatement { .. } | NodeKind::Program { .. } | NodeKind::SwitchCase { .. })
    }

    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration { .. }
                | NodeKind::FunctionExpression { .. }
                | NodeKind::ArrowFunctionExpression { .. }
                | NodeKind::MethodDefinition { .. }
        )
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        fn opt(out: &mut Vec<NodeId>, id: &Option<NodeId>) {
            if let Some(id) = id {
                out.push(*id);
            }
        }

        let mut out = Vec::new();
        match self {
            NodeKind::Program { body } | NodeKind::BlockStatement { body } => out.extend(body),
            NodeKind::ExpressionStatement { expression } => out.push(*expression),
            NodeKind::EmptyStatement | NodeKind::ThisExpression | NodeKind::Literal { .. } => {}
            NodeKind::BreakStatement { .. } | NodeKind::ContinueStatement { .. } => {}
            NodeKind::TypeAnnotation { .. } => {}
            NodeKind::VariableDeclaration { declarations, .. } => out.extend(declarations),
            NodeKind::VariableDeclarator { id, init } => {
                out.push(*id);
                opt(&mut out, init);
            }
            NodeKind::FunctionDeclaration { id, params, return_type, body, .. } => {
                out.push(*id);
                out.extend(params);
                opt(&mut out, return_type);
                opt(&mut out, body);
            }
            NodeKind::ClassDeclaration { id, body, .. } => {
                out.push(*id);
                out.extend(body);
            }
            NodeKind::MethodDefinition { key, params, return_type, body, .. } => {
                out.push(*key);
                out.extend(params);
                opt(&mut out, return_type);
                opt(&mut out, body);
            }
            NodeKind::PropertyDefinition { key, type_annotation, value, .. } => {
                out.push(*key);
                opt(&mut out, type_annotation);
                opt(&mut out, value);
            }
            NodeKind::ReturnStatement { argument } => opt(&mut out, argument),
            NodeKind::IfStatement { test, consequent, alternate } => {
                out.push(*test);
                out.push(*consequent);
                opt(&mut out, alternate);
            }
            NodeKind::WhileStatement { test, body } => {
                out.push(*test);
                out.push(*body);
            }
            NodeKind::DoWhileStatement { body, test } => {
                out.push(*body);
                out.push(*test);
            }
            NodeKind::ForStatement { init, test, update, body } => {
                opt(&mut out, init);
                opt(&mut out, test);
                opt(&mut out, update);
                out.push(*body);
            }
            NodeKind::ForOfStatement { left, right, body } | NodeKind::ForInStatement { left, right, body } => {
                out.push(*left);
                out.push(*right);
                out.push(*body);
            }
            NodeKind::SwitchStatement { discriminant, cases } => {
                out.push(*discriminant);
                out.extend(cases);
            }
            NodeKind::SwitchCase { test, consequent } => {
                opt(&mut out, test);
                out.extend(consequent);
            }
            NodeKind::LabeledStatement { body, .. } => out.push(*body),
            NodeKind::TryStatement { block, handler, finalizer } => {
                out.push(*block);
                opt(&mut out, handler);
                opt(&mut out, finalizer);
            }
            NodeKind::CatchClause { param, body } => {
                opt(&mut out, param);
                out.push(*body);
            }
            NodeKind::ThrowStatement { argument } => out.push(*argument),
            NodeKind::TypeAliasDeclaration { id, annotation, .. } => {
                out.push(*id);
                out.push(*annotation);
            }
            NodeKind::InterfaceDeclaration { id, .. } => out.push(*id),
            NodeKind::Identifier { type_annotation, .. } => opt(&mut out, type_annotation),
            NodeKind::CallExpression { callee, arguments }
            | NodeKind::NewExpression { callee, arguments } => {
                out.push(*callee);
                out.extend(arguments);
            }
            NodeKind::AwaitExpression { argument }
            | NodeKind::UnaryExpression { argument, .. }
            | NodeKind::UpdateExpression { argument, .. }
            | NodeKind::SpreadElement { argument }
            | NodeKind::RestElement { argument } => out.push(*argument),
            NodeKind::MemberExpression { object, property, .. } => {
                out.push(*object);
                out.push(*property);
            }
            NodeKind::ArrowFunctionExpression { params, return_type, body, .. } => {
                out.extend(params);
                opt(&mut out, return_type);
                out.push(*body);
            }
            NodeKind::FunctionExpression { id, params, return_type, body, .. } => {
                opt(&mut out, id);
                out.extend(params);
                opt(&mut out, return_type);
                out.push(*body);
            }
            NodeKind::AssignmentExpression { left, right, .. }
            | NodeKind::BinaryExpression { left, right, .. }
            | NodeKind::LogicalExpression { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::ConditionalExpression { test, consequent, alternate } => {
                out.push(*test);
                out.push(*consequent);
                out.push(*alternate);
            }
            NodeKind::ObjectExpression { properties } | NodeKind::ObjectPattern { properties } => {
                out.extend(properties)
            }
            NodeKind::Property { key, value, shorthand } => {
                if !shorthand {
                    out.push(*key);
                }
                out.push(*value);
            }
            NodeKind::ArrayExpression { elements } | NodeKind::ArrayPattern { elements } => {
                out.extend(elements)
            }
            NodeKind::AsExpression { expression, annotation }
            | NodeKind::SatisfiesExpression { expression, annotation } => {
                out.push(*expression);
                out.push(*annotation);
            }
            NodeKind::NonNullExpression { expression } => out.push(*expression),
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
}

/// Immutable syntax tree. Built once by the parser, then only read.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Strict ancestors, innermost first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { tree: self, next: self.parent(id) }
    }

    pub fn identifier_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Property name of a non-computed member access.
    pub fn member_name(&self, member: NodeId) -> Option<&str> {
        match self.kind(member) {
            NodeKind::MemberExpression { property, computed: false, .. } => self.identifier_name(*property),
            _ => None,
        }
    }

    /// True if `node` is `ancestor` or lies inside it.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }
}

pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Allocates nodes during parsing. Parent links are filled in by [`TreeBuilder::finish`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span, parent: None });
        id
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn replace(&mut self, id: NodeId, kind: NodeKind, span: Span) {
        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.span = span;
    }

    /// Number of allocated nodes; pair with [`TreeBuilder::truncate`] to backtrack.
    pub fn mark(&self) -> usize {
        self.nodes.len()
    }

    pub fn truncate(&mut self, mark: usize) {
        self.nodes.truncate(mark);
    }

    pub fn finish(mut self, root: NodeId) -> SyntaxTree {
        for index in 0..self.nodes.len() {
            for child in self.nodes[index].kind.children() {
                self.nodes[child.index()].parent = Some(NodeId(index as u32));
            }
        }
        SyntaxTree { nodes: self.nodes, root }
    }
}
