//! Static scope analysis: lexical scopes, declared variables and their references.
//!
//! Two passes over the tree. The first creates scopes and declares every binding
//! (so hoisted functions and `var`s are visible before their declaration). The second
//! resolves each identifier in reference position to the innermost visible variable.
//! A variable's `references` come out in source order; for an initialised declaration
//! the first reference is the write performed by the declaring identifier itself.

use std::collections::HashMap;

use crate::parser::ast::{AssignOp, DeclKind, NodeId, NodeKind, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Function,
    Block,
    /// `for`, `for-of` and `for-in` heads
    Loop,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub node: NodeId,
    pub parent: Option<ScopeId>,
    names: HashMap<String, VariableId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceFlag {
    Read,
    Write,
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub identifier: NodeId,
    pub flag: ReferenceFlag,
    /// Write performed by an initialised declaration (`const x = ...`).
    pub init: bool,
}

impl Reference {
    pub fn is_write(&self) -> bool {
        matches!(self.flag, ReferenceFlag::Write | ReferenceFlag::ReadWrite)
    }

    pub fn is_read(&self) -> bool {
        matches!(self.flag, ReferenceFlag::Read | ReferenceFlag::ReadWrite)
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub scope: ScopeId,
    /// Binding identifiers that declare this variable.
    pub identifiers: Vec<NodeId>,
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeAnalysis {
    scopes: Vec<Scope>,
    variables: Vec<Variable>,
    scope_of_node: HashMap<NodeId, ScopeId>,
    /// Declaring node (declarator, function, class, parameter owner) to the variables it declares.
    declared: HashMap<NodeId, Vec<VariableId>>,
    resolved: HashMap<NodeId, VariableId>,
    unresolved: Vec<NodeId>,
}

impl ScopeAnalysis {
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0 as usize]
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    /// Scope created by `node`, if it creates one.
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.scope_of_node.get(&node).copied()
    }

    /// Variables introduced by a declaring node, such as a `VariableDeclarator`.
    pub fn declared_variables(&self, node: NodeId) -> Vec<&Variable> {
        self.declared
            .get(&node)
            .map(|ids| ids.iter().map(|&id| self.variable(id)).collect())
            .unwrap_or_default()
    }

    /// The variable an identifier refers to or declares.
    pub fn resolve(&self, identifier: NodeId) -> Option<&Variable> {
        self.resolved.get(&identifier).map(|&id| self.variable(id))
    }

    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Variable> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(&var) = scope.names.get(name) {
                return Some(self.variable(var));
            }
            current = scope.parent;
        }
        None
    }

    /// Identifiers in reference position that matched no declaration (globals).
    pub fn unresolved(&self) -> &[NodeId] {
        &self.unresolved
    }
}

pub fn analyze(tree: &SyntaxTree) -> ScopeAnalysis {
    let mut analyzer = Analyzer { tree, out: ScopeAnalysis::default(), binding_ids: HashMap::new() };
    let root = tree.root();
    let program = analyzer.push_scope(ScopeKind::Program, root, None);
    analyzer.declare_in(root, program);
    analyzer.resolve_in(root, program);
    analyzer.out
}

struct Analyzer<'t> {
    tree: &'t SyntaxTree,
    out: ScopeAnalysis,
    /// Binding identifier to the variable it declares.
    binding_ids: HashMap<NodeId, VariableId>,
}

impl<'t> Analyzer<'t> {
    fn push_scope(&mut self, kind: ScopeKind, node: NodeId, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.out.scopes.len() as u32);
        self.out.scopes.push(Scope { kind, node, parent, names: HashMap::new() });
        self.out.scope_of_node.insert(node, id);
        id
    }

    fn nearest_function_scope(&self, mut scope: ScopeId) -> ScopeId {
        loop {
            let s = self.out.scope(scope);
            match (s.kind, s.parent) {
                (ScopeKind::Program | ScopeKind::Function, _) | (_, None) => return scope,
                (_, Some(parent)) => scope = parent,
            }
        }
    }

    fn declare(&mut self, scope: ScopeId, owner: NodeId, ident: NodeId) {
        let Some(name) = self.tree.identifier_name(ident) else { return };
        let var = match self.out.scope(scope).names.get(name) {
            Some(&existing) => existing,
            None => {
                let id = VariableId(self.out.variables.len() as u32);
                self.out.variables.push(Variable {
                    name: name.to_string(),
                    scope,
                    identifiers: Vec::new(),
                    references: Vec::new(),
                });
                self.out.scopes[scope.0 as usize].names.insert(name.to_string(), id);
                id
            }
        };
        self.out.variables[var.0 as usize].identifiers.push(ident);
        self.out.declared.entry(owner).or_default().push(var);
        self.binding_ids.insert(ident, var);
        self.out.resolved.insert(ident, var);
    }

    fn declare_pattern(&mut self, scope: ScopeId, owner: NodeId, pattern: NodeId) {
        for ident in binding_identifiers(self.tree, pattern) {
            self.declare(scope, owner, ident);
        }
    }

    /// Scope a child node's contents live in: functions and blocks open their own.
    fn child_scope(&mut self, node: NodeId, scope: ScopeId) -> ScopeId {
        let tree = self.tree;
        match tree.kind(node) {
            kind if kind.is_function_like() => self.push_scope(ScopeKind::Function, node, Some(scope)),
            NodeKind::ForStatement { .. } | NodeKind::ForOfStatement { .. } | NodeKind::ForInStatement { .. } => {
                self.push_scope(ScopeKind::Loop, node, Some(scope))
            }
            NodeKind::SwitchStatement { .. } | NodeKind::CatchClause { .. } => {
                self.push_scope(ScopeKind::Block, node, Some(scope))
            }
            NodeKind::BlockStatement { .. } => {
                // a function body shares the function's scope
                let parent_is_function = tree.parent(node).is_some_and(|p| tree.kind(p).is_function_like());
                if parent_is_function {
                    scope
                } else {
                    self.push_scope(ScopeKind::Block, node, Some(scope))
                }
            }
            _ => scope,
        }
    }

    fn declare_in(&mut self, node: NodeId, scope: ScopeId) {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::VariableDeclaration { kind, declarations, .. } => {
                let target = if *kind == DeclKind::Var { self.nearest_function_scope(scope) } else { scope };
                for &decl in declarations {
                    if let NodeKind::VariableDeclarator { id, .. } = tree.kind(decl) {
                        self.declare_pattern(target, decl, *id);
                    }
                }
            }
            NodeKind::FunctionDeclaration { id, .. } | NodeKind::ClassDeclaration { id, .. } => {
                self.declare(scope, node, *id);
            }
            _ => {}
        }

        let inner = self.child_scope(node, scope);
        if inner != scope {
            match tree.kind(node) {
                NodeKind::FunctionExpression { id: Some(id), .. } => self.declare(inner, node, *id),
                NodeKind::CatchClause { param: Some(param), .. } => self.declare_pattern(inner, node, *param),
                _ => {}
            }
            if let Some(params) = function_params(tree.kind(node)) {
                for &param in params {
                    self.declare_pattern(inner, node, param);
                }
            }
        }
        for child in tree.children(node) {
            self.declare_in(child, inner);
        }
    }

    fn resolve_in(&mut self, node: NodeId, scope: ScopeId) {
        let tree = self.tree;
        let inner = self.out.scope_of(node).unwrap_or(scope);
        match tree.kind(node) {
            NodeKind::Identifier { .. } => {
                self.resolve_identifier(node, inner);
                return;
            }
            NodeKind::VariableDeclarator { id, init } => {
                // the declared identifiers are written only when initialised,
                // or when the declarator is the left side of a for-of or for-in loop
                let written = init.is_some() || self.is_for_of_binding(node);
                if written {
                    for ident in binding_identifiers(tree, *id) {
                        self.add_binding_write(ident);
                    }
                }
                if let Some(init) = init {
                    self.resolve_in(*init, inner);
                }
                return;
            }
            NodeKind::UpdateExpression { argument, .. } if matches!(tree.kind(*argument), NodeKind::Identifier { .. }) => {
                self.add_reference(*argument, inner, ReferenceFlag::ReadWrite);
                return;
            }
            NodeKind::AssignmentExpression { operator, left, right } => {
                let flag = if *operator == AssignOp::Assign { ReferenceFlag::Write } else { ReferenceFlag::ReadWrite };
                match tree.kind(*left) {
                    NodeKind::Identifier { .. } => self.add_reference(*left, inner, flag),
                    NodeKind::ObjectPattern { .. } | NodeKind::ArrayPattern { .. } => {
                        for ident in binding_identifiers(tree, *left) {
                            self.add_reference(ident, inner, ReferenceFlag::Write);
                        }
                    }
                    _ => self.resolve_in(*left, inner),
                }
                self.resolve_in(*right, inner);
                return;
            }
            _ => {}
        }
        for child in tree.children(node) {
            if self.is_binding_position(node, child) {
                continue;
            }
            self.resolve_in(child, inner);
        }
    }

    fn is_for_of_binding(&self, declarator: NodeId) -> bool {
        let tree = self.tree;
        let Some(decl) = tree.parent(declarator) else { return false };
        tree.parent(decl).is_some_and(|stmt| match tree.kind(stmt) {
            NodeKind::ForOfStatement { left, .. } | NodeKind::ForInStatement { left, .. } => *left == decl,
            _ => false,
        })
    }

    /// Children of `parent` that name things rather than refer to them.
    fn is_binding_position(&self, parent: NodeId, child: NodeId) -> bool {
        match self.tree.kind(parent) {
            NodeKind::MemberExpression { property, computed: false, .. } => *property == child,
            NodeKind::Property { key, shorthand: false, .. } => *key == child,
            NodeKind::MethodDefinition { key, params, .. } => *key == child || params.contains(&child),
            NodeKind::PropertyDefinition { key, .. } => *key == child,
            NodeKind::FunctionDeclaration { id, params, .. } => *id == child || params.contains(&child),
            NodeKind::FunctionExpression { id, params, .. } => *id == Some(child) || params.contains(&child),
            NodeKind::ArrowFunctionExpression { params, .. } => params.contains(&child),
            NodeKind::CatchClause { param, .. } => *param == Some(child),
            NodeKind::ClassDeclaration { id, .. }
            | NodeKind::TypeAliasDeclaration { id, .. }
            | NodeKind::InterfaceDeclaration { id, .. } => *id == child,
            _ => false,
        }
    }

    fn add_binding_write(&mut self, ident: NodeId) {
        if let Some(&var) = self.binding_ids.get(&ident) {
            self.out.variables[var.0 as usize].references.push(Reference {
                identifier: ident,
                flag: ReferenceFlag::Write,
                init: true,
            });
        }
    }

    fn resolve_identifier(&mut self, ident: NodeId, scope: ScopeId) {
        if self.binding_ids.contains_key(&ident) {
            return;
        }
        self.add_reference(ident, scope, ReferenceFlag::Read);
    }

    fn add_reference(&mut self, ident: NodeId, scope: ScopeId, flag: ReferenceFlag) {
        let Some(name) = self.tree.identifier_name(ident) else { return };
        let found = {
            let mut current = Some(scope);
            let mut found = None;
            while let Some(id) = current {
                let s = self.out.scope(id);
                if let Some(&var) = s.names.get(name) {
                    found = Some(var);
                    break;
                }
                current = s.parent;
            }
            found
        };
        match found {
            Some(var) => {
                self.out.variables[var.0 as usize].references.push(Reference { identifier: ident, flag, init: false });
                self.out.resolved.insert(ident, var);
            }
            None => self.out.unresolved.push(ident),
        }
    }
}

fn function_params(kind: &NodeKind) -> Option<&[NodeId]> {
    match kind {
        NodeKind::FunctionDeclaration { params, .. }
        | NodeKind::FunctionExpression { params, .. }
        | NodeKind::ArrowFunctionExpression { params, .. }
        | NodeKind::MethodDefinition { params, .. } => Some(params),
        _ => None,
    }
}

/// Identifiers bound by a binding pattern, in source order.
pub fn binding_identifiers(tree: &SyntaxTree, pattern: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect_bindings(tree, pattern, &mut out);
    out
}

fn collect_bindings(tree: &SyntaxTree, node: NodeId, out: &mut Vec<NodeId>) {
    match tree.kind(node) {
        NodeKind::Identifier { .. } => out.push(node),
        NodeKind::ObjectPattern { properties } => {
            for &prop in properties {
                match tree.kind(prop) {
                    NodeKind::Property { value, .. } => collect_bindings(tree, *value, out),
                    NodeKind::RestElement { argument } => collect_bindings(tree, *argument, out),
                    _ => {}
                }
            }
        }
        NodeKind::ArrayPattern { elements } => {
            for &el in elements {
                collect_bindings(tree, el, out);
            }
        }
        NodeKind::RestElement { argument } => collect_bindings(tree, *argument, out),
        _ => {}
    }
}
