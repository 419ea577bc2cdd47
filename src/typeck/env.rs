use std::collections::HashMap;

use crate::parser::ast::{MemberSig, NodeId, NodeKind, SyntaxTree, TypeExpr, TypeMember};
use crate::visit::{Visitor, walk_node, walk_tree};

#[derive(Debug, Clone, Default)]
pub struct InterfaceInfo {
    pub type_params: Vec<String>,
    pub extends: Vec<TypeExpr>,
    pub members: Vec<TypeMember>,
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub node: NodeId,
    pub type_params: Vec<String>,
    pub heritage: Vec<TypeExpr>,
    pub members: Vec<ClassMember>,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub name: String,
    pub node: NodeId,
    pub is_static: bool,
    pub kind: ClassMemberKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMemberKind {
    Method,
    Property,
    Constructor,
}

#[derive(Debug, Clone)]
pub struct AliasInfo {
    pub type_params: Vec<String>,
    pub ty: TypeExpr,
}

/// Named types declared anywhere in the analyzed unit.
#[derive(Debug, Clone, Default)]
pub struct TypeEnv {
    pub interfaces: HashMap<String, InterfaceInfo>,
    pub classes: HashMap<String, ClassInfo>,
    pub aliases: HashMap<String, AliasInfo>,
}

impl TypeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every interface, class and type alias of the tree. Interface
    /// declarations with the same name merge, as they do in the source language.
    pub fn collect(tree: &SyntaxTree) -> Self {
        let mut registrar = Registrar { env: TypeEnv::new() };
        walk_tree(&mut registrar, tree);
        registrar.env
    }

    /// Members declared directly on an interface (no inherited ones).
    pub fn interface_member(&self, interface: &str, name: &str) -> Option<&MemberSig> {
        self.interfaces
            .get(interface)?
            .members
            .iter()
            .rev()
            .find(|m| m.name == name)
            .map(|m| &m.sig)
    }

    /// Instance member declared directly on a class.
    pub fn class_member(&self, class: &str, name: &str) -> Option<&ClassMember> {
        self.classes
            .get(class)?
            .members
            .iter()
            .find(|m| m.name == name && !m.is_static && m.kind != ClassMemberKind::Constructor)
    }
}

struct Registrar {
    env: TypeEnv,
}

impl Visitor for Registrar {
    fn visit_node(&mut self, tree: &SyntaxTree, id: NodeId) {
        match tree.kind(id) {
            NodeKind::InterfaceDeclaration { id: name_id, type_params, extends, members } => {
                if let Some(name) = tree.identifier_name(*name_id) {
                    let info = self.env.interfaces.entry(name.to_string()).or_default();
                    if info.type_params.is_empty() {
                        info.type_params = type_params.clone();
                    }
                    info.extends.extend(extends.iter().cloned());
                    info.members.extend(members.iter().cloned());
                }
            }
            NodeKind::TypeAliasDeclaration { id: name_id, type_params, annotation } => {
                if let (Some(name), NodeKind::TypeAnnotation { ty }) =
                    (tree.identifier_name(*name_id), tree.kind(*annotation))
                {
                    self.env
                        .aliases
                        .insert(name.to_string(), AliasInfo { type_params: type_params.clone(), ty: ty.clone() });
                }
            }
            NodeKind::ClassDeclaration { id: name_id, type_params, heritage, body, .. } => {
                if let Some(name) = tree.identifier_name(*name_id) {
                    let members = body.iter().filter_map(|&m| class_member(tree, m)).collect();
                    self.env.classes.insert(
                        name.to_string(),
                        ClassInfo { node: id, type_params: type_params.clone(), heritage: heritage.clone(), members },
                    );
                }
            }
            _ => {}
        }
        walk_node(self, tree, id);
    }
}

fn class_member(tree: &SyntaxTree, node: NodeId) -> Option<ClassMember> {
    let (key, is_static, kind) = match tree.kind(node) {
        NodeKind::MethodDefinition { key, is_static, .. } => {
            let kind = if tree.identifier_name(*key) == Some("constructor") {
                ClassMemberKind::Constructor
            } else {
                ClassMemberKind::Method
            };
            (*key, *is_static, kind)
        }
        NodeKind::PropertyDefinition { key, is_static, .. } => (*key, *is_static, ClassMemberKind::Property),
        _ => return None,
    };
    let name = tree.identifier_name(key)?.to_string();
    Some(ClassMember { name, node, is_static, kind })
}
