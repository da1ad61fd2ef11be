//! Declaration traversal shared by the generators.
//!
//! Visits every type and enum declaration of a syntax tree together with
//! the chain of declarations enclosing it, outermost first. Method bodies
//! are never parsed, so local types are out of reach by construction.

use parser::{
    EnumDeclaration, MemberDeclaration, NamespaceDeclaration, SyntaxTree, TypeDeclaration,
};

/// A declaration enclosing the one being visited
#[derive(Debug, Clone, Copy)]
pub enum Ancestor<'t> {
    Namespace(&'t NamespaceDeclaration),
    Type(&'t TypeDeclaration),
}

impl<'t> Ancestor<'t> {
    pub fn as_type(&self) -> Option<&'t TypeDeclaration> {
        match self {
            Ancestor::Type(ty) => Some(ty),
            Ancestor::Namespace(_) => None,
        }
    }
}

/// Dotted namespace the innermost declaration lives in, if any
pub fn namespace_of(ancestors: &[Ancestor<'_>]) -> Option<String> {
    let names: Vec<String> = ancestors
        .iter()
        .filter_map(|ancestor| match ancestor {
            Ancestor::Namespace(ns) => Some(ns.name.to_string()),
            Ancestor::Type(_) => None,
        })
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join("."))
    }
}

/// Enclosing type declarations, outermost first
pub fn enclosing_types<'t>(ancestors: &[Ancestor<'t>]) -> Vec<&'t TypeDeclaration> {
    ancestors.iter().filter_map(Ancestor::as_type).collect()
}

pub trait DeclarationVisitor<'t> {
    fn visit_type(
        &mut self,
        _tree: &'t SyntaxTree,
        _ancestors: &[Ancestor<'t>],
        _declaration: &'t TypeDeclaration,
    ) {
    }

    fn visit_enum(
        &mut self,
        _tree: &'t SyntaxTree,
        _ancestors: &[Ancestor<'t>],
        _declaration: &'t EnumDeclaration,
    ) {
    }
}

pub fn walk_tree<'t, V: DeclarationVisitor<'t>>(tree: &'t SyntaxTree, visitor: &mut V) {
    let mut ancestors = Vec::new();
    walk_members(tree, &tree.root.members, &mut ancestors, visitor);
}

fn walk_members<'t, V: DeclarationVisitor<'t>>(
    tree: &'t SyntaxTree,
    members: &'t [MemberDeclaration],
    ancestors: &mut Vec<Ancestor<'t>>,
    visitor: &mut V,
) {
    for member in members {
        match member {
            MemberDeclaration::Namespace(ns) => {
                ancestors.push(Ancestor::Namespace(ns));
                walk_members(tree, &ns.members, ancestors, visitor);
                ancestors.pop();
            }
            MemberDeclaration::Type(ty) => {
                visitor.visit_type(tree, ancestors, ty);
                ancestors.push(Ancestor::Type(ty));
                walk_members(tree, &ty.members, ancestors, visitor);
                ancestors.pop();
            }
            MemberDeclaration::Enum(declaration) => visitor.visit_enum(tree, ancestors, declaration),
            MemberDeclaration::Field(_)
            | MemberDeclaration::Property(_)
            | MemberDeclaration::Method(_)
            | MemberDeclaration::Other(_) => {}
        }
    }
}
