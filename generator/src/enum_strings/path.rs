//! Canonical paths of enum declarations

use parser::{Identifier, TypeDeclaration};

use crate::syntax_walk::Ancestor;

/// Fully-qualified name of an enum and the type parameters in scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// `Ns.Outer<T>.Inner.Enum`, without a `global::` prefix
    pub path: String,
    /// Type parameters of every enclosing type, outermost first
    pub generic_parameters: Vec<String>,
}

impl ResolvedPath {
    /// `global::`-qualified path, as written in generated code
    pub fn qualified(&self) -> String {
        format!("global::{}", self.path)
    }

    /// `<T, U>`, or empty when no enclosing type is generic
    pub fn generic_suffix(&self) -> String {
        if self.generic_parameters.is_empty() {
            String::new()
        } else {
            format!("<{}>", self.generic_parameters.join(", "))
        }
    }
}

pub fn resolve_path(name: &Identifier, ancestors: &[Ancestor<'_>]) -> ResolvedPath {
    let mut segments = Vec::with_capacity(ancestors.len() + 1);
    let mut generic_parameters = Vec::new();

    for ancestor in ancestors {
        match ancestor {
            Ancestor::Namespace(ns) => segments.push(ns.name.to_string()),
            Ancestor::Type(ty) => {
                segments.push(type_segment(ty));
                if let Some(list) = &ty.type_parameters {
                    generic_parameters.extend(list.names().map(str::to_string));
                }
            }
        }
    }
    segments.push(name.text.clone());

    ResolvedPath {
        path: segments.join("."),
        generic_parameters,
    }
}

/// `Name<T, U>` with variance annotations dropped
fn type_segment(ty: &TypeDeclaration) -> String {
    match &ty.type_parameters {
        Some(list) => format!(
            "{}<{}>",
            ty.identifier,
            list.names().collect::<Vec<_>>().join(", ")
        ),
        None => ty.identifier.text.clone(),
    }
}
