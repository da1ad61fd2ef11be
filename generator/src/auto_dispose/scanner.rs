//! Finds resource-holder classes and the handles they own

use parser::{
    Identifier, MemberDeclaration, SyntaxTree, TypeDeclaration, TypeDeclarationKind,
};

use crate::config::AutoDisposeConfig;
use crate::syntax_walk::{enclosing_types, namespace_of, Ancestor, DeclarationVisitor};

/// A class deriving from the configured base type
#[derive(Debug, Clone)]
pub struct ResourceHolder<'t> {
    pub tree: &'t SyntaxTree,
    pub declaration: &'t TypeDeclaration,
    /// Dotted namespace, if the class is inside one
    pub namespace: Option<String>,
    /// Enclosing types, outermost first
    pub containers: Vec<&'t TypeDeclaration>,
    /// Fields and auto-properties to release, in declaration order
    pub tracked: Vec<&'t Identifier>,
}

/// Whether the base list names `base_type` as a plain identifier
pub fn derives_from(declaration: &TypeDeclaration, base_type: &str) -> bool {
    declaration.base_list.iter().any(|ty| {
        ty.plain_identifiers()
            .iter()
            .any(|identifier| identifier.value_text() == base_type)
    })
}

/// Members declared with one of the handle types.
///
/// Matching is by simple name, so `Unity.Collections.NativeArray<T>` and
/// `NativeArray<T>?` both count. Properties count only when they are
/// auto-properties, since there is no backing field to release otherwise.
pub fn tracked_members<'t>(
    declaration: &'t TypeDeclaration,
    handle_types: &[String],
) -> Vec<&'t Identifier> {
    let is_handle = |name: Option<&str>| {
        name.is_some_and(|name| handle_types.iter().any(|handle| handle == name))
    };

    let mut tracked = Vec::new();
    for member in &declaration.members {
        match member {
            MemberDeclaration::Field(field) if is_handle(field.ty.simple_name()) => {
                tracked.extend(field.declarators.iter().map(|d| &d.identifier));
            }
            MemberDeclaration::Property(property)
                if property.is_auto
                    && property.explicit_interface.is_none()
                    && is_handle(property.ty.simple_name()) =>
            {
                tracked.push(&property.identifier);
            }
            _ => {}
        }
    }
    tracked
}

/// Collects every holder class in the trees it walks
pub struct HolderScanner<'a, 't> {
    config: &'a AutoDisposeConfig,
    pub holders: Vec<ResourceHolder<'t>>,
}

impl<'a, 't> HolderScanner<'a, 't> {
    pub fn new(config: &'a AutoDisposeConfig) -> Self {
        Self {
            config,
            holders: Vec::new(),
        }
    }
}

impl<'a, 't> DeclarationVisitor<'t> for HolderScanner<'a, 't> {
    fn visit_type(
        &mut self,
        tree: &'t SyntaxTree,
        ancestors: &[Ancestor<'t>],
        declaration: &'t TypeDeclaration,
    ) {
        if declaration.kind != TypeDeclarationKind::Class
            || !derives_from(declaration, &self.config.base_type)
        {
            return;
        }
        let tracked = tracked_members(declaration, &self.config.handle_types);
        log::debug!(
            "{} derives from {} with {} handle(s)",
            declaration.identifier,
            self.config.base_type,
            tracked.len()
        );
        self.holders.push(ResourceHolder {
            tree,
            declaration,
            namespace: namespace_of(ancestors),
            containers: enclosing_types(ancestors),
            tracked,
        });
    }
}
