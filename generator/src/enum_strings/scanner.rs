//! Which enums get a fast-string method, and with what accessibility

use parser::{EnumDeclaration, Modifier, ModifierKind, ModifierList, Span};

use crate::syntax_walk::Ancestor;

/// Accessibility of a generated extension method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Internal,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Internal => "internal",
        }
    }
}

/// A declaration whose accessibility cannot be determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed {
    pub span: Span,
    pub reason: String,
}

/// Effective visibility of `declaration` nested in `ancestors`.
///
/// `Ok(None)` means the enum is skipped: it is not itself public or
/// internal, or some enclosing type is private, protected or file-local.
/// Any internal level makes the whole chain internal, so an enum declared
/// `protected internal` gets an internal method.
pub fn effective_visibility(
    declaration: &EnumDeclaration,
    ancestors: &[Ancestor<'_>],
) -> Result<Option<Visibility>, Malformed> {
    let own = declaration.modifiers.accessibility();
    let is_public = own.has_modifier(ModifierKind::Public);
    let is_internal = own.has_modifier(ModifierKind::Internal);
    if is_public && is_internal {
        return Err(Malformed {
            span: declaration.identifier.span,
            reason: "declares both 'public' and 'internal'".to_string(),
        });
    }
    if !is_public && !is_internal {
        return Ok(None);
    }

    let mut visibility = if is_internal {
        Visibility::Internal
    } else {
        Visibility::Public
    };

    for ancestor in ancestors.iter().rev() {
        let Some(container) = ancestor.as_type() else {
            continue;
        };
        let access = container.modifiers.accessibility();
        if access.is_empty() {
            return Err(Malformed {
                span: container.identifier.span,
                reason: format!(
                    "enclosing type '{}' has no accessibility modifier",
                    container.identifier
                ),
            });
        }
        if restricts_access(&access) {
            return Ok(None);
        }
        if access.has_modifier(ModifierKind::Internal) {
            visibility = Visibility::Internal;
        }
    }

    Ok(Some(visibility))
}

fn restricts_access(access: &[Modifier]) -> bool {
    access.iter().any(|modifier| {
        matches!(
            modifier.kind,
            ModifierKind::Private | ModifierKind::Protected | ModifierKind::File
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax_walk::{walk_tree, DeclarationVisitor};
    use parser::{Compilation, SyntaxTree};

    #[derive(Default)]
    struct Visibilities {
        found: Vec<(String, Result<Option<Visibility>, Malformed>)>,
    }

    impl<'t> DeclarationVisitor<'t> for Visibilities {
        fn visit_enum(
            &mut self,
            _tree: &'t SyntaxTree,
            ancestors: &[Ancestor<'t>],
            declaration: &'t EnumDeclaration,
        ) {
            self.found.push((
                declaration.identifier.text.clone(),
                effective_visibility(declaration, ancestors),
            ));
        }
    }

    fn visibilities(source: &str) -> Vec<(String, Result<Option<Visibility>, Malformed>)> {
        let (compilation, diagnostics) = Compilation::from_sources([("V.cs", source)]);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let mut visitor = Visibilities::default();
        walk_tree(&compilation.syntax_trees()[0], &mut visitor);
        visitor.found
    }

    #[test]
    fn test_own_modifier_decides_candidates() {
        let found = visibilities(
            "namespace N { public enum A { X } internal enum B { X } enum C { X } }",
        );
        assert_eq!(found[0].1, Ok(Some(Visibility::Public)));
        assert_eq!(found[1].1, Ok(Some(Visibility::Internal)));
        assert_eq!(found[2].1, Ok(None));
    }

    #[test]
    fn test_internal_container_makes_enum_internal() {
        let found = visibilities(
            "public class Outer { internal class Mid { public class Inner { public enum E { X } } } }",
        );
        assert_eq!(found[0].1, Ok(Some(Visibility::Internal)));
    }

    #[test]
    fn test_private_or_protected_container_excludes() {
        let found = visibilities(
            r#"
public class Host
{
    private class Hidden { public enum A { X } }
    protected class Guarded { public enum B { X } }
    protected internal class Mixed { public enum C { X } }
    public enum D { X }
    private enum E { X }
}
"#,
        );
        let results: Vec<_> = found.into_iter().map(|(_, result)| result).collect();
        assert_eq!(
            results,
            vec![
                Ok(None),
                Ok(None),
                Ok(None),
                Ok(Some(Visibility::Public)),
                Ok(None),
            ]
        );
    }

    #[test]
    fn test_protected_internal_enum_is_internal() {
        let found = visibilities(
            r#"
public class Host
{
    protected internal enum Shared { X }
    internal protected enum Reversed { X }
    private protected enum Narrow { X }
    protected enum Family { X }
}
"#,
        );
        let results: Vec<_> = found.into_iter().map(|(_, result)| result).collect();
        assert_eq!(
            results,
            vec![
                Ok(Some(Visibility::Internal)),
                Ok(Some(Visibility::Internal)),
                Ok(None),
                Ok(None),
            ]
        );
    }

    #[test]
    fn test_missing_container_modifier_is_malformed() {
        let found = visibilities("namespace N { class Loose { public enum E { X } } }");
        let malformed = found[0].1.clone().unwrap_err();
        assert!(malformed.reason.contains("'Loose'"));
    }

    #[test]
    fn test_public_and_internal_is_malformed() {
        let found = visibilities("public internal enum E { X }");
        assert!(found[0].1.is_err());
    }
}
