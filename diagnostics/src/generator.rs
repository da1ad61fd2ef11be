//! Canned diagnostics reported by the parser and the source generators

use crate::{Diagnostic, DiagnosticBuilder, SourceSpan};

/// Diagnostic codes, grouped by the stage that reports them:
/// `SG0xxx` parsing, `SG1xxx` enum strings, `SG2xxx` auto dispose,
/// `SG3xxx` source publishing.
pub mod codes {
    pub const SYNTAX_ERROR: &str = "SG0001";
    pub const MALFORMED_DECLARATION: &str = "SG1001";
    pub const DUPLICATE_CANONICAL_PATH: &str = "SG1002";
    pub const UNRESOLVABLE_CONSTANT: &str = "SG1003";
    pub const HOLDER_NOT_PARTIAL: &str = "SG2001";
    pub const CONTAINER_NOT_PARTIAL: &str = "SG2002";
    pub const CLEANUP_HOOK_DEFINED: &str = "SG2003";
    pub const DUPLICATE_HINT_NAME: &str = "SG3001";
}

pub struct GeneratorDiagnostics;

impl GeneratorDiagnostics {
    pub fn syntax_error(span: SourceSpan, expected: &str) -> Diagnostic {
        DiagnosticBuilder::error(format!("syntax error: expected {expected}"), span.clone())
            .code(codes::SYNTAX_ERROR)
            .label(span, format!("expected {expected}"))
            .note("the file is skipped by every generator in this run")
            .build()
    }

    /// A declaration is missing the accessibility modifier the scan relies on
    pub fn malformed_declaration(span: SourceSpan, name: &str, reason: &str) -> Diagnostic {
        DiagnosticBuilder::error(format!("malformed declaration '{name}': {reason}"), span.clone())
            .code(codes::MALFORMED_DECLARATION)
            .label(span, reason.to_string())
            .help("declare exactly one of 'public', 'internal', 'protected' or 'private'")
            .build()
    }

    pub fn duplicate_canonical_path(
        span: SourceSpan,
        path: &str,
        first_span: SourceSpan,
    ) -> Diagnostic {
        DiagnosticBuilder::warning(
            format!("enum '{path}' is declared more than once; only the first declaration gets a ToFastString method"),
            span.clone(),
        )
        .code(codes::DUPLICATE_CANONICAL_PATH)
        .label(span, "this declaration is skipped")
        .secondary_label(first_span, "first declared here")
        .build()
    }

    pub fn unresolvable_constant(
        span: SourceSpan,
        enum_name: &str,
        member_name: &str,
        reason: &str,
    ) -> Diagnostic {
        DiagnosticBuilder::error(
            format!("cannot compute the value of '{enum_name}.{member_name}': {reason}"),
            span.clone(),
        )
        .code(codes::UNRESOLVABLE_CONSTANT)
        .label(span, "initializer is not an integer constant")
        .note(format!("no ToFastString method is generated for '{enum_name}'"))
        .build()
    }

    pub fn holder_not_partial(span: SourceSpan, class_name: &str, base_type: &str) -> Diagnostic {
        DiagnosticBuilder::warning(
            format!("class '{class_name}' derives from '{base_type}' but is not partial"),
            span.clone(),
        )
        .code(codes::HOLDER_NOT_PARTIAL)
        .label(span.clone(), "generated cleanup cannot be added to this class")
        .suggestion("declare the class partial", span, "partial class")
        .build()
    }

    pub fn container_not_partial(
        span: SourceSpan,
        class_name: &str,
        container_name: &str,
    ) -> Diagnostic {
        DiagnosticBuilder::warning(
            format!("class '{class_name}' is nested in '{container_name}', which is not partial"),
            span.clone(),
        )
        .code(codes::CONTAINER_NOT_PARTIAL)
        .label(span, "no generated cleanup for this class")
        .help(format!("declare '{container_name}' partial"))
        .build()
    }

    pub fn cleanup_hook_defined(span: SourceSpan, class_name: &str, hook: &str) -> Diagnostic {
        DiagnosticBuilder::warning(
            format!("class '{class_name}' already declares '{hook}()'"),
            span.clone(),
        )
        .code(codes::CLEANUP_HOOK_DEFINED)
        .label(span, "generated cleanup would conflict with this method")
        .help("release the resource handles in the existing method, or remove it")
        .build()
    }

    pub fn duplicate_hint_name(span: SourceSpan, hint_name: &str) -> Diagnostic {
        DiagnosticBuilder::error(
            format!("a generated source named '{hint_name}' was already added in this run"),
            span.clone(),
        )
        .code(codes::DUPLICATE_HINT_NAME)
        .label(span, "source for this declaration was dropped")
        .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DiagnosticSeverity, FileId, LabelStyle, SourcePosition};

    fn span(line: usize) -> SourceSpan {
        SourceSpan::new(
            SourcePosition::new(line, 5, 40),
            SourcePosition::new(line, 9, 44),
            FileId::new(0),
        )
    }

    #[test]
    fn test_duplicate_path_points_at_both_declarations() {
        let diagnostic = GeneratorDiagnostics::duplicate_canonical_path(span(8), "Game.State", span(2));

        assert_eq!(diagnostic.severity, DiagnosticSeverity::Warning);
        assert!(diagnostic.has_code(codes::DUPLICATE_CANONICAL_PATH));
        assert!(diagnostic.message.contains("Game.State"));
        let secondary: Vec<_> = diagnostic
            .labels
            .iter()
            .filter(|l| l.style == LabelStyle::Secondary)
            .collect();
        assert_eq!(secondary.len(), 1);
        assert_eq!(secondary[0].span.start.line, 2);
    }

    #[test]
    fn test_unresolvable_constant_is_an_error() {
        let diagnostic =
            GeneratorDiagnostics::unresolvable_constant(span(3), "Flags", "All", "unknown name 'X'");

        assert!(diagnostic.is_error());
        assert!(diagnostic.message.contains("Flags.All"));
        assert!(diagnostic.message.contains("unknown name 'X'"));
    }

    #[test]
    fn test_holder_not_partial_suggests_partial() {
        let diagnostic = GeneratorDiagnostics::holder_not_partial(span(1), "Mover", "SystemBase");

        assert_eq!(diagnostic.suggestions.len(), 1);
        assert_eq!(diagnostic.suggestions[0].replacement, "partial class");
    }
}
