//! The set of parsed source files a generator run works on

use diagnostics::generator::GeneratorDiagnostics;
use diagnostics::{Diagnostic, Diagnostics, FileId, SourceMap, SourceSpan};

use crate::cs_ast::{CompilationUnit, Span};
use crate::cs_parser::parse_compilation_unit;

/// One successfully parsed file
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub file_id: FileId,
    pub path: String,
    pub root: CompilationUnit,
}

/// Every source file of a run and the syntax trees of those that parsed.
///
/// Files with syntax errors stay registered in the source map so their
/// diagnostics can show the offending line, but contribute no tree.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    source_map: SourceMap,
    trees: Vec<SyntaxTree>,
}

impl Compilation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register one file
    pub fn add_source(&mut self, path: impl Into<String>, text: impl Into<String>) -> Result<FileId, Diagnostic> {
        let path = path.into();
        let text = text.into();
        let parsed = parse_compilation_unit(&text);
        let file_id = self.source_map.add_file(path.clone(), text);

        match parsed {
            Ok(root) => {
                self.trees.push(SyntaxTree { file_id, path, root });
                Ok(file_id)
            }
            Err(failure) => {
                let span = self.source_span(file_id, Span::new(failure.offset, failure.offset + 1));
                Err(GeneratorDiagnostics::syntax_error(span, failure.expected))
            }
        }
    }

    /// Parse every `(path, text)` pair, collecting all syntax errors
    pub fn from_sources<P, T>(sources: impl IntoIterator<Item = (P, T)>) -> (Self, Diagnostics)
    where
        P: Into<String>,
        T: Into<String>,
    {
        let mut compilation = Self::new();
        let mut diagnostics = Diagnostics::new();
        for (path, text) in sources {
            if let Err(diagnostic) = compilation.add_source(path, text) {
                diagnostics.push(diagnostic);
            }
        }
        (compilation, diagnostics)
    }

    pub fn syntax_trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.source_map
    }

    /// Convert a node span into a diagnostic span
    pub fn source_span(&self, file_id: FileId, span: Span) -> SourceSpan {
        self.source_map
            .span_from_offsets(file_id, span.start, span.end)
            .unwrap_or_else(|| SourceSpan::empty(file_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diagnostics::generator::codes;

    #[test]
    fn test_syntax_error_keeps_file_registered() {
        let mut compilation = Compilation::new();
        let good = compilation.add_source("Good.cs", "public enum A { X }");
        let bad = compilation.add_source("Bad.cs", "public enum B { X = }\n");

        assert!(good.is_ok());
        let diagnostic = bad.unwrap_err();
        assert!(diagnostic.has_code(codes::SYNTAX_ERROR));
        assert_eq!(diagnostic.span.start.line, 1);
        assert_eq!(diagnostic.span.start.column, 21);

        assert_eq!(compilation.syntax_trees().len(), 1);
        assert_eq!(compilation.source_map().len(), 2);
    }

    #[test]
    fn test_from_sources_collects_all_errors() {
        let (compilation, diagnostics) = Compilation::from_sources([
            ("A.cs", "class {"),
            ("B.cs", "namespace N { enum E { A } }"),
            ("C.cs", "enum"),
        ]);

        assert_eq!(compilation.syntax_trees().len(), 1);
        assert_eq!(compilation.syntax_trees()[0].path, "B.cs");
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.has_errors());
    }
}
