//! What a generator sees and produces during one run

use diagnostics::{Diagnostic, Diagnostics};
use fxhash::FxHashSet;
use parser::{Compilation, ConstantEvaluator, Span, SyntaxTree};
use source_map::SourceSpan;
use thiserror::Error;

/// One generated compilation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Unique name of the unit, used as its file name
    pub hint_name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("a source named '{0}' was already added")]
    DuplicateHintName(String),

    #[error("'{0}' is not a valid hint name")]
    InvalidHintName(String),
}

/// Per-run state handed to every generator.
///
/// Borrows the compilation and evaluator for `'c`, so generators can hold
/// syntax nodes while they publish sources and report diagnostics.
pub struct GeneratorContext<'c> {
    compilation: &'c Compilation,
    semantic: &'c dyn ConstantEvaluator,
    sources: Vec<GeneratedSource>,
    hint_names: FxHashSet<String>,
    diagnostics: Diagnostics,
}

impl<'c> GeneratorContext<'c> {
    pub fn new(compilation: &'c Compilation, semantic: &'c dyn ConstantEvaluator) -> Self {
        Self {
            compilation,
            semantic,
            sources: Vec::new(),
            hint_names: FxHashSet::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn compilation(&self) -> &'c Compilation {
        self.compilation
    }

    pub fn semantic(&self) -> &'c dyn ConstantEvaluator {
        self.semantic
    }

    /// Publish a generated unit. Hint names are unique per run and must be
    /// plain `.cs` file names.
    pub fn add_source(
        &mut self,
        hint_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), PublishError> {
        let hint_name = hint_name.into();
        if !is_valid_hint_name(&hint_name) {
            return Err(PublishError::InvalidHintName(hint_name));
        }
        if !self.hint_names.insert(hint_name.clone()) {
            return Err(PublishError::DuplicateHintName(hint_name));
        }
        log::info!("publishing {hint_name}");
        self.sources.push(GeneratedSource {
            hint_name,
            text: text.into(),
        });
        Ok(())
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        log::debug!("[{}] {}", diagnostic.code.as_deref().unwrap_or("-"), diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostic span of a node in `tree`
    pub fn span(&self, tree: &SyntaxTree, span: Span) -> SourceSpan {
        self.compilation.source_span(tree.file_id, span)
    }

    pub fn sources(&self) -> &[GeneratedSource] {
        &self.sources
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub(crate) fn into_parts(self) -> (Vec<GeneratedSource>, Diagnostics) {
        (self.sources, self.diagnostics)
    }
}

/// A pipeline run by the `GeneratorDriver`
pub trait SourceGenerator {
    fn name(&self) -> &str;

    fn execute(&self, context: &mut GeneratorContext<'_>);
}

fn is_valid_hint_name(name: &str) -> bool {
    const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    name.len() > ".cs".len()
        && name.ends_with(".cs")
        && !name.starts_with('.')
        && !name.contains(FORBIDDEN)
        && !name.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parser::ConstantFolder;

    #[test]
    fn test_hint_names_are_unique() {
        let compilation = Compilation::new();
        let folder = ConstantFolder::new();
        let mut context = GeneratorContext::new(&compilation, &folder);

        assert!(context.add_source("A.g.cs", "// a").is_ok());
        assert_eq!(
            context.add_source("A.g.cs", "// again"),
            Err(PublishError::DuplicateHintName("A.g.cs".to_string()))
        );
        assert_eq!(context.sources().len(), 1);
        assert_eq!(context.sources()[0].text, "// a");
    }

    #[test]
    fn test_hint_name_validation() {
        assert!(is_valid_hint_name("Game.Outer.Mover`1.AutoDispose.g.cs"));
        assert!(!is_valid_hint_name("nested/File.g.cs"));
        assert!(!is_valid_hint_name("Generic<T>.g.cs"));
        assert!(!is_valid_hint_name("notes.txt"));
        assert!(!is_valid_hint_name(".cs"));
    }
}
