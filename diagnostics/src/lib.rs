//! Diagnostics for source generation runs
//!
//! Generators never abort a run on a bad declaration. They report a
//! `Diagnostic` against the offending span and move on, so a run returns
//! every problem at once alongside whatever sources it could produce.
//!
//! This crate provides:
//! - Severity levels (Error, Warning, Info, Hint)
//! - Primary and secondary labels
//! - Suggestions, notes and help lines
//! - A plain or colored terminal formatter with source snippets

use std::fmt;

pub use source_map::{FileId, SourceFile, SourceMap, SourcePosition, SourceSpan};

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Error => write!(f, "error"),
            DiagnosticSeverity::Warning => write!(f, "warning"),
            DiagnosticSeverity::Info => write!(f, "info"),
            DiagnosticSeverity::Hint => write!(f, "hint"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Primary,
    Secondary,
}

/// A message attached to a span
#[derive(Debug, Clone)]
pub struct Label {
    pub span: SourceSpan,
    pub message: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn primary(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    pub fn secondary(span: SourceSpan, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

/// A proposed source edit
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub message: String,
    pub span: SourceSpan,
    pub replacement: String,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: Option<String>,
    pub message: String,
    pub span: SourceSpan,
    pub labels: Vec<Label>,
    pub suggestions: Vec<Suggestion>,
    pub notes: Vec<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

/// Collection of diagnostics, in the order they were reported
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
    }

    /// Diagnostics carrying the given code
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.has_code(code))
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

/// Builder for creating diagnostics
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    fn with_severity(severity: DiagnosticSeverity, message: String, span: SourceSpan) -> Self {
        Self {
            diagnostic: Diagnostic {
                severity,
                code: None,
                message,
                span,
                labels: vec![],
                suggestions: vec![],
                notes: vec![],
                help: vec![],
            },
        }
    }

    pub fn error(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, message.into(), span)
    }

    pub fn warning(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, message.into(), span)
    }

    pub fn info(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::with_severity(DiagnosticSeverity::Info, message.into(), span)
    }

    pub fn hint(message: impl Into<String>, span: SourceSpan) -> Self {
        Self::with_severity(DiagnosticSeverity::Hint, message.into(), span)
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.diagnostic.code = Some(code.into());
        self
    }

    pub fn label(mut self, span: SourceSpan, message: impl Into<String>) -> Self {
        self.diagnostic.labels.push(Label::primary(span, message));
        self
    }

    pub fn secondary_label(mut self, span: SourceSpan, message: impl Into<String>) -> Self {
        self.diagnostic.labels.push(Label::secondary(span, message));
        self
    }

    pub fn suggestion(
        mut self,
        message: impl Into<String>,
        span: SourceSpan,
        replacement: impl Into<String>,
    ) -> Self {
        self.diagnostic.suggestions.push(Suggestion {
            message: message.into(),
            span,
            replacement: replacement.into(),
        });
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.diagnostic.notes.push(note.into());
        self
    }

    pub fn help(mut self, help_msg: impl Into<String>) -> Self {
        self.diagnostic.help.push(help_msg.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }
}

const RESET: &str = "\x1b[0m";
const BLUE: &str = "\x1b[96m";

/// Renders diagnostics with a source snippet under each header
pub struct ErrorFormatter {
    use_colors: bool,
}

impl ErrorFormatter {
    pub fn new() -> Self {
        Self { use_colors: false }
    }

    pub fn with_colors() -> Self {
        Self { use_colors: true }
    }

    pub fn format_diagnostics(&self, diagnostics: &Diagnostics, source_map: &SourceMap) -> String {
        diagnostics
            .iter()
            .map(|diagnostic| self.format_diagnostic(diagnostic, source_map))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn format_diagnostic(&self, diagnostic: &Diagnostic, source_map: &SourceMap) -> String {
        let mut output = String::new();

        let severity_color = match diagnostic.severity {
            DiagnosticSeverity::Error => "\x1b[31m",
            DiagnosticSeverity::Warning => "\x1b[33m",
            DiagnosticSeverity::Info => "\x1b[36m",
            DiagnosticSeverity::Hint => "\x1b[32m",
        };
        let mut header = diagnostic.severity.to_string();
        if let Some(code) = &diagnostic.code {
            header.push_str(&format!("[{code}]"));
        }
        output.push_str(&self.paint(severity_color, &header));
        output.push_str(": ");
        output.push_str(&self.paint("\x1b[1;97m", &diagnostic.message));
        output.push('\n');

        let span = &diagnostic.span;
        if let Some(file) = source_map.get_file(span.file_id) {
            output.push_str(&format!(
                "  {} {}:{}:{}\n",
                self.paint(BLUE, "-->"),
                file.name,
                span.start.line,
                span.start.column
            ));

            if let Some(line) = file.get_line(span.start.line) {
                let gutter = span.start.line.to_string();
                let width = gutter.len();
                let bar = self.paint(BLUE, "|");

                output.push_str(&format!("{:width$} {bar}\n", ""));
                output.push_str(&format!("{} {bar} {line}\n", self.paint(BLUE, &gutter)));

                let underline_len = if span.start.line == span.end.line {
                    span.end.column.saturating_sub(span.start.column)
                } else {
                    line.chars().count().saturating_sub(span.start.column - 1)
                };
                let padding = " ".repeat(span.start.column.saturating_sub(1));
                let carets = self.paint(severity_color, &"^".repeat(underline_len.max(1)));
                output.push_str(&format!("{:width$} {bar} {padding}{carets}", ""));

                if let Some(label) = diagnostic
                    .labels
                    .iter()
                    .find(|l| l.style == LabelStyle::Primary)
                {
                    output.push(' ');
                    output.push_str(&self.paint(severity_color, &label.message));
                }
                output.push('\n');
            }
        }

        for label in diagnostic
            .labels
            .iter()
            .filter(|l| l.style == LabelStyle::Secondary)
        {
            if let Some(name) = source_map.file_name(label.span.file_id) {
                output.push_str(&format!(
                    "  {} {}:{}:{}: {}\n",
                    self.paint(BLUE, "-->"),
                    name,
                    label.span.start.line,
                    label.span.start.column,
                    label.message
                ));
            }
        }

        for suggestion in &diagnostic.suggestions {
            output.push_str(&format!(
                "{}: {}\n",
                self.paint("\x1b[38;5;208m", "suggestion"),
                suggestion.message
            ));
        }

        for help_msg in &diagnostic.help {
            output.push_str(&format!("     {}: {}\n", self.paint("\x1b[32m", "help"), help_msg));
        }

        for note in &diagnostic.notes {
            output.push_str(&format!("{}: {}\n", self.paint("\x1b[34m", "note"), note));
        }

        output
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Result type that carries diagnostics on failure
pub type DiagnosticResult<T> = Result<T, Diagnostics>;

pub mod generator;

#[cfg(test)]
mod tests {
    use super::*;

    fn span_in(source_map: &SourceMap, file_id: FileId, start: usize, end: usize) -> SourceSpan {
        source_map.span_from_offsets(file_id, start, end).unwrap()
    }

    #[test]
    fn test_diagnostic_builder() {
        let span = SourceSpan::new(
            SourcePosition::new(1, 5, 4),
            SourcePosition::new(1, 6, 5),
            FileId::new(0),
        );

        let diagnostic = DiagnosticBuilder::error("test error", span.clone())
            .code("SG0001")
            .label(span, "here")
            .help("try this")
            .note("additional info")
            .build();

        assert_eq!(diagnostic.severity, DiagnosticSeverity::Error);
        assert!(diagnostic.has_code("SG0001"));
        assert_eq!(diagnostic.message, "test error");
        assert_eq!(diagnostic.labels.len(), 1);
        assert_eq!(diagnostic.help.len(), 1);
        assert_eq!(diagnostic.notes.len(), 1);
    }

    #[test]
    fn test_collection_filters() {
        let span = SourceSpan::empty(FileId::new(0));
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticBuilder::warning("w", span.clone()).code("SG1002").build());
        assert!(!diagnostics.has_errors());

        diagnostics.push(DiagnosticBuilder::error("e", span).code("SG1003").build());
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(diagnostics.with_code("SG1002").count(), 1);
        assert_eq!(diagnostics.with_code("SG9999").count(), 0);
    }

    #[test]
    fn test_plain_formatting_underlines_span() {
        let mut source_map = SourceMap::new();
        let file_id = source_map.add_file(
            "Flags.cs".to_string(),
            "public enum Flags\n{\n    A = Missing,\n}".to_string(),
        );
        let span = span_in(&source_map, file_id, 28, 35);

        let diagnostic = DiagnosticBuilder::error("cannot fold 'Missing'", span.clone())
            .code("SG1003")
            .label(span, "not a constant")
            .build();
        let text = ErrorFormatter::new().format_diagnostic(&diagnostic, &source_map);

        assert!(text.starts_with("error[SG1003]: cannot fold 'Missing'"));
        assert!(text.contains("--> Flags.cs:3:9"));
        assert!(text.contains("3 |     A = Missing,"));
        assert!(text.contains("  |         ^^^^^^^ not a constant"));
        assert!(!text.contains('\x1b'));
    }
}
