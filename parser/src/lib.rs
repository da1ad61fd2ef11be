//! Declaration-level C# front end for the source generators
//!
//! Parses C# files into a syntax tree that covers what code generation
//! needs (namespaces, type and enum declarations, type members) and skips
//! method bodies. A `Compilation` holds the parsed files of one run; the
//! `ConstantEvaluator` trait supplies enum member values.

pub mod compilation;
pub mod constant_folder;
pub mod cs_ast;
pub mod cs_parser;
pub mod cs_parser_decls;
pub mod cs_parser_expr;
pub mod cs_parser_types;
pub mod cs_skip;
pub mod semantic;
pub mod syntax_error;

// Re-export diagnostics from the diagnostics crate
pub use diagnostics::{Diagnostic, DiagnosticResult, Diagnostics, FileId, SourceMap, SourceSpan};

pub use compilation::{Compilation, SyntaxTree};
pub use constant_folder::ConstantFolder;
pub use cs_ast::*;
pub use cs_parser::{parse_compilation_unit, SyntaxFailure};
pub use semantic::{ConstantEvaluator, EvalError};
