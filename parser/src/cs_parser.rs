//! C# parser entry point and lexical helpers
//!
//! Parsing functions follow one shape: they take the full file text plus
//! the remaining input, skip leading trivia themselves, and compute spans
//! as byte offsets into the full text.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while},
    character::complete::{char, multispace1, satisfy},
    combinator::{eof, recognize, value},
    error::context,
    multi::many0,
    IResult, Parser,
};

use crate::cs_ast::*;
use crate::cs_parser_decls::{members_until, using_directives};
use crate::syntax_error::{expected_at, SyntaxError};

/// Parser result type with contextual errors
pub type PResult<'a, T> = IResult<&'a str, T, SyntaxError<&'a str>>;

/// Where and why a file failed to parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFailure {
    pub offset: usize,
    pub expected: &'static str,
}

/// Parse a complete C# file
pub fn parse_compilation_unit(input: &str) -> Result<CompilationUnit, SyntaxFailure> {
    match compilation_unit(input, input) {
        Ok((_, unit)) => Ok(unit),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(SyntaxFailure {
            offset: position(input, e.input),
            expected: e.expected(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(SyntaxFailure {
            offset: input.len(),
            expected: "more input",
        }),
    }
}

pub fn compilation_unit<'a>(full: &'a str, input: &'a str) -> PResult<'a, CompilationUnit> {
    let start = position(full, input);
    let (input, _) = extern_aliases(input)?;
    let (input, usings) = using_directives(full, input)?;
    let (input, members) = members_until(full, input, None)?;
    let (input, _) = context("a declaration", eof).parse(input)?;

    Ok((
        input,
        CompilationUnit {
            usings,
            members,
            span: make_span(full, start, input),
        },
    ))
}

/// `extern alias Name;` lines, which only ever precede using directives
fn extern_aliases(input: &str) -> PResult<'_, ()> {
    let mut input = input;
    loop {
        let Ok((rest, _)) = keyword("extern").parse(input) else {
            return Ok((input, ()));
        };
        let Ok((rest, _)) = keyword("alias").parse(rest) else {
            return Ok((input, ()));
        };
        let (rest, _) = word(ws(rest)?.0)?;
        let (rest, _) = context("';' after extern alias", symbol(";")).parse(rest)?;
        input = rest;
    }
}

// =============================================================================
// Positions
// =============================================================================

/// Byte offset of `current` within `full`
pub fn position(full: &str, current: &str) -> usize {
    full.len() - current.len()
}

/// Span from `start_pos` to the current position
pub fn make_span(full: &str, start_pos: usize, current: &str) -> Span {
    Span::new(start_pos, position(full, current))
}

// =============================================================================
// Trivia
// =============================================================================

/// Skip whitespace, comments and preprocessor lines
pub fn ws(input: &str) -> PResult<'_, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), line_comment),
            value((), block_comment),
            value((), preprocessor_directive),
        ))),
    )
    .parse(input)
}

fn line_comment(input: &str) -> PResult<'_, &str> {
    recognize((tag("//"), take_while(|c: char| c != '\n'))).parse(input)
}

fn block_comment(input: &str) -> PResult<'_, &str> {
    recognize((tag("/*"), take_until("*/"), tag("*/"))).parse(input)
}

/// `#region`, `#if UNITY_EDITOR` ... Conditional sections are not
/// evaluated; both branches are parsed.
fn preprocessor_directive(input: &str) -> PResult<'_, &str> {
    recognize((char('#'), take_while(|c: char| c != '\n'))).parse(input)
}

// =============================================================================
// Tokens
// =============================================================================

/// Reserved C# keywords. Contextual keywords (`partial`, `record`,
/// `global`, `nint` ...) are valid identifiers and not listed.
pub fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "abstract" | "as" | "base" | "bool" | "break" | "byte" | "case" | "catch"
            | "char" | "checked" | "class" | "const" | "continue" | "decimal"
            | "default" | "delegate" | "do" | "double" | "else" | "enum" | "event"
            | "explicit" | "extern" | "false" | "finally" | "fixed" | "float" | "for"
            | "foreach" | "goto" | "if" | "implicit" | "in" | "int" | "interface"
            | "internal" | "is" | "lock" | "long" | "namespace" | "new" | "null"
            | "object" | "operator" | "out" | "override" | "params" | "private"
            | "protected" | "public" | "readonly" | "ref" | "return" | "sbyte"
            | "sealed" | "short" | "sizeof" | "stackalloc" | "static" | "string"
            | "struct" | "switch" | "this" | "throw" | "true" | "try" | "typeof"
            | "uint" | "ulong" | "unchecked" | "unsafe" | "ushort" | "using"
            | "virtual" | "void" | "volatile" | "while"
    )
}

/// A raw word: identifier characters, keyword or not. No trivia is skipped.
pub fn word(input: &str) -> PResult<'_, &str> {
    recognize((
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// The next word after trivia, without consuming anything
pub fn peek_word(input: &str) -> Option<&str> {
    let (input, _) = ws(input).ok()?;
    word(input).ok().map(|(_, w)| w)
}

/// Parse a keyword (or contextual keyword) as a whole word
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| {
        let (input, _) = ws(input)?;
        let (rest, found) = word(input)?;
        if found == kw {
            Ok((rest, found))
        } else {
            Err(expected_at(input, kw))
        }
    }
}

/// Parse an identifier; `@`-prefixed verbatim identifiers may be keywords
pub fn identifier<'a>(full: &'a str, input: &'a str) -> PResult<'a, Identifier> {
    let (input, _) = ws(input)?;
    let start = position(full, input);
    let (rest, verbatim) = match input.strip_prefix('@') {
        Some(rest) => (rest, true),
        None => (input, false),
    };
    let (rest, name) = word(rest)?;
    if !verbatim && is_keyword(name) {
        return Err(expected_at(input, "an identifier"));
    }

    let text = &input[..input.len() - rest.len()];
    Ok((rest, Identifier::new(text, make_span(full, start, rest))))
}

/// Parse a symbol after optional trivia
pub fn symbol<'a>(sym: &'static str) -> impl FnMut(&'a str) -> PResult<'a, &'a str> {
    move |input: &'a str| {
        let (input, _) = ws(input)?;
        tag(sym).parse(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_skips_comments_and_directives() {
        let input = "  // line\n /* block\n */ #region Stuff\n#if DEBUG\n  enum";
        let (rest, _) = ws(input).unwrap();
        assert_eq!(rest, "enum");
    }

    #[test]
    fn test_keyword_requires_whole_word() {
        assert!(keyword("enum").parse(" enum E").is_ok());
        assert!(keyword("enum").parse("enumeration").is_err());
        assert!(keyword("class").parse("classic").is_err());
    }

    #[test]
    fn test_identifier_rejects_keywords_unless_verbatim() {
        let full = "class @class _x9 Größe";
        assert!(identifier(full, full).is_err());

        let (rest, verbatim) = identifier(full, &full[5..]).unwrap();
        assert_eq!(verbatim.text, "@class");
        assert_eq!(verbatim.value_text(), "class");
        assert_eq!(verbatim.span, Span::new(6, 12));

        let (rest, underscore) = identifier(full, rest).unwrap();
        assert_eq!(underscore.text, "_x9");

        let (_, unicode) = identifier(full, rest).unwrap();
        assert_eq!(unicode.text, "Größe");
    }

    #[test]
    fn test_contextual_keywords_are_identifiers() {
        for name in ["partial", "record", "global", "var", "file", "nint"] {
            assert!(identifier(name, name).is_ok(), "{name} should be an identifier");
        }
    }

    #[test]
    fn test_syntax_failure_position() {
        let source = "namespace A {\n    enum E { X = , }\n}";
        let failure = parse_compilation_unit(source).unwrap_err();
        assert_eq!(&source[failure.offset..failure.offset + 1], ",");
        assert_eq!(failure.expected, "enum member value");
    }

    #[test]
    fn test_unclosed_namespace_fails() {
        assert!(parse_compilation_unit("namespace A { public enum E { X }").is_err());
    }

    #[test]
    fn test_empty_file() {
        let unit = parse_compilation_unit("").unwrap();
        assert!(unit.members.is_empty());
        assert_eq!(unit.span, Span::new(0, 0));
    }
}
