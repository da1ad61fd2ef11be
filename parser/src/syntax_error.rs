//! Parser error type that keeps the deepest failure and its context strings

use nom::error::{ContextError, ErrorKind, ParseError};

/// Error produced by the C# parsers.
///
/// When two alternatives fail, the one that got further into the input
/// wins, so the reported position is where parsing actually got stuck
/// rather than the start of the enclosing declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError<I> {
    pub input: I,
    pub code: ErrorKind,
    /// Context strings, innermost first
    pub contexts: Vec<&'static str>,
}

impl<I> SyntaxError<I> {
    pub fn new(input: I, code: ErrorKind) -> Self {
        Self {
            input,
            code,
            contexts: Vec::new(),
        }
    }

    /// What the parser was looking for where it failed
    pub fn expected(&self) -> &'static str {
        self.contexts.first().copied().unwrap_or("a declaration")
    }
}

impl<I> ParseError<I> for SyntaxError<I>
where
    I: AsRef<str>,
{
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Self::new(input, kind)
    }

    fn append(_input: I, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        let mine = self.input.as_ref().len();
        let theirs = other.input.as_ref().len();
        if theirs < mine || (theirs == mine && self.contexts.is_empty()) {
            other
        } else {
            self
        }
    }
}

impl<I> ContextError<I> for SyntaxError<I> {
    fn add_context(_input: I, ctx: &'static str, mut other: Self) -> Self {
        other.contexts.push(ctx);
        other
    }
}

/// Build a recoverable error at `input`
pub fn fail_at<I>(input: I, code: ErrorKind) -> nom::Err<SyntaxError<I>> {
    nom::Err::Error(SyntaxError::new(input, code))
}

/// Build a recoverable error at `input` that reports what was expected
pub fn expected_at<I>(input: I, what: &'static str) -> nom::Err<SyntaxError<I>> {
    let mut error = SyntaxError::new(input, ErrorKind::Verify);
    error.contexts.push(what);
    nom::Err::Error(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_prefers_deeper_failure() {
        let text = "enum E { A = }";
        let shallow = SyntaxError::new(&text[0..], ErrorKind::Tag);
        let deep = SyntaxError::new(&text[13..], ErrorKind::Tag);

        let chosen = shallow.or(deep.clone());
        assert_eq!(chosen, deep);
    }

    #[test]
    fn test_innermost_context_is_expected() {
        let error = SyntaxError::new("x", ErrorKind::Tag);
        let error = SyntaxError::add_context("x", "enum member", error);
        let error = SyntaxError::add_context("x", "enum declaration", error);

        assert_eq!(error.expected(), "enum member");
        assert_eq!(SyntaxError::new("x", ErrorKind::Tag).expected(), "a declaration");
    }
}
