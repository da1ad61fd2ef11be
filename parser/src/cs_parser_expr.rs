//! Constant expressions, as found in enum member initializers
//!
//! Only the integer constant grammar is parsed: literals, names, unary and
//! binary integer operators, casts and `checked`/`unchecked`. Anything
//! else is captured verbatim as `ExpressionKind::Unsupported` so the file
//! still parses and the evaluator can report what it could not fold.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::digit1,
    combinator::recognize,
    error::{context, ErrorKind},
    Parser,
};

use crate::cs_ast::*;
use crate::cs_parser::{identifier, make_span, position, symbol, word, ws, PResult};
use crate::cs_parser_types::{is_predefined_type, type_syntax};
use crate::cs_skip::take_until_top_level;
use crate::syntax_error::{expected_at, fail_at};

const BINARY_OPERATORS: &[(&str, BinaryOperator)] = &[
    (">>>", BinaryOperator::UnsignedShiftRight),
    ("<<", BinaryOperator::ShiftLeft),
    (">>", BinaryOperator::ShiftRight),
    ("*", BinaryOperator::Multiply),
    ("/", BinaryOperator::Divide),
    ("%", BinaryOperator::Remainder),
    ("+", BinaryOperator::Add),
    ("-", BinaryOperator::Subtract),
    ("&", BinaryOperator::BitwiseAnd),
    ("^", BinaryOperator::ExclusiveOr),
    ("|", BinaryOperator::BitwiseOr),
];

/// Initializer of an enum member, up to the next `,` or `}`.
///
/// Falls back to an `Unsupported` expression holding the raw text when the
/// initializer is outside the constant grammar.
pub fn initializer_expression<'a>(full: &'a str, input: &'a str) -> PResult<'a, Expression> {
    if let Ok((rest, expression)) = constant_expression(full, input) {
        let (after, _) = ws(rest)?;
        if after.starts_with(',') || after.starts_with('}') {
            return Ok((rest, expression));
        }
    }

    let (input, _) = ws(input)?;
    let start = position(full, input);
    let (rest, text) =
        context("enum member value", |i: &'a str| take_until_top_level(i, b",}")).parse(input)?;
    let text = text.trim_end();
    if text.is_empty() {
        return Err(expected_at(input, "enum member value"));
    }

    Ok((
        rest,
        Expression {
            kind: ExpressionKind::Unsupported(text.to_string()),
            span: Span::new(start, start + text.len()),
        },
    ))
}

pub fn constant_expression<'a>(full: &'a str, input: &'a str) -> PResult<'a, Expression> {
    binary_expression(full, input, 0)
}

/// Precedence climbing over left-associative binary operators
fn binary_expression<'a>(full: &'a str, input: &'a str, min_precedence: u8) -> PResult<'a, Expression> {
    let (mut input, mut left) = unary_expression(full, input)?;
    loop {
        let (rest, _) = ws(input)?;
        let Some((operator, len)) = peek_binary_operator(rest) else {
            break;
        };
        let precedence = operator.precedence();
        if precedence < min_precedence {
            break;
        }

        let (rest, right) = binary_expression(full, &rest[len..], precedence + 1)?;
        let span = Span::new(left.span.start, right.span.end);
        left = Expression {
            kind: ExpressionKind::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        };
        input = rest;
    }
    Ok((input, left))
}

fn peek_binary_operator(input: &str) -> Option<(BinaryOperator, usize)> {
    // logical operators never fold to an integer
    if input.starts_with("&&") || input.starts_with("||") {
        return None;
    }
    let (symbol, operator) = BINARY_OPERATORS
        .iter()
        .find(|(symbol, _)| input.starts_with(symbol))?;
    // compound assignment
    if input[symbol.len()..].starts_with('=') {
        return None;
    }
    Some((*operator, symbol.len()))
}

fn unary_expression<'a>(full: &'a str, input: &'a str) -> PResult<'a, Expression> {
    let (input, _) = ws(input)?;
    let start = position(full, input);

    let operator = match input.chars().next() {
        Some('+') if !input.starts_with("++") => Some(UnaryOperator::Plus),
        Some('-') if !input.starts_with("--") => Some(UnaryOperator::Minus),
        Some('~') => Some(UnaryOperator::BitwiseNot),
        _ => None,
    };
    if let Some(operator) = operator {
        let (rest, operand) = unary_expression(full, &input[1..])?;
        return Ok((
            rest,
            Expression {
                kind: ExpressionKind::Unary {
                    operator,
                    operand: Box::new(operand),
                },
                span: make_span(full, start, rest),
            },
        ));
    }

    if input.starts_with('(') {
        if let Ok(result) = cast_expression(full, input) {
            return Ok(result);
        }
        let (rest, _) = symbol("(").parse(input)?;
        let (rest, inner) = constant_expression(full, rest)?;
        let (rest, _) = context("')'", symbol(")")).parse(rest)?;
        return Ok((
            rest,
            Expression {
                kind: ExpressionKind::Parenthesized(Box::new(inner)),
                span: make_span(full, start, rest),
            },
        ));
    }

    primary_expression(full, input)
}

/// `(int)-1`, `(Flags)3`, `(byte)(A | B)`.
///
/// A parenthesized named type is only a cast when an operand follows that
/// cannot continue a binary expression; `(A) - B` is a subtraction.
fn cast_expression<'a>(full: &'a str, input: &'a str) -> PResult<'a, Expression> {
    let start = position(full, input);
    let (rest, _) = symbol("(").parse(input)?;
    let (rest, ty) = type_syntax(full, rest)?;
    let (rest, _) = symbol(")").parse(rest)?;

    let (after, _) = ws(rest)?;
    let predefined = matches!(ty.kind, TypeSyntaxKind::Predefined(_));
    let operand_follows = match after.chars().next() {
        Some(c) if c.is_alphanumeric() || matches!(c, '_' | '@' | '(' | '\'' | '~') => true,
        Some('+') | Some('-') => predefined,
        _ => false,
    };
    if !operand_follows {
        return Err(fail_at(input, ErrorKind::Verify));
    }

    let (rest, operand) = unary_expression(full, rest)?;
    Ok((
        rest,
        Expression {
            kind: ExpressionKind::Cast {
                ty,
                operand: Box::new(operand),
            },
            span: make_span(full, start, rest),
        },
    ))
}

fn primary_expression<'a>(full: &'a str, input: &'a str) -> PResult<'a, Expression> {
    let start = position(full, input);

    if input.starts_with('\'') {
        let (rest, value) = context("character literal", character_literal).parse(input)?;
        return Ok((
            rest,
            Expression {
                kind: ExpressionKind::CharacterLiteral(value),
                span: make_span(full, start, rest),
            },
        ));
    }

    if input.starts_with(|c: char| c.is_ascii_digit()) {
        let (rest, text) = context("integer literal", integer_literal).parse(input)?;
        return Ok((
            rest,
            Expression {
                kind: ExpressionKind::IntegerLiteral(text.to_string()),
                span: make_span(full, start, rest),
            },
        ));
    }

    if let Ok((rest, found)) = word(input) {
        if found == "checked" || found == "unchecked" {
            let (rest, _) = symbol("(").parse(rest)?;
            let (rest, inner) = constant_expression(full, rest)?;
            let (rest, _) = context("')'", symbol(")")).parse(rest)?;
            return Ok((
                rest,
                Expression {
                    kind: ExpressionKind::Checked {
                        checked: found == "checked",
                        expression: Box::new(inner),
                    },
                    span: make_span(full, start, rest),
                },
            ));
        }
    }

    name_expression(full, input)
}

/// Decimal, hexadecimal and binary integer literals with `_` separators
/// and an optional `u`/`l` suffix
fn integer_literal(input: &str) -> PResult<'_, &str> {
    let (rest, text) = recognize((
        alt((
            recognize((
                alt((tag("0x"), tag("0X"))),
                take_while1(|c: char| c.is_ascii_hexdigit() || c == '_'),
            )),
            recognize((
                alt((tag("0b"), tag("0B"))),
                take_while1(|c: char| c == '0' || c == '1' || c == '_'),
            )),
            recognize((digit1, take_while(|c: char| c.is_ascii_digit() || c == '_'))),
        )),
        take_while(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L')),
    ))
    .parse(input)?;

    // `1.5`, `1e3` and `2f` are real literals
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '.') {
        return Err(fail_at(input, ErrorKind::Digit));
    }
    Ok((rest, text))
}

fn character_literal(input: &str) -> PResult<'_, char> {
    let invalid = || fail_at(input, ErrorKind::Char);
    let body = input.strip_prefix('\'').ok_or_else(invalid)?;

    let (value, consumed) = match body.chars().next() {
        Some('\\') => {
            let (value, len) = escape_sequence(&body[1..]).ok_or_else(invalid)?;
            (value, len + 1)
        }
        Some(c) if c != '\'' && c != '\n' => (c, c.len_utf8()),
        _ => return Err(invalid()),
    };

    let rest = body[consumed..].strip_prefix('\'').ok_or_else(invalid)?;
    Ok((rest, value))
}

/// The character an escape sequence (after its `\`) denotes, and its length
fn escape_sequence(text: &str) -> Option<(char, usize)> {
    let first = text.chars().next()?;
    let simple = match first {
        '\'' => Some('\''),
        '"' => Some('"'),
        '\\' => Some('\\'),
        '0' => Some('\0'),
        'a' => Some('\u{7}'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{b}'),
        _ => None,
    };
    if let Some(c) = simple {
        return Some((c, 1));
    }

    let (min, max) = match first {
        'x' => (1, 4),
        'u' => (4, 4),
        'U' => (8, 8),
        _ => return None,
    };
    let digits = text[1..]
        .chars()
        .take(max)
        .take_while(|c| c.is_ascii_hexdigit())
        .count();
    if digits < min {
        return None;
    }
    let code = u32::from_str_radix(&text[1..1 + digits], 16).ok()?;
    Some((char::from_u32(code)?, 1 + digits))
}

/// `Member`, `Enum.Member`, `global::Ns.Enum.Member`, `int.MaxValue`
fn name_expression<'a>(full: &'a str, input: &'a str) -> PResult<'a, Expression> {
    let start = position(full, input);
    let (mut input, first) = match identifier(full, input) {
        Ok(result) => result,
        Err(_) => {
            let (rest, found) = word(input).map_err(|_| expected_at(input, "constant expression"))?;
            if !is_predefined_type(found) {
                return Err(expected_at(input, "constant expression"));
            }
            (rest, Identifier::new(found, make_span(full, start, rest)))
        }
    };

    let mut segments = vec![first];
    let (rest, _) = ws(input)?;
    if let Some(after) = rest.strip_prefix("::") {
        // the alias names a namespace root, not a segment of the member path
        let (after, segment) = context("a name", |i: &'a str| identifier(full, i)).parse(after)?;
        segments = vec![segment];
        input = after;
    }

    loop {
        let (rest, _) = ws(input)?;
        let Some(after) = rest.strip_prefix('.') else {
            break;
        };
        let (after, segment) = context("member name", |i: &'a str| identifier(full, i)).parse(after)?;
        segments.push(segment);
        input = after;
    }

    Ok((
        input,
        Expression {
            kind: ExpressionKind::Name(segments),
            span: make_span(full, start, input),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Expression {
        let (rest, expression) = constant_expression(source, source).unwrap();
        assert!(rest.trim().is_empty(), "unparsed input: {rest:?}");
        expression
    }

    #[test]
    fn test_precedence_and_associativity() {
        let expression = parse("1 << 2 | 4 - 1 - 1 * 2");
        let ExpressionKind::Binary { operator, left, .. } = &expression.kind else {
            panic!("expected a binary expression");
        };
        assert_eq!(*operator, BinaryOperator::BitwiseOr);
        assert!(matches!(
            left.kind,
            ExpressionKind::Binary {
                operator: BinaryOperator::ShiftLeft,
                ..
            }
        ));
        assert_eq!(expression.to_string(), "1 << 2 | 4 - 1 - 1 * 2");
    }

    #[test]
    fn test_literals() {
        for source in ["0x_FF", "0b1010", "1_000", "10UL", "42u"] {
            assert_eq!(
                parse(source).kind,
                ExpressionKind::IntegerLiteral(source.to_string())
            );
        }
        assert_eq!(parse("'A'").kind, ExpressionKind::CharacterLiteral('A'));
        assert_eq!(parse(r"'\n'").kind, ExpressionKind::CharacterLiteral('\n'));
        assert_eq!(parse(r"'A'").kind, ExpressionKind::CharacterLiteral('A'));
        assert_eq!(parse(r"'\''").kind, ExpressionKind::CharacterLiteral('\''));
    }

    #[test]
    fn test_casts_and_parentheses() {
        assert!(matches!(parse("(int)-1").kind, ExpressionKind::Cast { .. }));
        assert!(matches!(parse("(Flags)3").kind, ExpressionKind::Cast { .. }));
        assert!(matches!(
            parse("(A) - B").kind,
            ExpressionKind::Binary {
                operator: BinaryOperator::Subtract,
                ..
            }
        ));
        assert!(matches!(
            parse("unchecked((int)0x80000000)").kind,
            ExpressionKind::Checked { checked: false, .. }
        ));
    }

    #[test]
    fn test_names() {
        let ExpressionKind::Name(segments) = parse("int.MaxValue").kind else {
            panic!("expected a name");
        };
        assert_eq!(segments.len(), 2);

        let ExpressionKind::Name(segments) = parse("global::Game.Access.Read").kind else {
            panic!("expected a name");
        };
        let names: Vec<_> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(names, vec!["Game", "Access", "Read"]);
    }

    #[test]
    fn test_unsupported_initializer_is_kept_verbatim() {
        let source = "nameof(Other).Length, B }";
        let (rest, expression) = initializer_expression(source, source).unwrap();
        assert_eq!(rest, ", B }");
        assert_eq!(
            expression.kind,
            ExpressionKind::Unsupported("nameof(Other).Length".to_string())
        );
        assert_eq!(expression.span, Span::new(0, 20));
    }

    #[test]
    fn test_real_literal_is_unsupported() {
        let source = "1.5 }";
        let (_, expression) = initializer_expression(source, source).unwrap();
        assert!(matches!(expression.kind, ExpressionKind::Unsupported(_)));
    }
}
