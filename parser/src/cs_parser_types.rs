//! Type syntax: named and predefined types, type arguments, type parameters

use nom::{error::context, Parser};

use crate::cs_ast::*;
use crate::cs_parser::{identifier, keyword, make_span, position, symbol, word, ws, PResult};
use crate::cs_parser_decls::attribute_lists;
use crate::syntax_error::expected_at;

/// Keywords that name built-in types
pub fn is_predefined_type(s: &str) -> bool {
    matches!(
        s,
        "bool" | "byte" | "sbyte" | "char" | "decimal" | "double" | "float" | "int" | "uint"
            | "long" | "ulong" | "short" | "ushort" | "object" | "string" | "void"
            | "nint" | "nuint"
    )
}

/// Parse a type with its `?`, `*` and `[]` suffixes
pub fn type_syntax<'a>(full: &'a str, input: &'a str) -> PResult<'a, TypeSyntax> {
    let (input, _) = ws(input)?;
    let start = position(full, input);

    let (mut input, mut ty) = if input.starts_with('(') {
        tuple_type(full, input)?
    } else {
        match predefined_type(full, input) {
            Ok(result) => result,
            Err(_) => named_type(full, input)?,
        }
    };

    loop {
        let (rest, _) = ws(input)?;
        let (after, kind) = if let Some(after) = rest.strip_prefix('?') {
            (after, TypeSyntaxKind::Nullable(Box::new(ty)))
        } else if let Some(after) = rest.strip_prefix('*') {
            (after, TypeSyntaxKind::Pointer(Box::new(ty)))
        } else if let Some((after, rank)) = array_rank(rest) {
            (
                after,
                TypeSyntaxKind::Array {
                    element: Box::new(ty),
                    rank,
                },
            )
        } else {
            return Ok((input, ty));
        };

        ty = TypeSyntax {
            kind,
            span: make_span(full, start, after),
        };
        input = after;
    }
}

/// `[]`, `[,]` ... Returns the remaining input and the rank.
fn array_rank(input: &str) -> Option<(&str, usize)> {
    let body = input.strip_prefix('[')?;
    let mut rank = 1;
    for (i, c) in body.char_indices() {
        match c {
            ',' => rank += 1,
            ']' => return Some((&body[i + 1..], rank)),
            c if c.is_whitespace() => {}
            _ => return None,
        }
    }
    None
}

fn predefined_type<'a>(full: &'a str, input: &'a str) -> PResult<'a, TypeSyntax> {
    let start = position(full, input);
    let (rest, name) = word(input)?;
    if !is_predefined_type(name) {
        return Err(expected_at(input, "a type"));
    }

    Ok((
        rest,
        TypeSyntax {
            kind: TypeSyntaxKind::Predefined(name.to_string()),
            span: make_span(full, start, rest),
        },
    ))
}

/// `Name`, `Outer.Inner<T>`, `global::System.Int32`
pub fn named_type<'a>(full: &'a str, input: &'a str) -> PResult<'a, TypeSyntax> {
    let (input, _) = ws(input)?;
    let start = position(full, input);
    let (mut input, mut current) = context("a type", |i: &'a str| identifier(full, i)).parse(input)?;

    let mut alias = None;
    let (rest, _) = ws(input)?;
    if let Some(after) = rest.strip_prefix("::") {
        let (after, name) = context("a type", |i: &'a str| identifier(full, i)).parse(after)?;
        alias = Some(current);
        current = name;
        input = after;
    }

    let mut segments = Vec::new();
    loop {
        let (after_args, type_arguments) = optional_type_arguments(full, input)?;
        segments.push(NameSegment {
            identifier: current,
            type_arguments,
        });

        let (rest, _) = ws(after_args)?;
        let next = rest
            .strip_prefix('.')
            .and_then(|after| identifier(full, after).ok());
        match next {
            Some((after, name)) => {
                current = name;
                input = after;
            }
            None => {
                return Ok((
                    after_args,
                    TypeSyntax {
                        kind: TypeSyntaxKind::Named(TypeName { alias, segments }),
                        span: make_span(full, start, after_args),
                    },
                ));
            }
        }
    }
}

/// Type arguments when the next token opens a well-formed `<...>` list;
/// otherwise no arguments and nothing consumed.
fn optional_type_arguments<'a>(full: &'a str, input: &'a str) -> PResult<'a, Vec<TypeSyntax>> {
    let (peeked, _) = ws(input)?;
    if !peeked.starts_with('<') {
        return Ok((input, Vec::new()));
    }
    match type_argument_list(full, peeked) {
        Ok(result) => Ok(result),
        Err(_) => Ok((input, Vec::new())),
    }
}

/// `<int, List<string>>`
pub fn type_argument_list<'a>(full: &'a str, input: &'a str) -> PResult<'a, Vec<TypeSyntax>> {
    let (mut input, _) = symbol("<").parse(input)?;
    let mut arguments = Vec::new();
    loop {
        let (rest, argument) = type_syntax(full, input)?;
        arguments.push(argument);

        let (rest, _) = ws(rest)?;
        if let Some(rest) = rest.strip_prefix(',') {
            input = rest;
            continue;
        }
        let (rest, _) = context("'>' closing the type argument list", symbol(">")).parse(rest)?;
        return Ok((rest, arguments));
    }
}

/// `(int Count, string Name)`; at least two elements
fn tuple_type<'a>(full: &'a str, input: &'a str) -> PResult<'a, TypeSyntax> {
    let start = position(full, input);
    let (mut input, _) = symbol("(").parse(input)?;
    let mut elements = Vec::new();
    loop {
        let (rest, element) = type_syntax(full, input)?;
        let rest = match identifier(full, rest) {
            Ok((rest, _name)) => rest,
            Err(_) => rest,
        };
        elements.push(element);

        let (rest, _) = ws(rest)?;
        if let Some(rest) = rest.strip_prefix(',') {
            input = rest;
            continue;
        }
        let (rest, _) = context("')' closing the tuple type", symbol(")")).parse(rest)?;
        if elements.len() < 2 {
            return Err(expected_at(input, "a tuple type"));
        }
        return Ok((
            rest,
            TypeSyntax {
                kind: TypeSyntaxKind::Tuple(elements),
                span: make_span(full, start, rest),
            },
        ));
    }
}

/// Declared type parameters: `<TKey, [Marker] out TValue>`
pub fn type_parameter_list<'a>(
    full: &'a str,
    input: &'a str,
) -> PResult<'a, Option<TypeParameterList>> {
    let (input, _) = ws(input)?;
    if !input.starts_with('<') {
        return Ok((input, None));
    }

    let start = position(full, input);
    let mut input = &input[1..];
    let mut parameters = Vec::new();
    loop {
        let (rest, _attributes) = attribute_lists(full, input)?;
        let (rest, variance) = if let Ok((rest, _)) = keyword("in").parse(rest) {
            (rest, Some(Variance::In))
        } else if let Ok((rest, _)) = keyword("out").parse(rest) {
            (rest, Some(Variance::Out))
        } else {
            (rest, None)
        };
        let (rest, name) = context("type parameter", |i: &'a str| identifier(full, i)).parse(rest)?;
        parameters.push(TypeParameter {
            variance,
            identifier: name,
        });

        let (rest, _) = ws(rest)?;
        if let Some(rest) = rest.strip_prefix(',') {
            input = rest;
            continue;
        }
        let (rest, _) =
            context("'>' closing the type parameter list", symbol(">")).parse(rest)?;
        return Ok((
            rest,
            Some(TypeParameterList {
                parameters,
                span: make_span(full, start, rest),
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_type(source: &str) -> TypeSyntax {
        let (rest, ty) = type_syntax(source, source).unwrap();
        assert!(rest.trim().is_empty(), "unparsed input: {rest:?}");
        ty
    }

    #[test]
    fn test_generic_type_round_trips_through_display() {
        for source in [
            "int",
            "List<int>",
            "Dictionary<string, List<Vector3>>",
            "global::Unity.Collections.NativeArray<float>",
            "int?",
            "byte[,]",
            "void*",
            "(int, string)",
        ] {
            assert_eq!(parse_type(source).to_string(), source);
        }
    }

    #[test]
    fn test_nested_generic_closing_brackets() {
        let ty = parse_type("NativeList<NativeArray<int>>");
        let TypeSyntaxKind::Named(name) = &ty.kind else {
            panic!("expected a named type, got {ty:?}");
        };
        assert_eq!(name.segments[0].type_arguments.len(), 1);
        assert_eq!(ty.simple_name(), Some("NativeList"));
    }

    #[test]
    fn test_alias_qualified_type() {
        let ty = parse_type("global::System.Int32");
        let TypeSyntaxKind::Named(name) = &ty.kind else {
            panic!("expected a named type");
        };
        assert_eq!(name.alias.as_ref().map(|a| a.text.as_str()), Some("global"));
        assert_eq!(name.segments.len(), 2);
    }

    #[test]
    fn test_type_parameter_list() {
        let source = "<TKey, [Marker] out TValue> rest";
        let (rest, list) = type_parameter_list(source, source).unwrap();
        let list = list.unwrap();

        assert_eq!(rest, " rest");
        assert_eq!(list.to_string(), "<TKey, out TValue>");
        assert_eq!(list.span, Span::new(0, 27));
    }

    #[test]
    fn test_no_type_parameter_list() {
        let (rest, list) = type_parameter_list("(", "(").unwrap();
        assert!(list.is_none());
        assert_eq!(rest, "(");
    }
}
