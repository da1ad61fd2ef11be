//! Declarations: namespaces, using directives, types, enums and members

use nom::{
    combinator::{eof, opt},
    error::context,
    Parser,
};

use crate::cs_ast::*;
use crate::cs_parser::{identifier, is_keyword, keyword, make_span, peek_word, position, symbol, word, ws, PResult};
use crate::cs_parser_expr::initializer_expression;
use crate::cs_parser_types::{type_argument_list, type_parameter_list, type_syntax};
use crate::cs_skip::{braced_block, bracketed, parenthesized, split_top_level_commas, take_until_top_level};
use crate::syntax_error::expected_at;

/// Attributes and modifiers shared by every member kind
struct DeclarationHeader {
    start: usize,
    attributes: Vec<AttributeList>,
    modifiers: Vec<Modifier>,
}

/// Name of a typed member: `Name`, `Name<T>` or `IFace<T>.Name`
struct MemberName {
    explicit_interface: Option<String>,
    identifier: Identifier,
    type_parameters: Option<TypeParameterList>,
}

// =============================================================================
// Namespaces and using directives
// =============================================================================

/// Parse members until end of input or an unmatched `}`.
///
/// `container` is the name of the enclosing type, used to recognise
/// constructors; `None` at namespace level.
pub fn members_until<'a>(
    full: &'a str,
    input: &'a str,
    container: Option<&str>,
) -> PResult<'a, Vec<MemberDeclaration>> {
    let mut members = Vec::new();
    let mut input = input;
    loop {
        let (rest, _) = ws(input)?;
        if rest.is_empty() || rest.starts_with('}') {
            return Ok((rest, members));
        }
        // a stray `;` after a type body is legal
        if let Some(rest) = rest.strip_prefix(';') {
            input = rest;
            continue;
        }

        let (rest, member) = member_declaration(full, rest, container)?;
        members.push(member);
        input = rest;
    }
}

/// `using A.B;`, `global using static A.B;`, `using Alias = A.B<int>;`
pub fn using_directives<'a>(full: &'a str, input: &'a str) -> PResult<'a, Vec<UsingDirective>> {
    let mut usings = Vec::new();
    let mut input = input;
    loop {
        let (rest, _) = ws(input)?;
        let start = position(full, rest);

        let (after, is_global) = match keyword("global").parse(rest) {
            Ok((after, _)) => (after, true),
            Err(_) => (rest, false),
        };
        let Ok((after, _)) = keyword("using").parse(after) else {
            return Ok((rest, usings));
        };
        let (after, is_static) = match keyword("static").parse(after) {
            Ok((after, _)) => (after, true),
            Err(_) => (after, false),
        };
        let (after, alias) = match identifier(full, after) {
            Ok((candidate, name)) => match symbol("=").parse(candidate) {
                Ok((candidate, _)) => (candidate, Some(name)),
                Err(_) => (after, None),
            },
            Err(_) => (after, None),
        };

        let (after, _) = ws(after)?;
        let (after, name) =
            context("using directive", |i: &'a str| take_until_top_level(i, b";")).parse(after)?;
        let (after, _) = symbol(";").parse(after)?;

        usings.push(UsingDirective {
            is_global,
            is_static,
            alias,
            name: name.trim().to_string(),
            span: make_span(full, start, after),
        });
        input = after;
    }
}

fn namespace_declaration<'a>(full: &'a str, input: &'a str, start: usize) -> PResult<'a, MemberDeclaration> {
    let (input, _) = keyword("namespace").parse(input)?;
    let (input, name) = context("namespace name", |i: &'a str| qualified_name(full, i)).parse(input)?;
    let (input, _) = ws(input)?;

    if let Some(rest) = input.strip_prefix(';') {
        // file scoped: everything up to the end of the file belongs to it
        let (rest, usings) = using_directives(full, rest)?;
        let (rest, members) = members_until(full, rest, None)?;
        let (rest, _) = context("a declaration", eof).parse(rest)?;
        return Ok((
            rest,
            MemberDeclaration::Namespace(NamespaceDeclaration {
                name,
                file_scoped: true,
                usings,
                members,
                span: make_span(full, start, rest),
            }),
        ));
    }

    let (input, _) = context("'{' or ';' after the namespace name", symbol("{")).parse(input)?;
    let (input, usings) = using_directives(full, input)?;
    let (input, members) = members_until(full, input, None)?;
    let (input, _) = context("'}' closing the namespace", symbol("}")).parse(input)?;
    let (input, _) = opt(symbol(";")).parse(input)?;

    Ok((
        input,
        MemberDeclaration::Namespace(NamespaceDeclaration {
            name,
            file_scoped: false,
            usings,
            members,
            span: make_span(full, start, input),
        }),
    ))
}

/// `Game.Systems.Movement`
pub fn qualified_name<'a>(full: &'a str, input: &'a str) -> PResult<'a, QualifiedName> {
    let (input, first) = identifier(full, input)?;
    let start = first.span.start;
    let mut segments = vec![first];
    let mut input = input;
    loop {
        let (rest, _) = ws(input)?;
        let Some(rest) = rest.strip_prefix('.') else {
            break;
        };
        let (rest, segment) = identifier(full, rest)?;
        segments.push(segment);
        input = rest;
    }

    let end = segments.last().map_or(start, |s| s.span.end);
    Ok((
        input,
        QualifiedName {
            segments,
            span: Span::new(start, end),
        },
    ))
}

// =============================================================================
// Attributes and modifiers
// =============================================================================

/// Zero or more `[...]` attribute lists; contents are kept as raw text
pub fn attribute_lists<'a>(full: &'a str, input: &'a str) -> PResult<'a, Vec<AttributeList>> {
    let mut lists = Vec::new();
    let mut input = input;
    loop {
        let (rest, _) = ws(input)?;
        if !rest.starts_with('[') {
            return Ok((rest, lists));
        }
        let start = position(full, rest);
        let (after, text) = context("attribute list", bracketed).parse(rest)?;
        lists.push(AttributeList {
            text: text.to_string(),
            span: make_span(full, start, after),
        });
        input = after;
    }
}

pub fn modifiers<'a>(full: &'a str, input: &'a str) -> PResult<'a, Vec<Modifier>> {
    let mut found = Vec::new();
    let mut input = input;
    loop {
        let (rest, _) = ws(input)?;
        let start = position(full, rest);
        let Ok((after, text)) = word(rest) else {
            return Ok((rest, found));
        };
        let Some(kind) = ModifierKind::from_keyword(text) else {
            return Ok((rest, found));
        };
        // contextual modifiers are plain identifiers unless a word follows
        let contextual = matches!(
            kind,
            ModifierKind::Partial | ModifierKind::File | ModifierKind::Required | ModifierKind::Async
        );
        if contextual && peek_word(after).is_none() {
            return Ok((rest, found));
        }

        found.push(Modifier {
            kind,
            span: make_span(full, start, after),
        });
        input = after;
    }
}

// =============================================================================
// Members
// =============================================================================

/// Any declaration that can appear in a namespace or type body
pub fn member_declaration<'a>(
    full: &'a str,
    input: &'a str,
    container: Option<&str>,
) -> PResult<'a, MemberDeclaration> {
    let (input, _) = ws(input)?;
    let start = position(full, input);
    let (input, attributes) = attribute_lists(full, input)?;
    let (input, modifiers) = modifiers(full, input)?;
    let header = DeclarationHeader {
        start,
        attributes,
        modifiers,
    };

    let (input, _) = ws(input)?;
    match peek_word(input) {
        Some("namespace") => namespace_declaration(full, input, start),
        Some("class") | Some("struct") | Some("interface") | Some("record") => {
            type_declaration(full, input, header)
        }
        Some("enum") => enum_declaration(full, input, header),
        Some("delegate") => skip_member(full, input, start, OtherMemberKind::Delegate),
        Some("event") => skip_member(full, input, start, OtherMemberKind::Event),
        Some("implicit") | Some("explicit") => {
            let (rest, _) = take_until_top_level(input, b"(")?;
            let (rest, _) = parenthesized(rest)?;
            skip_member(full, rest, start, OtherMemberKind::Conversion)
        }
        _ if input.starts_with('~') => {
            let (rest, _) = context("destructor", |i: &'a str| take_until_top_level(i, b"(")).parse(input)?;
            let (rest, _) = parenthesized(rest)?;
            skip_member(full, rest, start, OtherMemberKind::Destructor)
        }
        _ => {
            if let Some(rest) = constructor_start(full, input, container) {
                let (rest, _) = parenthesized(rest)?;
                return skip_member(full, rest, start, OtherMemberKind::Constructor);
            }
            typed_member(full, input, header)
        }
    }
}

/// Input at the parameter list when `input` starts a constructor of `container`
fn constructor_start<'a>(full: &'a str, input: &'a str, container: Option<&str>) -> Option<&'a str> {
    let container = container?;
    let (rest, name) = identifier(full, input).ok()?;
    if name.value_text() != container {
        return None;
    }
    let (rest, _) = ws(rest).ok()?;
    rest.starts_with('(').then_some(rest)
}

/// Skip to the end of a member the generators never inspect
fn skip_member<'a>(
    full: &'a str,
    input: &'a str,
    start: usize,
    kind: OtherMemberKind,
) -> PResult<'a, MemberDeclaration> {
    let (input, _) =
        context("member declaration", |i: &'a str| take_until_top_level(i, b"{;=")).parse(input)?;
    let (input, _) = ws(input)?;

    let input = if input.starts_with('=') && !input.starts_with("=>") {
        // event field initializer
        let (rest, _) = context("';'", |i: &'a str| take_until_top_level(i, b";")).parse(&input[1..])?;
        &rest[1..]
    } else {
        member_body(input)?.0
    };

    Ok((
        input,
        MemberDeclaration::Other(OtherMember {
            kind,
            span: make_span(full, start, input),
        }),
    ))
}

/// `{ ... }`, `=> expression;` or `;`. Returns whether a body was present.
fn member_body<'a>(input: &'a str) -> PResult<'a, bool> {
    let (input, _) = ws(input)?;
    if input.starts_with('{') {
        let (rest, _) = braced_block(input)?;
        return Ok((rest, true));
    }
    if let Some(rest) = input.strip_prefix("=>") {
        let (rest, _) =
            context("';' after the expression body", |i: &'a str| take_until_top_level(i, b";")).parse(rest)?;
        return Ok((&rest[1..], true));
    }
    let (rest, _) = context("member body or ';'", symbol(";")).parse(input)?;
    Ok((rest, false))
}

/// Fields, properties, methods, operators and indexers: all start with a type
fn typed_member<'a>(full: &'a str, input: &'a str, header: DeclarationHeader) -> PResult<'a, MemberDeclaration> {
    let (input, ty) = context("a member declaration", |i: &'a str| type_syntax(full, i)).parse(input)?;

    if let Ok((rest, _)) = keyword("operator").parse(input) {
        let (rest, _) = take_until_top_level(rest, b"(")?;
        let (rest, _) = parenthesized(rest)?;
        return skip_member(full, rest, header.start, OtherMemberKind::Operator);
    }
    if let Ok((rest, _)) = keyword("this").parse(input) {
        let (rest, _) = ws(rest)?;
        let (rest, _) = context("indexer parameters", bracketed).parse(rest)?;
        return skip_member(full, rest, header.start, OtherMemberKind::Indexer);
    }

    let (input, name) = context("member name", |i: &'a str| member_name(full, i)).parse(input)?;
    let (input, _) = ws(input)?;
    if input.starts_with('(') {
        method_declaration(full, input, header, ty, name)
    } else if input.starts_with('{') || input.starts_with("=>") {
        property_declaration(full, input, header, ty, name)
    } else {
        field_declaration(full, input, header, ty, name)
    }
}

fn member_name<'a>(full: &'a str, input: &'a str) -> PResult<'a, MemberName> {
    let mut qualifier: Vec<&str> = Vec::new();
    let mut input = input;
    loop {
        let (segment_start, _) = ws(input)?;
        let (rest, name) = identifier(full, segment_start)?;

        let (mut after, _) = ws(rest)?;
        let mut type_parameters = None;
        if after.starts_with('<') {
            match type_parameter_list(full, after) {
                Ok((rest, parameters)) => {
                    after = rest;
                    type_parameters = parameters;
                }
                Err(_) => after = type_argument_list(full, after)?.0,
            }
        }

        let (peeked, _) = ws(after)?;
        if let Some(next) = peeked.strip_prefix('.') {
            qualifier.push(segment_start[..segment_start.len() - after.len()].trim_end());
            input = next;
            continue;
        }

        let explicit_interface = (!qualifier.is_empty()).then(|| qualifier.join("."));
        return Ok((
            after,
            MemberName {
                explicit_interface,
                identifier: name,
                type_parameters,
            },
        ));
    }
}

fn method_declaration<'a>(
    full: &'a str,
    input: &'a str,
    header: DeclarationHeader,
    return_type: TypeSyntax,
    name: MemberName,
) -> PResult<'a, MemberDeclaration> {
    let (input, parameters) = context("parameter list", parenthesized).parse(input)?;
    let parameter_count = split_top_level_commas(&parameters[1..parameters.len() - 1]).len();
    let (input, _) = constraint_clauses(input)?;
    let (input, has_body) = member_body(input)?;

    Ok((
        input,
        MemberDeclaration::Method(MethodDeclaration {
            attributes: header.attributes,
            modifiers: header.modifiers,
            return_type,
            explicit_interface: name.explicit_interface,
            identifier: name.identifier,
            type_parameters: name.type_parameters,
            parameter_count,
            has_body,
            span: make_span(full, header.start, input),
        }),
    ))
}

fn property_declaration<'a>(
    full: &'a str,
    input: &'a str,
    header: DeclarationHeader,
    ty: TypeSyntax,
    name: MemberName,
) -> PResult<'a, MemberDeclaration> {
    let (input, is_auto) = if input.starts_with('{') {
        let (rest, accessors) = braced_block(input)?;
        let inner = &accessors[1..accessors.len() - 1];
        let is_auto = !inner.contains('{')
            && !inner.contains("=>")
            && !header.modifiers.has_modifier(ModifierKind::Abstract)
            && !header.modifiers.has_modifier(ModifierKind::Extern);

        // `{ get; set; } = initial;`
        let (rest, _) = ws(rest)?;
        let rest = if rest.starts_with('=') && !rest.starts_with("=>") {
            let (rest, _) = context("';' after the property initializer", |i: &'a str| {
                take_until_top_level(i, b";")
            })
            .parse(&rest[1..])?;
            &rest[1..]
        } else {
            rest
        };
        (rest, is_auto)
    } else {
        (member_body(input)?.0, false)
    };

    Ok((
        input,
        MemberDeclaration::Property(PropertyDeclaration {
            attributes: header.attributes,
            modifiers: header.modifiers,
            ty,
            explicit_interface: name.explicit_interface,
            identifier: name.identifier,
            is_auto,
            span: make_span(full, header.start, input),
        }),
    ))
}

fn field_declaration<'a>(
    full: &'a str,
    input: &'a str,
    header: DeclarationHeader,
    ty: TypeSyntax,
    name: MemberName,
) -> PResult<'a, MemberDeclaration> {
    let mut declarators = Vec::new();
    let mut declarator_name = name.identifier;
    let mut input = input;
    loop {
        let declarator_start = declarator_name.span.start;
        let (rest, _) = ws(input)?;
        // fixed size buffer: `fixed byte data[16];`
        let rest = if rest.starts_with('[') { bracketed(rest)?.0 } else { rest };
        let (rest, _) = ws(rest)?;

        let (rest, initializer) = if rest.starts_with('=') {
            let (rest, span) = variable_initializer(full, &rest[1..])?;
            (rest, Some(span))
        } else {
            (rest, None)
        };
        let declarator_end = initializer.map_or(declarator_name.span.end, |span| span.end);
        declarators.push(VariableDeclarator {
            identifier: declarator_name,
            initializer,
            span: Span::new(declarator_start, declarator_end),
        });

        let (rest, _) = ws(rest)?;
        if let Some(rest) = rest.strip_prefix(',') {
            let (rest, next) = context("variable name", |i: &'a str| identifier(full, i)).parse(rest)?;
            declarator_name = next;
            input = rest;
            continue;
        }

        let (rest, _) = context("';' after the field declaration", symbol(";")).parse(rest)?;
        return Ok((
            rest,
            MemberDeclaration::Field(FieldDeclaration {
                attributes: header.attributes,
                modifiers: header.modifiers,
                ty,
                declarators,
                span: make_span(full, header.start, rest),
            }),
        ));
    }
}

/// Skip a field initializer, up to the `,` that starts the next declarator
/// or the closing `;`. Returns the trimmed initializer span.
fn variable_initializer<'a>(full: &'a str, input: &'a str) -> PResult<'a, Span> {
    let (input, _) = ws(input)?;
    let start = position(full, input);
    let mut cursor = input;
    loop {
        let (rest, _) =
            context("field initializer", |i: &'a str| take_until_top_level(i, b",;")).parse(cursor)?;
        // `new Dictionary<int, string>()` has a comma that is not a separator
        if rest.starts_with(',') && !starts_declarator(&rest[1..]) {
            cursor = &rest[1..];
            continue;
        }

        let skipped = &input[..input.len() - rest.len()];
        if skipped.trim().is_empty() {
            return Err(expected_at(input, "field initializer"));
        }
        return Ok((rest, Span::new(start, start + skipped.trim_end().len())));
    }
}

/// Whether `input` looks like `name =`, `name,` or `name;`
fn starts_declarator(input: &str) -> bool {
    let Ok((rest, _)) = ws(input) else {
        return false;
    };
    let rest = rest.strip_prefix('@').unwrap_or(rest);
    let Ok((rest, name)) = word(rest) else {
        return false;
    };
    if is_keyword(name) {
        return false;
    }
    let Ok((rest, _)) = ws(rest) else {
        return false;
    };
    rest.starts_with(';')
        || rest.starts_with(',')
        || (rest.starts_with('=') && !rest.starts_with("==") && !rest.starts_with("=>"))
}

/// `where T : struct, IComparable<T>` clauses, skipped
fn constraint_clauses<'a>(input: &'a str) -> PResult<'a, ()> {
    match keyword("where").parse(input) {
        Ok((rest, _)) => {
            let (rest, _) = context("type parameter constraints", |i: &'a str| {
                take_until_top_level(i, b"{;=")
            })
            .parse(rest)?;
            Ok((rest, ()))
        }
        Err(_) => Ok((input, ())),
    }
}

// =============================================================================
// Types and enums
// =============================================================================

fn type_keyword<'a>(input: &'a str) -> PResult<'a, TypeDeclarationKind> {
    let (input, _) = ws(input)?;
    let (rest, found) = word(input)?;
    let kind = match found {
        "class" => TypeDeclarationKind::Class,
        "struct" => TypeDeclarationKind::Struct,
        "interface" => TypeDeclarationKind::Interface,
        "record" => {
            if let Ok((rest, _)) = keyword("struct").parse(rest) {
                return Ok((rest, TypeDeclarationKind::RecordStruct));
            }
            if let Ok((rest, _)) = keyword("class").parse(rest) {
                return Ok((rest, TypeDeclarationKind::RecordClass));
            }
            TypeDeclarationKind::RecordClass
        }
        _ => return Err(expected_at(input, "a type declaration")),
    };
    Ok((rest, kind))
}

fn type_declaration<'a>(full: &'a str, input: &'a str, header: DeclarationHeader) -> PResult<'a, MemberDeclaration> {
    let (input, kind) = type_keyword(input)?;
    let (input, name) = context("type name", |i: &'a str| identifier(full, i)).parse(input)?;
    let (input, type_parameters) = type_parameter_list(full, input)?;

    let (input, _) = ws(input)?;
    let (input, primary_constructor) = if input.starts_with('(') {
        let (rest, parameters) = parenthesized(input)?;
        let count = split_top_level_commas(&parameters[1..parameters.len() - 1]).len();
        (rest, Some(count))
    } else {
        (input, None)
    };

    let (input, base_list) = base_list(full, input)?;
    let (input, _) = constraint_clauses(input)?;

    let (input, _) = ws(input)?;
    let (input, members) = if let Some(rest) = input.strip_prefix(';') {
        (rest, Vec::new())
    } else {
        let (input, _) = context("'{' opening the type body", symbol("{")).parse(input)?;
        let (input, members) = members_until(full, input, Some(name.value_text()))?;
        let (input, _) = context("'}' closing the type body", symbol("}")).parse(input)?;
        (input, members)
    };

    Ok((
        input,
        MemberDeclaration::Type(TypeDeclaration {
            attributes: header.attributes,
            modifiers: header.modifiers,
            kind,
            identifier: name,
            type_parameters,
            primary_constructor,
            base_list,
            members,
            span: make_span(full, header.start, input),
        }),
    ))
}

/// `: Base<T>, IFace`; record bases may carry an argument list
fn base_list<'a>(full: &'a str, input: &'a str) -> PResult<'a, Vec<TypeSyntax>> {
    let (input, _) = ws(input)?;
    let Some(mut input) = input.strip_prefix(':') else {
        return Ok((input, Vec::new()));
    };

    let mut bases = Vec::new();
    loop {
        let (rest, base) = context("base type", |i: &'a str| type_syntax(full, i)).parse(input)?;
        bases.push(base);

        let (rest, _) = ws(rest)?;
        let rest = if rest.starts_with('(') { parenthesized(rest)?.0 } else { rest };
        let (rest, _) = ws(rest)?;
        match rest.strip_prefix(',') {
            Some(rest) => input = rest,
            None => return Ok((rest, bases)),
        }
    }
}

fn enum_declaration<'a>(full: &'a str, input: &'a str, header: DeclarationHeader) -> PResult<'a, MemberDeclaration> {
    let (input, _) = keyword("enum").parse(input)?;
    let (input, name) = context("enum name", |i: &'a str| identifier(full, i)).parse(input)?;

    let (input, _) = ws(input)?;
    let (input, base_type) = match input.strip_prefix(':') {
        Some(rest) => {
            let (rest, ty) = context("underlying enum type", |i: &'a str| type_syntax(full, i)).parse(rest)?;
            (rest, Some(ty))
        }
        None => (input, None),
    };

    let (mut input, _) = context("'{' opening the enum body", symbol("{")).parse(input)?;
    let mut members = Vec::new();
    loop {
        let (rest, _) = ws(input)?;
        if let Some(rest) = rest.strip_prefix('}') {
            input = rest;
            break;
        }

        let (rest, member) = context("enum member", |i: &'a str| enum_member(full, i)).parse(rest)?;
        members.push(member);

        let (rest, _) = ws(rest)?;
        if let Some(rest) = rest.strip_prefix(',') {
            input = rest;
            continue;
        }
        let (rest, _) = context("',' or '}' after the enum member", symbol("}")).parse(rest)?;
        input = rest;
        break;
    }
    let (input, _) = opt(symbol(";")).parse(input)?;

    Ok((
        input,
        MemberDeclaration::Enum(EnumDeclaration {
            attributes: header.attributes,
            modifiers: header.modifiers,
            identifier: name,
            base_type,
            members,
            span: make_span(full, header.start, input),
        }),
    ))
}

fn enum_member<'a>(full: &'a str, input: &'a str) -> PResult<'a, EnumMemberDeclaration> {
    let (input, _) = ws(input)?;
    let start = position(full, input);
    let (input, attributes) = attribute_lists(full, input)?;
    let (input, name) = identifier(full, input)?;

    let (peeked, _) = ws(input)?;
    let (input, initializer) = match peeked.strip_prefix('=') {
        Some(rest) => {
            let (rest, value) = initializer_expression(full, rest)?;
            (rest, Some(value))
        }
        None => (input, None),
    };

    Ok((
        input,
        EnumMemberDeclaration {
            attributes,
            identifier: name,
            initializer,
            span: make_span(full, start, input),
        },
    ))
}
