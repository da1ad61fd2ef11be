//! Declaration-level C# syntax tree
//!
//! Only the shape the generators look at is modelled: namespaces, type and
//! enum declarations, and the members of a type (fields, properties,
//! methods). Method and accessor bodies are skipped by the parser and only
//! their presence is recorded. Enum initializers keep a full expression
//! tree because their constant value matters.
//!
//! Every node carries a byte `Span` into the text of its file.

use std::fmt;

/// Byte range in the source text (start inclusive, end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// An identifier exactly as written, including a verbatim `@` prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub text: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// The name the identifier binds (`@class` binds `class`)
    pub fn value_text(&self) -> &str {
        self.text.strip_prefix('@').unwrap_or(&self.text)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Dotted name such as a namespace name: `Game.Systems`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub segments: Vec<Identifier>,
    pub span: Span,
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub usings: Vec<UsingDirective>,
    pub members: Vec<MemberDeclaration>,
    pub span: Span,
}

/// `global using static Alias = Some.Name;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirective {
    pub is_global: bool,
    pub is_static: bool,
    pub alias: Option<Identifier>,
    pub name: String,
    pub span: Span,
}

/// Block (`namespace A { }`) or file-scoped (`namespace A;`) namespace
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceDeclaration {
    pub name: QualifiedName,
    pub file_scoped: bool,
    pub usings: Vec<UsingDirective>,
    pub members: Vec<MemberDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberDeclaration {
    Namespace(NamespaceDeclaration),
    Type(TypeDeclaration),
    Enum(EnumDeclaration),
    Field(FieldDeclaration),
    Property(PropertyDeclaration),
    Method(MethodDeclaration),
    Other(OtherMember),
}

impl MemberDeclaration {
    pub fn span(&self) -> Span {
        match self {
            MemberDeclaration::Namespace(n) => n.span,
            MemberDeclaration::Type(t) => t.span,
            MemberDeclaration::Enum(e) => e.span,
            MemberDeclaration::Field(f) => f.span,
            MemberDeclaration::Property(p) => p.span,
            MemberDeclaration::Method(m) => m.span,
            MemberDeclaration::Other(o) => o.span,
        }
    }
}

/// `[Serializable, Flags]`, kept as raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeList {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    Public,
    Internal,
    Protected,
    Private,
    File,
    Static,
    Partial,
    Abstract,
    Sealed,
    Virtual,
    Override,
    Readonly,
    Const,
    New,
    Unsafe,
    Extern,
    Volatile,
    Async,
    Required,
    Ref,
    Fixed,
}

impl ModifierKind {
    pub fn from_keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "public" => ModifierKind::Public,
            "internal" => ModifierKind::Internal,
            "protected" => ModifierKind::Protected,
            "private" => ModifierKind::Private,
            "file" => ModifierKind::File,
            "static" => ModifierKind::Static,
            "partial" => ModifierKind::Partial,
            "abstract" => ModifierKind::Abstract,
            "sealed" => ModifierKind::Sealed,
            "virtual" => ModifierKind::Virtual,
            "override" => ModifierKind::Override,
            "readonly" => ModifierKind::Readonly,
            "const" => ModifierKind::Const,
            "new" => ModifierKind::New,
            "unsafe" => ModifierKind::Unsafe,
            "extern" => ModifierKind::Extern,
            "volatile" => ModifierKind::Volatile,
            "async" => ModifierKind::Async,
            "required" => ModifierKind::Required,
            "ref" => ModifierKind::Ref,
            "fixed" => ModifierKind::Fixed,
            _ => return None,
        };
        Some(kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModifierKind::Public => "public",
            ModifierKind::Internal => "internal",
            ModifierKind::Protected => "protected",
            ModifierKind::Private => "private",
            ModifierKind::File => "file",
            ModifierKind::Static => "static",
            ModifierKind::Partial => "partial",
            ModifierKind::Abstract => "abstract",
            ModifierKind::Sealed => "sealed",
            ModifierKind::Virtual => "virtual",
            ModifierKind::Override => "override",
            ModifierKind::Readonly => "readonly",
            ModifierKind::Const => "const",
            ModifierKind::New => "new",
            ModifierKind::Unsafe => "unsafe",
            ModifierKind::Extern => "extern",
            ModifierKind::Volatile => "volatile",
            ModifierKind::Async => "async",
            ModifierKind::Required => "required",
            ModifierKind::Ref => "ref",
            ModifierKind::Fixed => "fixed",
        }
    }

    /// Accessibility keywords (`file` included, it restricts access to one file)
    pub fn is_accessibility(self) -> bool {
        matches!(
            self,
            ModifierKind::Public
                | ModifierKind::Internal
                | ModifierKind::Protected
                | ModifierKind::Private
                | ModifierKind::File
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub span: Span,
}

/// Helpers over a declaration's modifier list
pub trait ModifierList {
    fn has_modifier(&self, kind: ModifierKind) -> bool;
    fn accessibility(&self) -> Vec<Modifier>;
}

impl ModifierList for [Modifier] {
    fn has_modifier(&self, kind: ModifierKind) -> bool {
        self.iter().any(|m| m.kind == kind)
    }

    fn accessibility(&self) -> Vec<Modifier> {
        self.iter()
            .copied()
            .filter(|m| m.kind.is_accessibility())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variance {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameter {
    pub variance: Option<Variance>,
    pub identifier: Identifier,
}

/// `<TKey, out TValue>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameterList {
    pub parameters: Vec<TypeParameter>,
    pub span: Span,
}

impl TypeParameterList {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.identifier.text.as_str())
    }
}

impl fmt::Display for TypeParameterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<")?;
        for (i, parameter) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match parameter.variance {
                Some(Variance::In) => f.write_str("in ")?,
                Some(Variance::Out) => f.write_str("out ")?,
                None => {}
            }
            f.write_str(&parameter.identifier.text)?;
        }
        f.write_str(">")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSyntax {
    pub kind: TypeSyntaxKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSyntaxKind {
    /// `int`, `string`, `void` ...
    Predefined(String),
    Named(TypeName),
    Nullable(Box<TypeSyntax>),
    Array { element: Box<TypeSyntax>, rank: usize },
    Pointer(Box<TypeSyntax>),
    Tuple(Vec<TypeSyntax>),
}

/// `global::System.Collections.Generic.List<int>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub alias: Option<Identifier>,
    pub segments: Vec<NameSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSegment {
    pub identifier: Identifier,
    pub type_arguments: Vec<TypeSyntax>,
}

impl NameSegment {
    pub fn is_generic(&self) -> bool {
        !self.type_arguments.is_empty()
    }
}

impl TypeSyntax {
    /// Simple name of a named type, looking through `?`.
    ///
    /// `Unity.Collections.NativeArray<float>?` gives `NativeArray`.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.kind {
            TypeSyntaxKind::Named(name) => name
                .segments
                .last()
                .map(|segment| segment.identifier.value_text()),
            TypeSyntaxKind::Nullable(inner) => inner.simple_name(),
            _ => None,
        }
    }

    /// Every non-generic identifier segment anywhere in this type,
    /// including inside type arguments.
    pub fn plain_identifiers(&self) -> Vec<&Identifier> {
        let mut found = Vec::new();
        self.collect_plain_identifiers(&mut found);
        found
    }

    fn collect_plain_identifiers<'a>(&'a self, found: &mut Vec<&'a Identifier>) {
        match &self.kind {
            TypeSyntaxKind::Predefined(_) => {}
            TypeSyntaxKind::Named(name) => {
                for segment in &name.segments {
                    if segment.is_generic() {
                        for argument in &segment.type_arguments {
                            argument.collect_plain_identifiers(found);
                        }
                    } else {
                        found.push(&segment.identifier);
                    }
                }
            }
            TypeSyntaxKind::Nullable(inner)
            | TypeSyntaxKind::Pointer(inner)
            | TypeSyntaxKind::Array { element: inner, .. } => inner.collect_plain_identifiers(found),
            TypeSyntaxKind::Tuple(elements) => {
                for element in elements {
                    element.collect_plain_identifiers(found);
                }
            }
        }
    }
}

impl fmt::Display for TypeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeSyntaxKind::Predefined(name) => f.write_str(name),
            TypeSyntaxKind::Named(name) => {
                if let Some(alias) = &name.alias {
                    write!(f, "{alias}::")?;
                }
                for (i, segment) in name.segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&segment.identifier.text)?;
                    if segment.is_generic() {
                        f.write_str("<")?;
                        write_comma_separated(f, &segment.type_arguments)?;
                        f.write_str(">")?;
                    }
                }
                Ok(())
            }
            TypeSyntaxKind::Nullable(inner) => write!(f, "{inner}?"),
            TypeSyntaxKind::Array { element, rank } => {
                write!(f, "{element}[{}]", ",".repeat(rank.saturating_sub(1)))
            }
            TypeSyntaxKind::Pointer(inner) => write!(f, "{inner}*"),
            TypeSyntaxKind::Tuple(elements) => {
                f.write_str("(")?;
                write_comma_separated(f, elements)?;
                f.write_str(")")
            }
        }
    }
}

fn write_comma_separated(f: &mut fmt::Formatter<'_>, types: &[TypeSyntax]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclarationKind {
    Class,
    Struct,
    Interface,
    RecordClass,
    RecordStruct,
}

impl TypeDeclarationKind {
    /// Keyword(s) that introduce a declaration of this kind
    pub fn keyword(self) -> &'static str {
        match self {
            TypeDeclarationKind::Class => "class",
            TypeDeclarationKind::Struct => "struct",
            TypeDeclarationKind::Interface => "interface",
            TypeDeclarationKind::RecordClass => "record",
            TypeDeclarationKind::RecordStruct => "record struct",
        }
    }
}

/// Class, struct, interface or record declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub kind: TypeDeclarationKind,
    pub identifier: Identifier,
    pub type_parameters: Option<TypeParameterList>,
    /// Parameter count of a primary constructor (`record Point(int X, int Y)`)
    pub primary_constructor: Option<usize>,
    pub base_list: Vec<TypeSyntax>,
    pub members: Vec<MemberDeclaration>,
    pub span: Span,
}

impl TypeDeclaration {
    pub fn has_modifier(&self, kind: ModifierKind) -> bool {
        self.modifiers.has_modifier(kind)
    }

    /// `Name` or `Name<T, U>`
    pub fn display_name(&self) -> String {
        match &self.type_parameters {
            Some(list) => format!("{}{}", self.identifier, list),
            None => self.identifier.text.clone(),
        }
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.members.iter().filter_map(|member| match member {
            MemberDeclaration::Method(method) => Some(method),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub identifier: Identifier,
    /// Underlying integral type (`enum Flags : byte`)
    pub base_type: Option<TypeSyntax>,
    pub members: Vec<EnumMemberDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMemberDeclaration {
    pub attributes: Vec<AttributeList>,
    pub identifier: Identifier,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub ty: TypeSyntax,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclarator {
    pub identifier: Identifier,
    /// Span of the initializer expression, which is not parsed
    pub initializer: Option<Span>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeclaration {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub ty: TypeSyntax,
    pub explicit_interface: Option<String>,
    pub identifier: Identifier,
    /// `{ get; set; }` style property with compiler-generated storage
    pub is_auto: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub attributes: Vec<AttributeList>,
    pub modifiers: Vec<Modifier>,
    pub return_type: TypeSyntax,
    pub explicit_interface: Option<String>,
    pub identifier: Identifier,
    pub type_parameters: Option<TypeParameterList>,
    pub parameter_count: usize,
    pub has_body: bool,
    pub span: Span,
}

/// Members the generators never inspect; only their extent is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtherMember {
    pub kind: OtherMemberKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherMemberKind {
    Constructor,
    Destructor,
    Operator,
    Conversion,
    Indexer,
    Event,
    Delegate,
}

/// Constant expression (enum member initializers)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionKind {
    /// Integer literal token as written: `0x_FF`, `10UL`
    IntegerLiteral(String),
    CharacterLiteral(char),
    /// `Read`, `Access.Read`, `int.MaxValue`
    Name(Vec<Identifier>),
    Unary {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Parenthesized(Box<Expression>),
    Cast {
        ty: TypeSyntax,
        operand: Box<Expression>,
    },
    /// `checked(...)` or `unchecked(...)`
    Checked {
        checked: bool,
        expression: Box<Expression>,
    },
    /// Initializer text outside the supported constant grammar
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    BitwiseNot,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::BitwiseNot => "~",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Remainder,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    BitwiseAnd,
    ExclusiveOr,
    BitwiseOr,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::UnsignedShiftRight => ">>>",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::ExclusiveOr => "^",
            BinaryOperator::BitwiseOr => "|",
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Remainder => 6,
            BinaryOperator::Add | BinaryOperator::Subtract => 5,
            BinaryOperator::ShiftLeft
            | BinaryOperator::ShiftRight
            | BinaryOperator::UnsignedShiftRight => 4,
            BinaryOperator::BitwiseAnd => 3,
            BinaryOperator::ExclusiveOr => 2,
            BinaryOperator::BitwiseOr => 1,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExpressionKind::IntegerLiteral(text) => f.write_str(text),
            ExpressionKind::CharacterLiteral(c) => write!(f, "'{}'", c.escape_default()),
            ExpressionKind::Name(segments) => {
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&segment.text)?;
                }
                Ok(())
            }
            ExpressionKind::Unary { operator, operand } => {
                write!(f, "{}{}", operator.symbol(), operand)
            }
            ExpressionKind::Binary {
                operator,
                left,
                right,
            } => write!(f, "{} {} {}", left, operator.symbol(), right),
            ExpressionKind::Parenthesized(inner) => write!(f, "({inner})"),
            ExpressionKind::Cast { ty, operand } => write!(f, "({ty}){operand}"),
            ExpressionKind::Checked {
                checked,
                expression,
            } => {
                let keyword = if *checked { "checked" } else { "unchecked" };
                write!(f, "{keyword}({expression})")
            }
            ExpressionKind::Unsupported(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(text: &str) -> Identifier {
        Identifier::new(text, Span::default())
    }

    fn named(segments: Vec<NameSegment>) -> TypeSyntax {
        TypeSyntax {
            kind: TypeSyntaxKind::Named(TypeName {
                alias: None,
                segments,
            }),
            span: Span::default(),
        }
    }

    fn segment(text: &str, type_arguments: Vec<TypeSyntax>) -> NameSegment {
        NameSegment {
            identifier: ident(text),
            type_arguments,
        }
    }

    #[test]
    fn test_verbatim_identifier_value() {
        assert_eq!(ident("@class").value_text(), "class");
        assert_eq!(ident("@class").to_string(), "@class");
        assert_eq!(ident("Plain").value_text(), "Plain");
    }

    #[test]
    fn test_simple_name_looks_through_nullable() {
        let inner = named(vec![
            segment("Unity", vec![]),
            segment("NativeArray", vec![named(vec![segment("Vector3", vec![])])]),
        ]);
        let nullable = TypeSyntax {
            kind: TypeSyntaxKind::Nullable(Box::new(inner)),
            span: Span::default(),
        };

        assert_eq!(nullable.simple_name(), Some("NativeArray"));
        assert_eq!(nullable.to_string(), "Unity.NativeArray<Vector3>?");
    }

    #[test]
    fn test_plain_identifiers_skip_generic_segments() {
        let ty = named(vec![segment(
            "SystemBase",
            vec![named(vec![segment("Marker", vec![])])],
        )]);
        let names: Vec<_> = ty.plain_identifiers().iter().map(|i| i.text.as_str()).collect();

        assert_eq!(names, vec!["Marker"]);
    }

    #[test]
    fn test_type_parameter_list_display() {
        let list = TypeParameterList {
            parameters: vec![
                TypeParameter {
                    variance: None,
                    identifier: ident("TKey"),
                },
                TypeParameter {
                    variance: Some(Variance::Out),
                    identifier: ident("TValue"),
                },
            ],
            span: Span::default(),
        };

        assert_eq!(list.to_string(), "<TKey, out TValue>");
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["TKey", "TValue"]);
    }
}
