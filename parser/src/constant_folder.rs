//! Constant folding for enum member initializers
//!
//! Arithmetic runs on `i128`, wide enough for every C# integral type, and
//! results are wrapped into the enum's underlying type the way the
//! compiled program would store them (`1 << 31` in an `int` enum is
//! `int.MinValue`).
//!
//! Each intermediate value also carries its C# type, following the
//! literal typing and numeric promotion rules, so that shifts mask their
//! count to the operand width (`1 << 32` is `1`) and wrap within it.
//!
//! Names resolve only to members of the enum being folded and to the
//! `MinValue`/`MaxValue` of the integral types. `const` fields declared
//! elsewhere (`A = Limits.Max`) are not visible and fold to
//! [`EvalError::UnknownName`].

use std::num::IntErrorKind;

use crate::cs_ast::*;
use crate::semantic::{ConstantEvaluator, EvalError};

/// `ConstantEvaluator` working from syntax alone
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantFolder;

impl ConstantFolder {
    pub fn new() -> Self {
        Self
    }
}

impl ConstantEvaluator for ConstantFolder {
    fn constant_value(
        &self,
        declaration: &EnumDeclaration,
        initializer: &Expression,
    ) -> Result<String, EvalError> {
        let mut fold = Fold::new(declaration);
        let constant = fold.evaluate(initializer)?;
        Ok(fold.underlying.wrap(constant.value).to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntegralType {
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Char,
}

impl IntegralType {
    fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "sbyte" | "SByte" => IntegralType::SByte,
            "byte" | "Byte" => IntegralType::Byte,
            "short" | "Int16" => IntegralType::Short,
            "ushort" | "UInt16" => IntegralType::UShort,
            "int" | "Int32" => IntegralType::Int,
            "uint" | "UInt32" => IntegralType::UInt,
            "long" | "Int64" => IntegralType::Long,
            "ulong" | "UInt64" => IntegralType::ULong,
            "char" | "Char" => IntegralType::Char,
            _ => return None,
        };
        Some(ty)
    }

    fn from_syntax(ty: &TypeSyntax) -> Option<Self> {
        match &ty.kind {
            TypeSyntaxKind::Predefined(name) => Self::from_name(name),
            TypeSyntaxKind::Named(_) => ty.simple_name().and_then(Self::from_name),
            _ => None,
        }
    }

    fn bits(self) -> u32 {
        match self {
            IntegralType::SByte | IntegralType::Byte => 8,
            IntegralType::Short | IntegralType::UShort | IntegralType::Char => 16,
            IntegralType::Int | IntegralType::UInt => 32,
            IntegralType::Long | IntegralType::ULong => 64,
        }
    }

    fn signed(self) -> bool {
        matches!(
            self,
            IntegralType::SByte | IntegralType::Short | IntegralType::Int | IntegralType::Long
        )
    }

    fn min(self) -> i128 {
        if self.signed() {
            -(1i128 << (self.bits() - 1))
        } else {
            0
        }
    }

    fn max(self) -> i128 {
        if self.signed() {
            (1i128 << (self.bits() - 1)) - 1
        } else {
            (1i128 << self.bits()) - 1
        }
    }

    /// Type an operand takes in arithmetic: small types widen to `int`
    fn promoted(self) -> Self {
        match self {
            IntegralType::SByte
            | IntegralType::Byte
            | IntegralType::Short
            | IntegralType::UShort
            | IntegralType::Char => IntegralType::Int,
            other => other,
        }
    }

    /// Binary numeric promotion
    fn common(self, other: Self) -> Self {
        use IntegralType::*;
        match (self.promoted(), other.promoted()) {
            (ULong, _) | (_, ULong) => ULong,
            (Long, _) | (_, Long) => Long,
            (UInt, Int) | (Int, UInt) => Long,
            (UInt, UInt) => UInt,
            _ => Int,
        }
    }

    /// Low bits of a shift count that a shift of this type honours
    fn shift_mask(self) -> i128 {
        if self.bits() > 32 {
            63
        } else {
            31
        }
    }

    /// Type of an integer literal: the first of its candidate types,
    /// narrowed by the `u`/`l` suffix, that can hold the value
    fn of_literal(text: &str, value: i128) -> Self {
        use IntegralType::*;
        let suffix: Vec<char> = text
            .chars()
            .rev()
            .take_while(|c| matches!(c, 'u' | 'U' | 'l' | 'L'))
            .collect();
        let unsigned = suffix.iter().any(|c| matches!(c, 'u' | 'U'));
        let long = suffix.iter().any(|c| matches!(c, 'l' | 'L'));
        let candidates: &[IntegralType] = match (unsigned, long) {
            (false, false) => &[Int, UInt, Long, ULong],
            (true, false) => &[UInt, ULong],
            (false, true) => &[Long, ULong],
            (true, true) => &[ULong],
        };
        candidates
            .iter()
            .copied()
            .find(|ty| value <= ty.max())
            .unwrap_or(ULong)
    }

    /// Two's complement truncation to this type
    fn wrap(self, value: i128) -> i128 {
        let modulus = 1i128 << self.bits();
        let truncated = value & (modulus - 1);
        if self.signed() && truncated > self.max() {
            truncated - modulus
        } else {
            truncated
        }
    }
}

/// A folded value together with its C# type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Constant {
    value: i128,
    ty: IntegralType,
}

impl Constant {
    fn new(value: i128, ty: IntegralType) -> Self {
        Self { value, ty }
    }
}

/// Evaluation state for one enum declaration
struct Fold<'d> {
    declaration: &'d EnumDeclaration,
    underlying: IntegralType,
    values: Vec<Option<i128>>,
    in_progress: Vec<usize>,
}

impl<'d> Fold<'d> {
    fn new(declaration: &'d EnumDeclaration) -> Self {
        let underlying = declaration
            .base_type
            .as_ref()
            .and_then(IntegralType::from_syntax)
            .unwrap_or(IntegralType::Int);
        Self {
            declaration,
            underlying,
            values: vec![None; declaration.members.len()],
            in_progress: Vec::new(),
        }
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Constant, EvalError> {
        match &expression.kind {
            ExpressionKind::IntegerLiteral(text) => {
                let value = parse_integer_literal(text)?;
                Ok(Constant::new(value, IntegralType::of_literal(text, value)))
            }
            ExpressionKind::CharacterLiteral(c) => Ok(Constant::new(
                i128::from(u32::from(*c)),
                IntegralType::Char,
            )),
            ExpressionKind::Name(segments) => self.lookup(segments),
            ExpressionKind::Unary { operator, operand } => {
                let operand = self.evaluate(operand)?;
                let ty = operand.ty.promoted();
                match operator {
                    UnaryOperator::Plus => Ok(Constant::new(operand.value, ty)),
                    UnaryOperator::Minus => {
                        let ty = if ty == IntegralType::UInt {
                            IntegralType::Long
                        } else {
                            ty
                        };
                        let value = operand.value.checked_neg().ok_or(EvalError::Overflow)?;
                        Ok(Constant::new(value, ty))
                    }
                    UnaryOperator::BitwiseNot => Ok(Constant::new(ty.wrap(!operand.value), ty)),
                }
            }
            ExpressionKind::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply(*operator, left, right)
            }
            ExpressionKind::Parenthesized(inner) => self.evaluate(inner),
            ExpressionKind::Cast { ty, operand } => {
                let operand = self.evaluate(operand)?;
                Ok(match IntegralType::from_syntax(ty) {
                    Some(target) => Constant::new(target.wrap(operand.value), target),
                    // casts to the enum type itself keep the value
                    None => Constant::new(operand.value, self.underlying),
                })
            }
            ExpressionKind::Checked { expression, .. } => self.evaluate(expression),
            ExpressionKind::Unsupported(text) => Err(EvalError::NotConstant(text.clone())),
        }
    }

    fn lookup(&mut self, segments: &[Identifier]) -> Result<Constant, EvalError> {
        let joined = segments
            .iter()
            .map(Identifier::value_text)
            .collect::<Vec<_>>()
            .join(".");

        if let [.., ty, member] = segments {
            if let Some(integral) = IntegralType::from_name(ty.value_text()) {
                match member.value_text() {
                    "MaxValue" => return Ok(Constant::new(integral.max(), integral)),
                    "MinValue" => return Ok(Constant::new(integral.min(), integral)),
                    _ => {}
                }
            }
        }

        let Some((name, qualifier)) = segments.split_last() else {
            return Err(EvalError::UnknownName(joined));
        };
        let declaration = self.declaration;
        let in_scope = qualifier
            .last()
            .map_or(true, |q| q.value_text() == declaration.identifier.value_text());
        if in_scope {
            if let Some(index) = declaration
                .members
                .iter()
                .position(|m| m.identifier.value_text() == name.value_text())
            {
                // sibling members have the underlying type
                let value = self.member_value(index)?;
                return Ok(Constant::new(value, self.underlying));
            }
        }
        Err(EvalError::UnknownName(joined))
    }

    /// Value of the member at `index`: its own initializer, or one more
    /// than the previous member, or zero for the first member
    fn member_value(&mut self, index: usize) -> Result<i128, EvalError> {
        if let Some(value) = self.values[index] {
            return Ok(value);
        }

        let declaration = self.declaration;
        let members = &declaration.members;
        let anchor = (0..=index).rev().find(|&i| members[i].initializer.is_some());

        let value = match anchor {
            None => index as i128,
            Some(anchor) => {
                let base = match self.values[anchor] {
                    Some(value) => value,
                    None => {
                        if self.in_progress.contains(&anchor) {
                            return Err(EvalError::Circular(
                                members[anchor].identifier.value_text().to_string(),
                            ));
                        }
                        let Some(initializer) = &members[anchor].initializer else {
                            return Err(EvalError::UnknownName(
                                members[anchor].identifier.value_text().to_string(),
                            ));
                        };
                        self.in_progress.push(anchor);
                        let result = self.evaluate(initializer);
                        self.in_progress.pop();
                        let value = self.underlying.wrap(result?.value);
                        self.values[anchor] = Some(value);
                        value
                    }
                };
                base.checked_add((index - anchor) as i128)
                    .ok_or(EvalError::Overflow)?
            }
        };

        let value = self.underlying.wrap(value);
        self.values[index] = Some(value);
        Ok(value)
    }
}

fn apply(operator: BinaryOperator, left: Constant, right: Constant) -> Result<Constant, EvalError> {
    let (l, r) = (left.value, right.value);
    let value = match operator {
        BinaryOperator::ShiftLeft
        | BinaryOperator::ShiftRight
        | BinaryOperator::UnsignedShiftRight => return shift(operator, left, right),
        BinaryOperator::Multiply => l.checked_mul(r).ok_or(EvalError::Overflow)?,
        BinaryOperator::Divide => {
            if r == 0 {
                return Err(EvalError::DivideByZero);
            }
            l.checked_div(r).ok_or(EvalError::Overflow)?
        }
        BinaryOperator::Remainder => {
            if r == 0 {
                return Err(EvalError::DivideByZero);
            }
            l.checked_rem(r).ok_or(EvalError::Overflow)?
        }
        BinaryOperator::Add => l.checked_add(r).ok_or(EvalError::Overflow)?,
        BinaryOperator::Subtract => l.checked_sub(r).ok_or(EvalError::Overflow)?,
        BinaryOperator::BitwiseAnd => l & r,
        BinaryOperator::ExclusiveOr => l ^ r,
        BinaryOperator::BitwiseOr => l | r,
    };
    Ok(Constant::new(value, left.ty.common(right.ty)))
}

/// Shifts take the promoted type of the left operand and use only the low
/// five or six bits of an `int` count
fn shift(operator: BinaryOperator, left: Constant, right: Constant) -> Result<Constant, EvalError> {
    if right.ty.promoted() != IntegralType::Int {
        return Err(EvalError::InvalidShift(right.value));
    }
    let ty = left.ty.promoted();
    let count = (right.value & ty.shift_mask()) as u32;
    let operand = ty.wrap(left.value);
    let value = match operator {
        BinaryOperator::ShiftLeft => ty.wrap(operand << count),
        BinaryOperator::UnsignedShiftRight => {
            let width_mask = (1i128 << ty.bits()) - 1;
            ty.wrap((operand & width_mask) >> count)
        }
        _ => operand >> count,
    };
    Ok(Constant::new(value, ty))
}

/// Value of an integer literal token such as `0x_FF`, `0b1010` or `10UL`
pub fn parse_integer_literal(text: &str) -> Result<i128, EvalError> {
    let invalid = || EvalError::InvalidLiteral(text.to_string());
    let cleaned = text
        .trim_end_matches(['u', 'U', 'l', 'L'])
        .replace('_', "");

    let (radix, digits) = if let Some(hex) = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(binary) = cleaned
        .strip_prefix("0b")
        .or_else(|| cleaned.strip_prefix("0B"))
    {
        (2, binary)
    } else {
        (10, cleaned.as_str())
    };
    if digits.is_empty() {
        return Err(invalid());
    }

    u64::from_str_radix(digits, radix)
        .map(i128::from)
        .map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => EvalError::Overflow,
            _ => invalid(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs_parser::parse_compilation_unit;

    fn first_enum(source: &str) -> EnumDeclaration {
        let unit = parse_compilation_unit(source).unwrap();
        unit.members
            .into_iter()
            .find_map(|m| match m {
                MemberDeclaration::Enum(e) => Some(e),
                _ => None,
            })
            .expect("source declares an enum")
    }

    fn values(source: &str) -> Vec<Result<String, EvalError>> {
        let declaration = first_enum(source);
        declaration
            .members
            .iter()
            .filter_map(|m| m.initializer.as_ref())
            .map(|init| ConstantFolder.constant_value(&declaration, init))
            .collect()
    }

    #[test]
    fn test_literals_and_operators() {
        let folded = values("enum E { A = 0x10, B = 1 << 3 | 1, C = (7 - 2) * 3 % 4, D = ~0, E = 'A' }");
        let folded: Vec<_> = folded.into_iter().map(Result::unwrap).collect();
        assert_eq!(folded, vec!["16", "9", "3", "-1", "65"]);
    }

    #[test]
    fn test_sibling_references() {
        let folded = values(
            "enum Access { None, Read, Write = 4, ReadWrite = Read | Write, Next = Access.ReadWrite + 1, After }",
        );
        let folded: Vec<_> = folded.into_iter().map(Result::unwrap).collect();
        assert_eq!(folded, vec!["4", "5", "6"]);
    }

    #[test]
    fn test_implicit_members_after_explicit_reference() {
        let folded = values("enum E { A = 10, B, C, D = C }");
        assert_eq!(folded.last().cloned().unwrap().unwrap(), "12");
    }

    #[test]
    fn test_underlying_type_wrapping() {
        let folded = values("enum E : byte { A = 255, B = (byte)256 }");
        assert_eq!(folded[1].as_deref(), Ok("0"));

        let folded = values("enum Bits { High = 1 << 31 }");
        assert_eq!(folded[0].as_deref(), Ok("-2147483648"));

        let folded = values("enum Wide : ulong { Max = ulong.MaxValue }");
        assert_eq!(folded[0].as_deref(), Ok("18446744073709551615"));
    }

    #[test]
    fn test_shift_count_is_masked_by_operand_width() {
        let folded = values("enum E { A = 1 << 32, B = 1 << 33, C = 1 << -1, D = 8 >> 35 }");
        let folded: Vec<_> = folded.into_iter().map(Result::unwrap).collect();
        assert_eq!(folded, vec!["1", "2", "-2147483648", "1"]);

        let folded = values("enum Wide : long { A = 1L << 32, B = 1 << 32, C = (long)1 << 64, D = 1 << 31 }");
        let folded: Vec<_> = folded.into_iter().map(Result::unwrap).collect();
        assert_eq!(folded, vec!["4294967296", "1", "1", "-2147483648"]);

        let folded = values("enum Wide : ulong { A = 1UL << 63, B = 0xFFFFFFFF << 4, C = -1 >>> 28 }");
        let folded: Vec<_> = folded.into_iter().map(Result::unwrap).collect();
        assert_eq!(folded, vec!["9223372036854775808", "4294967280", "15"]);
    }

    #[test]
    fn test_shift_count_must_be_int() {
        let folded = values("enum E { A = 1 << 2L }");
        assert_eq!(folded[0], Err(EvalError::InvalidShift(2)));
    }

    #[test]
    fn test_literal_types() {
        assert_eq!(IntegralType::of_literal("7", 7), IntegralType::Int);
        assert_eq!(IntegralType::of_literal("0xFFFFFFFF", 0xFFFF_FFFF), IntegralType::UInt);
        assert_eq!(IntegralType::of_literal("4294967296", 1 << 32), IntegralType::Long);
        assert_eq!(IntegralType::of_literal("7u", 7), IntegralType::UInt);
        assert_eq!(IntegralType::of_literal("7L", 7), IntegralType::Long);
        assert_eq!(IntegralType::of_literal("7UL", 7), IntegralType::ULong);
    }

    #[test]
    fn test_const_fields_outside_the_enum_are_unknown() {
        let folded = values("enum E { A = Limits.Max, B = Max }");
        assert!(matches!(folded[0], Err(EvalError::UnknownName(ref n)) if n == "Limits.Max"));
        assert!(matches!(folded[1], Err(EvalError::UnknownName(ref n)) if n == "Max"));
    }

    #[test]
    fn test_errors() {
        let folded = values("enum E { A = B, B = A, C = Missing, D = 1 / 0, F = \"text\".Length }");
        assert!(matches!(folded[0], Err(EvalError::Circular(_))));
        assert!(matches!(folded[2], Err(EvalError::UnknownName(ref n)) if n == "Missing"));
        assert_eq!(folded[3], Err(EvalError::DivideByZero));
        assert!(matches!(folded[4], Err(EvalError::NotConstant(_))));
    }

    #[test]
    fn test_parse_integer_literal() {
        assert_eq!(parse_integer_literal("0x_FF"), Ok(255));
        assert_eq!(parse_integer_literal("0b_1010"), Ok(10));
        assert_eq!(parse_integer_literal("1_000UL"), Ok(1000));
        assert_eq!(parse_integer_literal("18446744073709551616"), Err(EvalError::Overflow));
        assert!(matches!(parse_integer_literal("0x"), Err(EvalError::InvalidLiteral(_))));
    }
}
