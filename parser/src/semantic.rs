//! Semantic queries the generators need beyond the syntax tree

use thiserror::Error;

use crate::cs_ast::{EnumDeclaration, Expression};

/// Why an enum member initializer has no integer value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("'{0}' is not a constant integer expression")]
    NotConstant(String),

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("the value of '{0}' depends on itself")]
    Circular(String),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("division by zero")]
    DivideByZero,

    #[error("shift count {0} is not an int")]
    InvalidShift(i128),

    #[error("invalid integer literal '{0}'")]
    InvalidLiteral(String),
}

/// Computes constant values of enum member initializers.
///
/// The value comes back as decimal text, the way a compiler's constant
/// value would be printed; the enum pipeline parses it back into an
/// integer. Implementations see the whole enum so initializers may refer
/// to sibling members.
pub trait ConstantEvaluator {
    fn constant_value(
        &self,
        declaration: &EnumDeclaration,
        initializer: &Expression,
    ) -> Result<String, EvalError>;
}
