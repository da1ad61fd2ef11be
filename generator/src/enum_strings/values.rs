//! Ordinal values of enum members

use fxhash::FxHashSet;
use parser::{ConstantEvaluator, EnumDeclaration, EnumMemberDeclaration, EvalError};
use thiserror::Error;

/// An enum member together with its integer value
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMember<'t> {
    pub declaration: &'t EnumMemberDeclaration,
    pub value: i128,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error(transparent)]
    Evaluation(#[from] EvalError),

    #[error("constant value '{0}' is not an integer")]
    NotAnInteger(String),

    #[error("the implicit value after the previous member overflows")]
    Overflow,
}

/// The first member whose value could not be computed
#[derive(Debug, Clone)]
pub struct MemberValueError<'t> {
    pub member: &'t EnumMemberDeclaration,
    pub error: ValueError,
}

/// Values of every member in declaration order.
///
/// A member with an initializer takes the evaluated constant; one
/// without takes the previous member's value plus one, or zero when it
/// comes first.
pub fn resolve_values<'t>(
    declaration: &'t EnumDeclaration,
    evaluator: &dyn ConstantEvaluator,
) -> Result<Vec<ResolvedMember<'t>>, MemberValueError<'t>> {
    let mut resolved = Vec::with_capacity(declaration.members.len());
    let mut previous: Option<i128> = None;

    for member in &declaration.members {
        let value = member_value(declaration, member, previous, evaluator)
            .map_err(|error| MemberValueError { member, error })?;
        log::trace!("{}.{} = {}", declaration.identifier, member.identifier, value);
        previous = Some(value);
        resolved.push(ResolvedMember {
            declaration: member,
            value,
        });
    }
    Ok(resolved)
}

fn member_value(
    declaration: &EnumDeclaration,
    member: &EnumMemberDeclaration,
    previous: Option<i128>,
    evaluator: &dyn ConstantEvaluator,
) -> Result<i128, ValueError> {
    match (&member.initializer, previous) {
        (Some(initializer), _) => {
            let text = evaluator.constant_value(declaration, initializer)?;
            text.trim()
                .parse::<i128>()
                .map_err(|_| ValueError::NotAnInteger(text))
        }
        (None, Some(previous)) => previous.checked_add(1).ok_or(ValueError::Overflow),
        (None, None) => Ok(0),
    }
}

/// Keep the first member of each value. Later aliases can never be
/// matched by a switch arm, so they are dropped.
pub fn deduplicate(members: Vec<ResolvedMember<'_>>) -> Vec<ResolvedMember<'_>> {
    let mut seen = FxHashSet::default();
    members
        .into_iter()
        .filter(|member| seen.insert(member.value))
        .collect()
}
