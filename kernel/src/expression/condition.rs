// Condition Expression Compiler
//
// Ordered conditions -> one boolean expression. Used for put/update/
// delete guards, query key conditions and query filters alike.

use super::ExpressionAliases;
use crate::adapters::attribute::{marshal_value, MarshalError};
use crate::request::{ConditionKind, RequestCondition};
use crate::value::Value;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ConditionError {
    #[error("{kind:?} condition on `{field}` value must be {expected}, got {actual}")]
    WrongValueType {
        field: String,
        kind: ConditionKind,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{kind:?} condition on `{field}` takes no value")]
    UnexpectedValue { field: String, kind: ConditionKind },

    #[error("condition value for `{field}` cannot be encoded: {source}")]
    Encode {
        field: String,
        #[source]
        source: MarshalError,
    },
}

/// Compile `conditions` into an expression, minting aliases into `aliases`.
///
/// An empty list compiles to an empty string. Nothing is reported to the
/// backend on failure; the aliases minted so far are left in place.
pub fn compile_conditions(
    conditions: &[RequestCondition],
    aliases: &mut ExpressionAliases,
) -> Result<String, ConditionError> {
    let mut expression = String::new();

    for (position, condition) in conditions.iter().enumerate() {
        if position > 0 {
            expression.push(' ');
            expression.push_str(condition.relationship.keyword());
            expression.push(' ');
        }

        let name = aliases.mint_name(&condition.field);
        let clause = match condition.kind {
            ConditionKind::Exists => {
                expect_no_value(condition)?;
                format!("attribute_exists({name})")
            }
            ConditionKind::NotExists => {
                expect_no_value(condition)?;
                format!("attribute_not_exists({name})")
            }
            ConditionKind::GreaterThan => {
                let value = operand(condition, aliases, "a number", is_number)?;
                format!("{name} > {value}")
            }
            ConditionKind::LessThan => {
                let value = operand(condition, aliases, "a number", is_number)?;
                format!("{name} < {value}")
            }
            ConditionKind::Equal => {
                let value = operand(condition, aliases, "a number or a string", |v| {
                    is_number(v) || is_string(v)
                })?;
                format!("{name} = {value}")
            }
            ConditionKind::BeginsWith => {
                let value = operand(condition, aliases, "a string", is_string)?;
                format!("begins_with({name}, {value})")
            }
        };

        expression.push_str(&clause);
    }

    Ok(expression)
}

fn is_number(value: &Value) -> bool {
    matches!(value, Value::Number(_))
}

fn is_string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

fn expect_no_value(condition: &RequestCondition) -> Result<(), ConditionError> {
    match condition.value {
        None => Ok(()),
        Some(_) => Err(ConditionError::UnexpectedValue {
            field: condition.field.clone(),
            kind: condition.kind,
        }),
    }
}

/// Type-check the literal and bind it to a fresh value alias.
fn operand(
    condition: &RequestCondition,
    aliases: &mut ExpressionAliases,
    expected: &'static str,
    accepts: impl Fn(&Value) -> bool,
) -> Result<String, ConditionError> {
    let value = match &condition.value {
        Some(value) if accepts(value) => value,
        other => {
            return Err(ConditionError::WrongValueType {
                field: condition.field.clone(),
                kind: condition.kind,
                expected,
                actual: other.as_ref().map(Value::type_name).unwrap_or("nothing"),
            })
        }
    };

    let encoded = marshal_value(value).map_err(|source| ConditionError::Encode {
        field: condition.field.clone(),
        source,
    })?;

    Ok(aliases.mint_value(encoded))
}
