// Marshal / Unmarshal
//
// Generic values <-> tagged wire values.
//
// Marshal rules for top-level fields:
// - an empty string is skipped entirely
// - an empty list or map is written as an empty collection, never NULL

use super::{AttributeMap, AttributeValue};
use crate::value::{Item, Value};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MarshalError {
    #[error("number {0} has no decimal representation")]
    NonFiniteNumber(String),

    #[error("malformed attribute value: {0}")]
    Malformed(String),

    #[error("{0} attributes have no generic value")]
    Unsupported(&'static str),
}

/// Marshal a field→value mapping into a wire item.
pub fn marshal_item(item: &Item) -> Result<AttributeMap, MarshalError> {
    let mut out = AttributeMap::with_capacity(item.len());
    for (name, value) in item {
        if matches!(value, Value::String(s) if s.is_empty()) {
            continue;
        }
        out.insert(name.clone(), marshal_value(value)?);
    }
    Ok(out)
}

/// Marshal one value. Empty strings are kept at this level.
pub fn marshal_value(value: &Value) -> Result<AttributeValue, MarshalError> {
    Ok(match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(number_text(*n)?),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::List(items) => AttributeValue::L(
            items
                .iter()
                .map(marshal_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Map(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), marshal_value(v)?)))
                .collect::<Result<AttributeMap, MarshalError>>()?,
        ),
    })
}

fn number_text(n: f64) -> Result<String, MarshalError> {
    if !n.is_finite() {
        return Err(MarshalError::NonFiniteNumber(n.to_string()));
    }
    Ok(n.to_string())
}

/// Unmarshal a wire item. Numbers always come back as `Value::Number`.
pub fn unmarshal_item(item: &AttributeMap) -> Result<Item, MarshalError> {
    item.iter()
        .map(|(k, v)| Ok((k.clone(), unmarshal_value(v)?)))
        .collect()
}

pub fn unmarshal_value(value: &AttributeValue) -> Result<Value, MarshalError> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_number(n)?),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::List(
            items
                .iter()
                .map(unmarshal_value)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        AttributeValue::M(map) => Value::Map(unmarshal_item(map)?),
        AttributeValue::Ss(strings) => {
            Value::List(strings.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(numbers) => Value::List(
            numbers
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        AttributeValue::B(_) | AttributeValue::Bs(_) => {
            return Err(MarshalError::Unsupported("binary"))
        }
        _ => return Err(MarshalError::Unsupported("unknown")),
    })
}

fn parse_number(text: &str) -> Result<f64, MarshalError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| MarshalError::Malformed(format!("`{text}` is not a number")))
}
