// Tagged Attribute Wire Format
//
// The backend exchanges items as maps of DynamoDB attribute values.
// `item_from_json` reads the backend's JSON form, e.g.
// `{"S": "text"}`, `{"N": "42"}`, `{"M": {...}}`.

use serde_json::Value as JsonValue;
use std::collections::HashMap;

mod marshal;

pub use aws_sdk_dynamodb::types::AttributeValue;
pub use marshal::{marshal_item, marshal_value, unmarshal_item, unmarshal_value, MarshalError};

/// A single item on the wire.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// Parse a wire item from its JSON form.
pub fn item_from_json(json: &str) -> Result<AttributeMap, MarshalError> {
    let fields: serde_json::Map<String, JsonValue> =
        serde_json::from_str(json).map_err(|e| MarshalError::Malformed(e.to_string()))?;
    fields
        .iter()
        .map(|(name, value)| Ok((name.clone(), attribute_from_json(value)?)))
        .collect()
}

fn attribute_from_json(json: &JsonValue) -> Result<AttributeValue, MarshalError> {
    let malformed = || MarshalError::Malformed(format!("`{json}` is not a tagged attribute"));

    let JsonValue::Object(tagged) = json else {
        return Err(malformed());
    };
    let mut entries = tagged.iter();
    let (Some((tag, inner)), None) = (entries.next(), entries.next()) else {
        return Err(malformed());
    };

    Ok(match (tag.as_str(), inner) {
        ("S", JsonValue::String(s)) => AttributeValue::S(s.clone()),
        ("N", JsonValue::String(n)) => AttributeValue::N(n.clone()),
        ("BOOL", JsonValue::Bool(b)) => AttributeValue::Bool(*b),
        ("NULL", JsonValue::Bool(b)) => AttributeValue::Null(*b),
        ("L", JsonValue::Array(items)) => AttributeValue::L(
            items
                .iter()
                .map(attribute_from_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        ("M", JsonValue::Object(map)) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), attribute_from_json(v)?)))
                .collect::<Result<AttributeMap, MarshalError>>()?,
        ),
        ("SS", JsonValue::Array(items)) => AttributeValue::Ss(strings(items).ok_or_else(malformed)?),
        ("NS", JsonValue::Array(items)) => AttributeValue::Ns(strings(items).ok_or_else(malformed)?),
        _ => return Err(malformed()),
    })
}

fn strings(items: &[JsonValue]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
