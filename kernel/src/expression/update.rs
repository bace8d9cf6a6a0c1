// Update Expression Compiler
//
// Path/value updates -> `SET ... REMOVE ...`.
//
// Paths are slash-delimited pointers:
// - numeric segments address list positions in place (`list[3]`)
// - `-` as the last segment appends to the list
// - every other segment is an attribute name and gets its own alias

use super::ExpressionAliases;
use crate::adapters::attribute::marshal_item;
use crate::error::StoreError;
use crate::request::{UpdateAction, UpdateValue};
use crate::value::Item;

/// Index written for list appends.
///
/// The backend has no append operator; assigning past the end of a list
/// appends instead. The n-th append of one expression writes
/// `LIST_APPEND_SENTINEL + n`. Lists that already hold that many
/// elements are overwritten in place instead of appended to. Lifting
/// this limit needs a real append primitive from the backend driver.
pub const LIST_APPEND_SENTINEL: usize = 999_000;

const APPEND_MARKER: &str = "-";

/// Translated form of one update path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    pub expression: String,
    pub append: bool,
}

/// Compile `updates` into an update expression, minting aliases into `aliases`.
pub fn compile_updates(
    updates: &[UpdateValue],
    aliases: &mut ExpressionAliases,
) -> Result<String, StoreError> {
    if updates.is_empty() {
        return Err(StoreError::InvalidUpdateExpression(
            "update request carries no updates".into(),
        ));
    }

    let mut set = Vec::new();
    let mut remove = Vec::new();
    let mut appends = 0;
    let first_prefix = aliases.names.len();

    for (ordinal, update) in updates.iter().enumerate() {
        let path = translate_path(&update.path, first_prefix + ordinal, aliases)?;

        match update.action {
            UpdateAction::Delete => {
                if path.append {
                    return Err(StoreError::InvalidUpdateOperation(format!(
                        "cannot remove append marker in `{}`",
                        update.path
                    )));
                }
                remove.push(path.expression);
            }
            UpdateAction::Put | UpdateAction::Update => {
                let single: Item = [(path.expression.clone(), update.value.clone())]
                    .into_iter()
                    .collect();
                let mut marshaled = marshal_item(&single).map_err(StoreError::MarshalItemFailed)?;
                let encoded = marshaled.remove(&path.expression).ok_or_else(|| {
                    StoreError::InvalidUpdateOperation(format!(
                        "empty string cannot be stored at `{}`, remove the path instead",
                        update.path
                    ))
                })?;

                let target = if path.append {
                    let target = format!("{}[{}]", path.expression, LIST_APPEND_SENTINEL + appends);
                    appends += 1;
                    target
                } else {
                    path.expression
                };

                let value = aliases.mint_value(encoded);
                set.push(format!("{target} = {value}"));
            }
        }
    }

    let mut clauses = Vec::with_capacity(2);
    if !set.is_empty() {
        clauses.push(format!("SET {}", set.join(", ")));
    }
    if !remove.is_empty() {
        clauses.push(format!("REMOVE {}", remove.join(", ")));
    }

    Ok(clauses.join(" "))
}

/// Translate a pointer path into backend path syntax.
///
/// Names are aliased as `#<prefix>ename<segment>`. For an append path
/// the returned expression is the list itself, without the marker.
pub fn translate_path(
    path: &str,
    prefix: usize,
    aliases: &mut ExpressionAliases,
) -> Result<TranslatedPath, StoreError> {
    let invalid = |reason: &str| StoreError::InvalidUpdateExpression(format!("{reason} in `{path}`"));

    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Err(invalid("empty path"));
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    let mut expression = String::new();
    let mut append = false;

    for (position, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            return Err(invalid("empty segment"));
        }

        if *segment == APPEND_MARKER {
            if position == 0 || position + 1 != segments.len() {
                return Err(invalid("append marker must be the last segment of a list path"));
            }
            append = true;
            continue;
        }

        if segment.bytes().all(|b| b.is_ascii_digit()) {
            if expression.is_empty() {
                return Err(invalid("list index without an attribute"));
            }
            expression.push('[');
            expression.push_str(segment);
            expression.push(']');
            continue;
        }

        let alias = format!("#{prefix}ename{position}");
        aliases.names.insert(alias.clone(), (*segment).to_string());
        if !expression.is_empty() {
            expression.push('.');
        }
        expression.push_str(&alias);
    }

    Ok(TranslatedPath { expression, append })
}
