// Expression Compilers
//
// Translate structured conditions and updates into the backend's
// textual expression language plus placeholder tables.
//
// Every attribute name and literal is referenced through an alias,
// so reserved words and arbitrary field names never reach the
// expression text.

use crate::adapters::attribute::{AttributeMap, AttributeValue};
use crate::backend::NameAliases;

pub mod condition;
pub mod update;

pub use condition::{compile_conditions, ConditionError};
pub use update::{compile_updates, LIST_APPEND_SENTINEL};

/// Name and value alias tables shared by every expression of one request.
///
/// Conditions and filters compiled into the same tables get disjoint
/// aliases because minting is keyed on the current table sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionAliases {
    pub names: NameAliases,
    pub values: AttributeMap,
}

impl ExpressionAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `field` to a fresh `#enameN` alias.
    pub fn mint_name(&mut self, field: &str) -> String {
        let alias = format!("#ename{}", self.names.len());
        self.names.insert(alias.clone(), field.to_string());
        alias
    }

    /// Bind `value` to a fresh `:valN` alias.
    pub fn mint_value(&mut self, value: AttributeValue) -> String {
        let alias = format!(":val{}", self.values.len());
        self.values.insert(alias.clone(), value);
        alias
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.values.is_empty()
    }
}
