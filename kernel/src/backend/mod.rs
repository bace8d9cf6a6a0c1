// Backend Driver Abstraction
//
// Defines the capability set the datastore consumes from the
// external key-value/document store. Network calls, retries and
// authentication live in implementations, never here.
//
// This module defines *interfaces only*.

use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::attribute::AttributeMap;
use crate::request::ReturnValues;

/// Error reported by a backend driver.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct BackendError {
    pub code: String,
    pub message: String,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Alias table for attribute names: `#alias` -> field name.
pub type NameAliases = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutItemInput {
    pub table_name: String,
    pub item: AttributeMap,
    pub condition_expression: Option<String>,
    pub expression_attribute_names: NameAliases,
    pub expression_attribute_values: AttributeMap,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutItemOutput {
    pub attributes: Option<AttributeMap>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetItemInput {
    pub table_name: String,
    pub key: AttributeMap,
    pub consistent_read: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetItemOutput {
    pub item: Option<AttributeMap>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteItemInput {
    pub table_name: String,
    pub key: AttributeMap,
    pub condition_expression: Option<String>,
    pub expression_attribute_names: NameAliases,
    pub expression_attribute_values: AttributeMap,
    pub return_values: ReturnValues,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteItemOutput {
    pub attributes: Option<AttributeMap>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateItemInput {
    pub table_name: String,
    pub key: AttributeMap,
    pub update_expression: String,
    pub condition_expression: Option<String>,
    pub expression_attribute_names: NameAliases,
    pub expression_attribute_values: AttributeMap,
    pub return_values: ReturnValues,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateItemOutput {
    pub attributes: Option<AttributeMap>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryInput {
    pub table_name: String,
    pub index_name: Option<String>,
    pub key_condition_expression: String,
    pub filter_expression: Option<String>,
    pub expression_attribute_names: NameAliases,
    pub expression_attribute_values: AttributeMap,
    pub consistent_read: bool,
    pub limit: Option<usize>,
    pub exclusive_start_key: Option<AttributeMap>,
}

/// One page of query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutput {
    pub items: Vec<AttributeMap>,
    /// Item count reported by the backend for this page.
    pub count: usize,
    pub last_evaluated_key: Option<AttributeMap>,
}

/// Storage backend driven by the datastore.
///
/// Every call is synchronous and single-item atomic. Implementations
/// own their retry policy; the datastore never retries.
pub trait Backend {
    fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, BackendError>;

    fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, BackendError>;

    fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, BackendError>;

    fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, BackendError>;

    /// Single page query honoring `limit` and `exclusive_start_key`.
    fn query(&self, input: QueryInput) -> Result<QueryOutput, BackendError>;

    /// Drive the native page iterator.
    ///
    /// Implementations must call `on_page` once per page, in order, with
    /// a last-page flag, and stop as soon as it returns `false`.
    fn query_pages(
        &self,
        input: QueryInput,
        on_page: &mut dyn FnMut(&QueryOutput, bool) -> bool,
    ) -> Result<(), BackendError>;
}

/// Turns a session handle into a connected backend.
pub trait Connect {
    type Backend: Backend;

    /// `endpoint` overrides the driver's default endpoint when set.
    fn connect(&self, endpoint: Option<&str>) -> Self::Backend;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, BackendError> {
        (**self).put_item(input)
    }

    fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, BackendError> {
        (**self).get_item(input)
    }

    fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, BackendError> {
        (**self).delete_item(input)
    }

    fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, BackendError> {
        (**self).update_item(input)
    }

    fn query(&self, input: QueryInput) -> Result<QueryOutput, BackendError> {
        (**self).query(input)
    }

    fn query_pages(
        &self,
        input: QueryInput,
        on_page: &mut dyn FnMut(&QueryOutput, bool) -> bool,
    ) -> Result<(), BackendError> {
        (**self).query_pages(input, on_page)
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, BackendError> {
        (**self).put_item(input)
    }

    fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, BackendError> {
        (**self).get_item(input)
    }

    fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, BackendError> {
        (**self).delete_item(input)
    }

    fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, BackendError> {
        (**self).update_item(input)
    }

    fn query(&self, input: QueryInput) -> Result<QueryOutput, BackendError> {
        (**self).query(input)
    }

    fn query_pages(
        &self,
        input: QueryInput,
        on_page: &mut dyn FnMut(&QueryOutput, bool) -> bool,
    ) -> Result<(), BackendError> {
        (**self).query_pages(input, on_page)
    }
}
