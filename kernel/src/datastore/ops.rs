// Per-Action Backend Calls
//
// Each function compiles one request into backend input, performs the
// call and wraps the outcome. Compilation errors surface before the
// backend is touched.

use tracing::debug;

use crate::adapters::attribute::{marshal_item, AttributeMap};
use crate::backend::{
    Backend, DeleteItemInput, GetItemInput, PutItemInput, QueryInput, QueryOutput,
    UpdateItemInput,
};
use crate::error::StoreError;
use crate::expression::{compile_conditions, compile_updates, ExpressionAliases};
use crate::pager::PageWindow;
use crate::request::Request;
use crate::response::Response;
use crate::value::Item;

pub(crate) fn put<B: Backend>(backend: &B, request: &Request) -> Result<Response, StoreError> {
    require_key(request)?;

    // Keys are always stored with the item.
    let mut item = request.item.clone();
    item.extend(request.key.iter().map(|(k, v)| (k.clone(), v.clone())));
    let item = marshal(&item)?;

    let mut aliases = ExpressionAliases::new();
    let condition = compile_conditions(&request.request_conditions, &mut aliases)
        .map_err(StoreError::InvalidRequestCondition)?;

    backend
        .put_item(PutItemInput {
            table_name: request.table.clone(),
            item,
            condition_expression: non_empty(condition),
            expression_attribute_names: aliases.names,
            expression_attribute_values: aliases.values,
        })
        .map_err(StoreError::PutItemFailed)?;

    Ok(Response::default())
}

pub(crate) fn get<B: Backend>(backend: &B, request: &Request) -> Result<Response, StoreError> {
    require_key(request)?;

    let output = backend
        .get_item(GetItemInput {
            table_name: request.table.clone(),
            key: marshal(&request.key)?,
            consistent_read: request.consistent_read,
        })
        .map_err(StoreError::GetItemFailed)?;

    let items = output.item.into_iter().filter(|item| !item.is_empty()).collect();
    Ok(Response::with_items(items))
}

pub(crate) fn delete<B: Backend>(backend: &B, request: &Request) -> Result<Response, StoreError> {
    require_key(request)?;
    let key = marshal(&request.key)?;

    let mut aliases = ExpressionAliases::new();
    let condition = compile_conditions(&request.request_conditions, &mut aliases)
        .map_err(StoreError::InvalidRequestCondition)?;

    let output = backend
        .delete_item(DeleteItemInput {
            table_name: request.table.clone(),
            key,
            condition_expression: non_empty(condition),
            expression_attribute_names: aliases.names,
            expression_attribute_values: aliases.values,
            return_values: request.return_values,
        })
        .map_err(StoreError::DeleteItemFailed)?;

    Ok(Response::with_attributes(output.attributes))
}

pub(crate) fn update<B: Backend>(backend: &B, request: &Request) -> Result<Response, StoreError> {
    require_key(request)?;
    let key = marshal(&request.key)?;

    let mut aliases = ExpressionAliases::new();
    let update_expression = compile_updates(&request.updates, &mut aliases)?;
    let condition = compile_conditions(&request.request_conditions, &mut aliases)
        .map_err(StoreError::InvalidRequestCondition)?;

    debug!(table = %request.table, expression = %update_expression, "compiled update");

    let output = backend
        .update_item(UpdateItemInput {
            table_name: request.table.clone(),
            key,
            update_expression,
            condition_expression: non_empty(condition),
            expression_attribute_names: aliases.names,
            expression_attribute_values: aliases.values,
            return_values: request.return_values,
        })
        .map_err(StoreError::UpdateItemFailed)?;

    Ok(Response::with_attributes(output.attributes))
}

/// Single backend page: native continuation key passes straight through.
pub(crate) fn query<B: Backend>(backend: &B, request: &Request) -> Result<Response, StoreError> {
    let mut aliases = ExpressionAliases::new();
    let key_condition = compile_conditions(&request.request_conditions, &mut aliases)
        .map_err(StoreError::InvalidRequestCondition)?;
    let filter = compile_conditions(&request.result_filter, &mut aliases)
        .map_err(StoreError::InvalidFilterCondition)?;

    let exclusive_start_key = if request.last_key.is_empty() {
        None
    } else {
        Some(marshal(&request.last_key)?)
    };

    let mut input = query_input(request, key_condition, aliases);
    input.filter_expression = non_empty(filter);
    input.limit = (request.limit > 0).then_some(request.limit);
    input.exclusive_start_key = exclusive_start_key;

    let output = backend.query(input).map_err(StoreError::QueryFailed)?;

    let mut items = output.items;
    if request.limit > 0 {
        items.truncate(request.limit);
    }

    let mut response = Response::with_items(items);
    response.last_key = output.last_evaluated_key;
    Ok(response)
}

/// Drive every backend page and cut the client's page window out of it.
pub(crate) fn query_pages<B: Backend>(
    backend: &B,
    request: &Request,
) -> Result<Response, StoreError> {
    let mut window = PageWindow::new(request.page, request.page_size)?;

    let mut aliases = ExpressionAliases::new();
    let key_condition = compile_conditions(&request.request_conditions, &mut aliases)
        .map_err(StoreError::InvalidRequestCondition)?;
    let input = query_input(request, key_condition, aliases);

    backend
        .query_pages(input, &mut |page: &QueryOutput, _last_page: bool| {
            window.offer(&page.items, page.count);
            true
        })
        .map_err(StoreError::QueryFailed)?;

    let page_count = window.page_count();
    debug!(
        table = %request.table,
        seen = window.seen(),
        page_count,
        "paged query finished"
    );

    let mut response = Response::with_items(window.into_items());
    response.page_count = page_count;
    Ok(response)
}

fn query_input(request: &Request, key_condition: String, aliases: ExpressionAliases) -> QueryInput {
    QueryInput {
        table_name: request.table.clone(),
        index_name: request.index.clone(),
        key_condition_expression: key_condition,
        expression_attribute_names: aliases.names,
        expression_attribute_values: aliases.values,
        consistent_read: request.consistent_read,
        ..Default::default()
    }
}

fn require_key(request: &Request) -> Result<(), StoreError> {
    if request.key.is_empty() {
        return Err(StoreError::InvalidRequest(format!(
            "{:?} on `{}` needs a key",
            request.action, request.table
        )));
    }
    Ok(())
}

fn marshal(item: &Item) -> Result<AttributeMap, StoreError> {
    marshal_item(item).map_err(StoreError::MarshalItemFailed)
}

fn non_empty(expression: String) -> Option<String> {
    (!expression.is_empty()).then_some(expression)
}
