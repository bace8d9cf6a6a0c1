// In-memory backend shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use itemstore_kernel::adapters::attribute::{AttributeMap, AttributeValue};
use itemstore_kernel::backend::{
    Backend, BackendError, Connect, DeleteItemInput, DeleteItemOutput, GetItemInput,
    GetItemOutput, PutItemInput, PutItemOutput, QueryInput, QueryOutput, UpdateItemInput,
    UpdateItemOutput,
};
use itemstore_kernel::request::ReturnValues;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Put(PutItemInput),
    Get(GetItemInput),
    Delete(DeleteItemInput),
    Update(UpdateItemInput),
    Query(QueryInput),
    QueryPages(QueryInput),
}

impl Call {
    pub fn table(&self) -> &str {
        match self {
            Call::Put(input) => &input.table_name,
            Call::Get(input) => &input.table_name,
            Call::Delete(input) => &input.table_name,
            Call::Update(input) => &input.table_name,
            Call::Query(input) | Call::QueryPages(input) => &input.table_name,
        }
    }
}

/// Stores whole items per table. Update expressions are recorded, not
/// evaluated; an update only creates a key-only item when none exists.
pub struct MemoryBackend {
    key_fields: Vec<String>,
    native_page_size: usize,
    tables: Mutex<HashMap<String, Vec<AttributeMap>>>,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<&'static str>>,
    endpoint: Mutex<Option<String>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(&["id"])
    }
}

impl MemoryBackend {
    pub fn new(key_fields: &[&str]) -> Self {
        Self {
            key_fields: key_fields.iter().map(|f| f.to_string()).collect(),
            native_page_size: 7,
            tables: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            endpoint: Mutex::new(None),
        }
    }

    pub fn with_native_page_size(mut self, size: usize) -> Self {
        self.native_page_size = size;
        self
    }

    /// Make every call of `operation` fail: "put", "get", "delete",
    /// "update" or "query".
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    pub fn heal(&self) {
        self.failing.lock().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn endpoint(&self) -> Option<String> {
        self.endpoint.lock().clone()
    }

    pub fn seed(&self, table: &str, item: AttributeMap) {
        self.tables
            .lock()
            .entry(table.to_string())
            .or_default()
            .push(item);
    }

    pub fn stored(&self, table: &str, key: &AttributeMap) -> Option<AttributeMap> {
        let tables = self.tables.lock();
        let rows = tables.get(table)?;
        rows.iter().find(|row| self.matches(row, key)).cloned()
    }

    pub fn table_len(&self, table: &str) -> usize {
        self.tables.lock().get(table).map_or(0, Vec::len)
    }

    fn matches(&self, row: &AttributeMap, key: &AttributeMap) -> bool {
        self.key_fields.iter().all(|f| row.get(f) == key.get(f))
    }

    fn key_of(&self, row: &AttributeMap) -> AttributeMap {
        self.key_fields
            .iter()
            .filter_map(|f| row.get(f).map(|v| (f.clone(), v.clone())))
            .collect()
    }

    fn check(&self, operation: &'static str) -> Result<(), BackendError> {
        if self.failing.lock().contains(operation) {
            return Err(BackendError::new(
                "InternalServerError",
                format!("{operation} unavailable"),
            ));
        }
        Ok(())
    }

    fn remove(&self, table: &str, key: &AttributeMap) -> Option<AttributeMap> {
        let mut tables = self.tables.lock();
        let rows = tables.get_mut(table)?;
        let position = rows.iter().position(|row| self.matches(row, key))?;
        Some(rows.remove(position))
    }

    fn rows(&self, table: &str) -> Vec<AttributeMap> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }
}

impl Backend for MemoryBackend {
    fn put_item(&self, input: PutItemInput) -> Result<PutItemOutput, BackendError> {
        self.calls.lock().push(Call::Put(input.clone()));
        self.check("put")?;

        let key = self.key_of(&input.item);
        let old = self.remove(&input.table_name, &key);
        self.seed(&input.table_name, input.item);
        Ok(PutItemOutput { attributes: old })
    }

    fn get_item(&self, input: GetItemInput) -> Result<GetItemOutput, BackendError> {
        self.calls.lock().push(Call::Get(input.clone()));
        self.check("get")?;

        Ok(GetItemOutput {
            item: self.stored(&input.table_name, &input.key),
        })
    }

    fn delete_item(&self, input: DeleteItemInput) -> Result<DeleteItemOutput, BackendError> {
        self.calls.lock().push(Call::Delete(input.clone()));
        self.check("delete")?;

        let old = self.remove(&input.table_name, &input.key);
        Ok(DeleteItemOutput {
            attributes: match input.return_values {
                ReturnValues::AllOld => old,
                ReturnValues::None => None,
            },
        })
    }

    fn update_item(&self, input: UpdateItemInput) -> Result<UpdateItemOutput, BackendError> {
        self.calls.lock().push(Call::Update(input.clone()));
        self.check("update")?;

        let old = self.stored(&input.table_name, &input.key);
        if old.is_none() {
            self.seed(&input.table_name, input.key.clone());
        }
        Ok(UpdateItemOutput {
            attributes: match input.return_values {
                ReturnValues::AllOld => old,
                ReturnValues::None => None,
            },
        })
    }

    fn query(&self, input: QueryInput) -> Result<QueryOutput, BackendError> {
        self.calls.lock().push(Call::Query(input.clone()));
        self.check("query")?;

        let rows = self.rows(&input.table_name);
        let start = match &input.exclusive_start_key {
            Some(key) => rows
                .iter()
                .position(|row| self.matches(row, key))
                .map_or(rows.len(), |i| i + 1),
            None => 0,
        };
        let end = match input.limit {
            Some(limit) => (start + limit).min(rows.len()),
            None => rows.len(),
        };

        let items = rows[start..end].to_vec();
        let last_evaluated_key = (end < rows.len())
            .then(|| items.last().map(|row| self.key_of(row)))
            .flatten();

        Ok(QueryOutput {
            count: items.len(),
            items,
            last_evaluated_key,
        })
    }

    fn query_pages(
        &self,
        input: QueryInput,
        on_page: &mut dyn FnMut(&QueryOutput, bool) -> bool,
    ) -> Result<(), BackendError> {
        self.calls.lock().push(Call::QueryPages(input.clone()));
        self.check("query")?;

        let rows = self.rows(&input.table_name);
        let pages: Vec<&[AttributeMap]> = rows.chunks(self.native_page_size).collect();
        let total = pages.len();

        for (i, chunk) in pages.into_iter().enumerate() {
            let page = QueryOutput {
                items: chunk.to_vec(),
                count: chunk.len(),
                last_evaluated_key: None,
            };
            if !on_page(&page, i + 1 == total) {
                break;
            }
        }
        Ok(())
    }
}

/// Session handle handing out one shared backend.
#[derive(Default, Clone)]
pub struct MemorySession {
    pub backend: Arc<MemoryBackend>,
}

impl Connect for MemorySession {
    type Backend = Arc<MemoryBackend>;

    fn connect(&self, endpoint: Option<&str>) -> Self::Backend {
        *self.backend.endpoint.lock() = endpoint.map(str::to_string);
        Arc::clone(&self.backend)
    }
}

pub fn s(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

pub fn n(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

pub fn attrs(fields: &[(&str, AttributeValue)]) -> AttributeMap {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
