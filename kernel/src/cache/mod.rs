// Read Result Cache
//
// Process-local memo of Get results. Unbounded: entries leave through
// an explicit clear or when a rollback rewrites their key. Ordinary
// writes do not invalidate it.

use std::sync::Arc;

use crate::response::Response;
use crate::value::Item;

#[derive(Debug, Clone)]
struct CacheEntry {
    table: String,
    key: Item,
    response: Arc<Response>,
}

#[derive(Debug)]
pub struct ResultCache {
    entries: Vec<CacheEntry>,
    enabled: bool,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// Empty, enabled cache.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Linear scan for an entry with an equal table and key.
    ///
    /// Keys are sorted maps, so equality is structural: same fields and
    /// equal values.
    pub fn lookup(&self, table: &str, key: &Item) -> Option<Arc<Response>> {
        self.entries
            .iter()
            .find(|entry| entry.table == table && &entry.key == key)
            .map(|entry| Arc::clone(&entry.response))
    }

    /// Store a response, replacing any entry for the same table and key.
    pub fn insert(&mut self, table: &str, key: Item, response: Arc<Response>) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.table == table && entry.key == key)
        {
            entry.response = response;
            return;
        }
        self.entries.push(CacheEntry {
            table: table.to_string(),
            key,
            response,
        });
    }

    /// Drop the entry for `table` and `key`, if any.
    pub fn evict(&mut self, table: &str, key: &Item) {
        self.entries
            .retain(|entry| !(entry.table == table && &entry.key == key));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
