// Datastore Handle
//
// Single synchronous entry point over a backend driver. Owns the
// table prefix, the read cache and the transaction log.
//
// A handle is not meant to be shared: every mutating method takes
// `&mut self`, so concurrent use needs external serialization.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{Backend, Connect};
use crate::cache::ResultCache;
use crate::config::{ConfigError, StoreConfig, StoreOption};
use crate::error::StoreError;
use crate::request::{Action, Request, ReturnValues};
use crate::response::Response;
use crate::txn::{compensate, RollbackOrder, TransactionId, TransactionState};

mod ops;

/// Operations every datastore handle offers.
pub trait Storer {
    /// Run one request. The table name is prefixed before dispatch.
    fn run(&mut self, request: Request) -> Result<Arc<Response>, StoreError>;

    /// Begin recording successful operations. Restarts an active transaction.
    fn start_transaction(&mut self);

    /// Stop recording and forget the log.
    fn finish_transaction(&mut self);

    /// Undo every recorded operation.
    ///
    /// Every compensation is attempted. A non-empty result means the
    /// rollback was partial; callers must check it.
    fn rollback(&mut self) -> Vec<StoreError>;

    fn clear_cache(&mut self);

    fn cache_off(&mut self);

    fn cache_on(&mut self);
}

pub struct Datastore<B> {
    backend: B,
    table_prefix: String,
    transaction: TransactionState,
    cache: ResultCache,
    rollback_order: RollbackOrder,
}

impl<B: Backend> Datastore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            table_prefix: String::new(),
            transaction: TransactionState::Idle,
            cache: ResultCache::new(),
            rollback_order: RollbackOrder::default(),
        }
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Open a datastore from configuration.
    ///
    /// The session option must hold a `C`; a default session is used
    /// when it is absent.
    pub fn from_config<C>(config: &StoreConfig) -> Result<Self, ConfigError>
    where
        C: Connect<Backend = B> + Default + Send + Sync + 'static,
    {
        let session = config
            .get_handle::<C>(StoreOption::Session)?
            .unwrap_or_else(|| Arc::new(C::default()));
        let endpoint = config.get_string(StoreOption::Endpoint)?;
        let prefix = config
            .get_string(StoreOption::TablePrefix)?
            .unwrap_or_default();

        debug!(endpoint = endpoint.unwrap_or("default"), prefix, "opening datastore");

        Ok(Self::new(session.connect(endpoint)).with_table_prefix(prefix))
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn transaction_id(&self) -> Option<TransactionId> {
        self.transaction.log().map(|log| log.id())
    }

    /// Operations recorded by the active transaction.
    pub fn pending_operations(&self) -> usize {
        self.transaction.log().map_or(0, |log| log.len())
    }

    pub fn set_rollback_order(&mut self, order: RollbackOrder) {
        self.rollback_order = order;
    }

    /// Roll back with an explicit walk order.
    pub fn rollback_with(&mut self, order: RollbackOrder) -> Vec<StoreError> {
        // Idle before compensating, so compensations are not logged.
        let Some(log) = self.transaction.take() else {
            return Vec::new();
        };
        let txn = log.id();
        let mut failures = Vec::new();

        for op in order.arrange(&log) {
            let undone = compensate(op).and_then(|undo| match undo {
                Some(request) => {
                    // A cached read of this key no longer reflects the backend.
                    self.cache.evict(&request.table, &request.key);
                    self.dispatch(request).map(|_| ())
                }
                None => Ok(()),
            });

            if let Err(err) = undone {
                warn!(
                    %txn,
                    action = ?op.request.action,
                    table = %op.request.table,
                    error = %err,
                    "compensation failed"
                );
                failures.push(err);
            }
        }

        info!(
            %txn,
            operations = log.len(),
            failures = failures.len(),
            ?order,
            "rollback finished"
        );

        failures
    }

    /// Dispatch a request whose table name is already final.
    fn dispatch(&mut self, mut request: Request) -> Result<Arc<Response>, StoreError> {
        let action = request.action;
        debug!(table = %request.table, ?action, "dispatching request");

        if action == Action::Get && !request.live_data && self.cache.is_enabled() {
            if let Some(hit) = self.cache.lookup(&request.table, &request.key) {
                debug!(table = %request.table, "cache hit");
                return Ok(hit);
            }
        }

        // Old values are needed to undo updates and deletes.
        if self.transaction.is_active() && matches!(action, Action::Update | Action::Delete) {
            request.return_values = ReturnValues::AllOld;
        }

        let response = Arc::new(match action {
            Action::Put => ops::put(&self.backend, &request)?,
            Action::Get => ops::get(&self.backend, &request)?,
            Action::Update => ops::update(&self.backend, &request)?,
            Action::Delete => ops::delete(&self.backend, &request)?,
            Action::Query => ops::query(&self.backend, &request)?,
            Action::QueryPager => ops::query_pages(&self.backend, &request)?,
        });

        if action == Action::Get && self.cache.is_enabled() {
            self.cache
                .insert(&request.table, request.key.clone(), Arc::clone(&response));
        }

        self.transaction.record(request, Arc::clone(&response));
        Ok(response)
    }
}

impl<B: Backend> Storer for Datastore<B> {
    fn run(&mut self, mut request: Request) -> Result<Arc<Response>, StoreError> {
        request.table = format!("{}{}", self.table_prefix, request.table);
        self.dispatch(request)
    }

    fn start_transaction(&mut self) {
        if self.transaction.is_active() {
            warn!(
                operations = self.pending_operations(),
                "restarting active transaction, recorded operations dropped"
            );
        }
        let txn = self.transaction.begin();
        debug!(%txn, "transaction started");
    }

    fn finish_transaction(&mut self) {
        if let Some(log) = self.transaction.take() {
            debug!(txn = %log.id(), operations = log.len(), "transaction finished");
        }
    }

    fn rollback(&mut self) -> Vec<StoreError> {
        self.rollback_with(self.rollback_order)
    }

    fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn cache_off(&mut self) {
        self.cache.disable();
    }

    fn cache_on(&mut self) {
        self.cache.enable();
    }
}
