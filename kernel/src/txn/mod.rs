// Pseudo-Transactions
//
// The backend only offers single-item atomic writes. A transaction
// here is a log of operations that succeeded while it was active;
// rollback derives and replays a compensating request for each.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::request::Request;
use crate::response::Response;

pub mod rollback;

pub use rollback::{compensate, RollbackOrder};

/// Stable identifier for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub Uuid);

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A successful operation, captured as dispatched.
#[derive(Debug, Clone)]
pub struct LoggedOperation {
    pub request: Request,
    pub response: Arc<Response>,
}

/// Append-only log of one transaction.
#[derive(Debug)]
pub struct OperationLog {
    id: TransactionId,
    entries: Vec<LoggedOperation>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self {
            id: TransactionId(Uuid::new_v4()),
            entries: Vec::new(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn append(&mut self, request: Request, response: Arc<Response>) {
        self.entries.push(LoggedOperation { request, response });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the order they were recorded.
    pub fn replay(&self) -> impl DoubleEndedIterator<Item = &LoggedOperation> {
        self.entries.iter()
    }
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction lifecycle of one datastore handle.
///
/// Rolling back is not a resting state: the log is taken out first,
/// so compensations run while the handle is already idle.
#[derive(Debug, Default)]
pub enum TransactionState {
    #[default]
    Idle,
    Active(OperationLog),
}

impl TransactionState {
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionState::Active(_))
    }

    /// Start a fresh log, discarding any previous one.
    pub fn begin(&mut self) -> TransactionId {
        let log = OperationLog::new();
        let id = log.id();
        *self = TransactionState::Active(log);
        id
    }

    /// Record a successful operation. No-op while idle.
    pub fn record(&mut self, request: Request, response: Arc<Response>) {
        if let TransactionState::Active(log) = self {
            log.append(request, response);
        }
    }

    /// Return to idle, handing back the log if there was one.
    pub fn take(&mut self) -> Option<OperationLog> {
        match std::mem::take(self) {
            TransactionState::Active(log) => Some(log),
            TransactionState::Idle => None,
        }
    }

    pub fn log(&self) -> Option<&OperationLog> {
        match self {
            TransactionState::Active(log) => Some(log),
            TransactionState::Idle => None,
        }
    }
}
