// Compensating Operations
//
// Derives, for each logged operation, the request that undoes it.
// Compensations carry the table name exactly as it was dispatched.

use std::collections::HashSet;

use super::{LoggedOperation, OperationLog};
use crate::adapters::attribute::unmarshal_item;
use crate::error::StoreError;
use crate::request::{Action, Request, UpdateAction, UpdateValue};
use crate::value::{lookup_path, Value};

/// Order in which a rollback walks the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackOrder {
    /// Oldest first. Operations that depend on each other may be undone
    /// in the wrong order.
    #[default]
    Recorded,

    /// Newest first.
    Reverse,
}

impl RollbackOrder {
    pub fn arrange<'a>(&self, log: &'a OperationLog) -> Vec<&'a LoggedOperation> {
        match self {
            RollbackOrder::Recorded => log.replay().collect(),
            RollbackOrder::Reverse => log.replay().rev().collect(),
        }
    }
}

/// Build the request that undoes `op`.
///
/// `Ok(None)` means there is nothing to undo: reads, and deletes of
/// items that did not exist.
pub fn compensate(op: &LoggedOperation) -> Result<Option<Request>, StoreError> {
    let original = &op.request;
    let inverse = |action: Action| Request {
        table: original.table.clone(),
        action,
        key: original.key.clone(),
        ..Default::default()
    };

    match original.action {
        Action::Put => Ok(Some(inverse(Action::Delete))),

        Action::Delete => {
            let Some(old) = op.response.old_attributes() else {
                return Ok(None);
            };
            let mut request = inverse(Action::Put);
            request.item = unmarshal_item(old).map_err(StoreError::UnmarshalItemFailed)?;
            Ok(Some(request))
        }

        Action::Update => {
            // No old attributes: the update created the item.
            let Some(old) = op.response.old_attributes() else {
                return Ok(Some(inverse(Action::Delete)));
            };
            let old = unmarshal_item(old).map_err(StoreError::UnmarshalItemFailed)?;

            let mut request = inverse(Action::Update);
            let mut restored = HashSet::new();

            for update in &original.updates {
                let path = restore_target(&update.path);
                if !restored.insert(path.to_string()) {
                    continue;
                }

                request.updates.push(match lookup_path(&old, path) {
                    Some(value) => UpdateValue {
                        action: UpdateAction::Put,
                        path: path.to_string(),
                        value: value.clone(),
                    },
                    None => UpdateValue {
                        action: UpdateAction::Delete,
                        path: path.to_string(),
                        value: Value::Null,
                    },
                });
            }

            Ok(Some(request))
        }

        Action::Get | Action::Query | Action::QueryPager => Ok(None),
    }
}

/// Path to restore for an update. Appends restore the whole list.
fn restore_target(path: &str) -> &str {
    path.strip_suffix("/-").unwrap_or(path)
}
