use crate::adapters::attribute::MarshalError;
use crate::backend::BackendError;
use crate::expression::ConditionError;

/// Errors returned by [`crate::datastore::Storer::run`].
///
/// Compilation errors (conditions, updates, marshaling) are raised before
/// any backend call. Backend failures are wrapped per action and never
/// retried here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid request condition: {0}")]
    InvalidRequestCondition(#[source] ConditionError),

    #[error("invalid filter condition: {0}")]
    InvalidFilterCondition(#[source] ConditionError),

    #[error("invalid update expression: {0}")]
    InvalidUpdateExpression(String),

    #[error("invalid update operation: {0}")]
    InvalidUpdateOperation(String),

    #[error("could not marshal item: {0}")]
    MarshalItemFailed(#[source] MarshalError),

    #[error("could not unmarshal item: {0}")]
    UnmarshalItemFailed(#[source] MarshalError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unable to put item in the database: {0}")]
    PutItemFailed(#[source] BackendError),

    #[error("unable to retrieve item from the database: {0}")]
    GetItemFailed(#[source] BackendError),

    #[error("unable to delete item in the database: {0}")]
    DeleteItemFailed(#[source] BackendError),

    #[error("unable to update item in the database: {0}")]
    UpdateItemFailed(#[source] BackendError),

    #[error("unable to query the database: {0}")]
    QueryFailed(#[source] BackendError),
}

impl StoreError {
    /// Stable error code, independent of the message text.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::InvalidRequestCondition(_) => "InvalidRequestCondition",
            StoreError::InvalidFilterCondition(_) => "InvalidFilterCondition",
            StoreError::InvalidUpdateExpression(_) => "InvalidUpdateExpression",
            StoreError::InvalidUpdateOperation(_) => "InvalidUpdateOperation",
            StoreError::MarshalItemFailed(_) => "MarshalItemFailed",
            StoreError::UnmarshalItemFailed(_) => "UnmarshalItemFailed",
            StoreError::InvalidRequest(_) => "InvalidRequest",
            StoreError::PutItemFailed(_) => "PutItemFailed",
            StoreError::GetItemFailed(_) => "GetItemFailed",
            StoreError::DeleteItemFailed(_) => "DeleteItemFailed",
            StoreError::UpdateItemFailed(_) => "UpdateItemFailed",
            StoreError::QueryFailed(_) => "QueryFailed",
        }
    }

    /// True for errors raised by the backend driver rather than by local validation.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            StoreError::PutItemFailed(_)
                | StoreError::GetItemFailed(_)
                | StoreError::DeleteItemFailed(_)
                | StoreError::UpdateItemFailed(_)
                | StoreError::QueryFailed(_)
        )
    }
}
