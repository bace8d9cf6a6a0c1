// Itemstore Kernel
//
// Client-side access layer over a key-value item backend: expression
// compilation, marshaling, caching and pseudo-transactions.

pub mod adapters;
pub mod backend;
pub mod cache;
pub mod config;
pub mod datastore;
pub mod error;
pub mod expression;
pub mod pager;
pub mod request;
pub mod response;
pub mod txn;
pub mod value;

pub use datastore::{Datastore, Storer};
pub use error::StoreError;
pub use request::{Action, ConditionKind, Request, RequestCondition, UpdateAction};
pub use response::Response;
pub use value::{Item, Value};
