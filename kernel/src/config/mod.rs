// Datastore Configuration
//
// Opaque option store consumed when a datastore is opened.
// Values are typed at the accessor, not at insertion.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOption {
    /// Backend session handle (a `Connect` implementation).
    Session,

    /// Backend endpoint override.
    Endpoint,

    /// Namespace prepended to every table name.
    TablePrefix,
}

#[derive(Clone)]
pub enum OptionValue {
    Str(String),
    Int(i64),
    Handle(Arc<dyn Any + Send + Sync>),
}

impl OptionValue {
    fn type_name(&self) -> &'static str {
        match self {
            OptionValue::Str(_) => "string",
            OptionValue::Int(_) => "integer",
            OptionValue::Handle(_) => "handle",
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            OptionValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            OptionValue::Handle(_) => f.write_str("Handle(..)"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("option {option:?} holds a {actual}, expected {expected}")]
    WrongType {
        option: StoreOption,
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    options: HashMap<StoreOption, OptionValue>,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, option: StoreOption, value: OptionValue) -> &mut Self {
        self.options.insert(option, value);
        self
    }

    pub fn with_string(mut self, option: StoreOption, value: impl Into<String>) -> Self {
        self.set(option, OptionValue::Str(value.into()));
        self
    }

    pub fn with_int(mut self, option: StoreOption, value: i64) -> Self {
        self.set(option, OptionValue::Int(value));
        self
    }

    pub fn with_handle<T: Any + Send + Sync>(mut self, option: StoreOption, handle: T) -> Self {
        self.set(option, OptionValue::Handle(Arc::new(handle)));
        self
    }

    pub fn get(&self, option: StoreOption) -> Option<&OptionValue> {
        self.options.get(&option)
    }

    pub fn get_string(&self, option: StoreOption) -> Result<Option<&str>, ConfigError> {
        match self.get(option) {
            None => Ok(None),
            Some(OptionValue::Str(s)) => Ok(Some(s)),
            Some(other) => Err(wrong_type(option, "string", other)),
        }
    }

    pub fn get_int(&self, option: StoreOption) -> Result<Option<i64>, ConfigError> {
        match self.get(option) {
            None => Ok(None),
            Some(OptionValue::Int(i)) => Ok(Some(*i)),
            Some(other) => Err(wrong_type(option, "integer", other)),
        }
    }

    /// Typed view of a handle option.
    pub fn get_handle<T: Any + Send + Sync>(
        &self,
        option: StoreOption,
    ) -> Result<Option<Arc<T>>, ConfigError> {
        match self.get(option) {
            None => Ok(None),
            Some(OptionValue::Handle(handle)) => Arc::clone(handle)
                .downcast::<T>()
                .map(Some)
                .map_err(|_| ConfigError::WrongType {
                    option,
                    expected: std::any::type_name::<T>(),
                    actual: "handle of another type",
                }),
            Some(other) => Err(wrong_type(option, "handle", other)),
        }
    }
}

fn wrong_type(option: StoreOption, expected: &'static str, actual: &OptionValue) -> ConfigError {
    ConfigError::WrongType {
        option,
        expected,
        actual: actual.type_name(),
    }
}
