// Request Model
//
// Backend-agnostic description of a single datastore operation.
// Requests are plain data; the datastore compiles and dispatches them.

use serde::{Deserialize, Serialize};

use crate::value::{Item, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Put,
    Get,
    Update,
    Delete,
    Query,
    QueryPager,
}

impl Action {
    /// Actions that address a single item by key.
    pub fn is_item_addressed(&self) -> bool {
        matches!(self, Action::Put | Action::Get | Action::Update | Action::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionKind {
    Exists,
    NotExists,
    GreaterThan,
    LessThan,
    Equal,
    BeginsWith,
}

/// How a condition joins the one before it. Ignored on the first condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Relationship {
    #[default]
    And,
    Or,
}

impl Relationship {
    pub fn keyword(&self) -> &'static str {
        match self {
            Relationship::And => "AND",
            Relationship::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestCondition {
    pub field: String,
    pub kind: ConditionKind,
    pub relationship: Relationship,
    pub value: Option<Value>,
}

impl RequestCondition {
    pub fn new(
        field: impl Into<String>,
        kind: ConditionKind,
        relationship: Relationship,
        value: Option<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            kind,
            relationship,
            value,
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::new(field, ConditionKind::Exists, Relationship::And, None)
    }

    pub fn not_exists(field: impl Into<String>) -> Self {
        Self::new(field, ConditionKind::NotExists, Relationship::And, None)
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ConditionKind::GreaterThan, Relationship::And, Some(value.into()))
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ConditionKind::LessThan, Relationship::And, Some(value.into()))
    }

    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ConditionKind::Equal, Relationship::And, Some(value.into()))
    }

    pub fn begins_with(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, ConditionKind::BeginsWith, Relationship::And, Some(value.into()))
    }

    /// Join this condition to the previous one with OR.
    pub fn or(mut self) -> Self {
        self.relationship = Relationship::Or;
        self
    }
}

/// What an update does at its path. Put and Update both set the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateAction {
    Put,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateValue {
    pub action: UpdateAction,
    /// Slash-delimited pointer. Numeric segments are list indexes,
    /// a trailing `-` appends to the list.
    pub path: String,
    pub value: Value,
}

/// Old-value return mode for writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReturnValues {
    #[default]
    None,
    AllOld,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Request {
    pub table: String,
    pub action: Action,
    pub key: Item,
    pub item: Item,
    pub updates: Vec<UpdateValue>,
    pub page_size: usize,
    /// 1-based page number for `QueryPager`.
    pub page: usize,
    pub index: Option<String>,
    pub return_values: ReturnValues,
    pub consistent_read: bool,
    /// Skip the result cache for this read.
    pub live_data: bool,
    /// Hard row limit for `Query`. Zero means unlimited.
    pub limit: usize,
    pub last_key: Item,
    pub request_conditions: Vec<RequestCondition>,
    pub result_filter: Vec<RequestCondition>,
}

impl Request {
    pub fn new(table: impl Into<String>, action: Action) -> Self {
        Self {
            table: table.into(),
            action,
            ..Default::default()
        }
    }

    pub fn key(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.key.insert(name.into(), value.into());
        self
    }

    pub fn item(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.item.insert(name.into(), value.into());
        self
    }

    pub fn condition(mut self, condition: RequestCondition) -> Self {
        self.request_conditions.push(condition);
        self
    }

    pub fn and(self, field: impl Into<String>, kind: ConditionKind, value: Option<Value>) -> Self {
        self.condition(RequestCondition::new(field, kind, Relationship::And, value))
    }

    pub fn or(self, field: impl Into<String>, kind: ConditionKind, value: Option<Value>) -> Self {
        self.condition(RequestCondition::new(field, kind, Relationship::Or, value))
    }

    pub fn filter(mut self, condition: RequestCondition) -> Self {
        self.result_filter.push(condition);
        self
    }

    /// Add an update. A missing leading `/` is added.
    pub fn update(mut self, path: &str, action: UpdateAction, value: impl Into<Value>) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        self.updates.push(UpdateValue {
            action,
            path,
            value: value.into(),
        });
        self
    }

    /// Set `field` to `value`, or remove it when the collection is empty.
    pub fn update_add_remove(self, field: &str, len: usize, value: impl Into<Value>) -> Self {
        if len == 0 {
            self.update(field, UpdateAction::Delete, Value::Null)
        } else {
            self.update(field, UpdateAction::Update, value)
        }
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn live_data(mut self) -> Self {
        self.live_data = true;
        self
    }

    pub fn consistent_read(mut self) -> Self {
        self.consistent_read = true;
        self
    }
}
