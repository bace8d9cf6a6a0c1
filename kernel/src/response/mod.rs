// Operation Response
//
// Output of a single datastore operation. Items stay in wire form;
// accessors unmarshal on demand.

use serde::de::DeserializeOwned;

use crate::adapters::attribute::{
    unmarshal_item, unmarshal_value, AttributeMap, AttributeValue, MarshalError,
};
use crate::error::StoreError;
use crate::value::{Item, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub(crate) items: Vec<AttributeMap>,
    /// Old attributes returned by an update or delete.
    pub(crate) attributes: Option<AttributeMap>,
    pub(crate) page_count: usize,
    pub(crate) last_key: Option<AttributeMap>,
}

impl Response {
    pub fn with_items(items: Vec<AttributeMap>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn with_attributes(attributes: Option<AttributeMap>) -> Self {
        Self {
            attributes,
            ..Default::default()
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[AttributeMap] {
        &self.items
    }

    /// Total number of pages, for `QueryPager` responses.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn old_attributes(&self) -> Option<&AttributeMap> {
        self.attributes.as_ref()
    }

    /// Unmarshaled record at `index`.
    pub fn item(&self, index: usize) -> Result<Option<Item>, StoreError> {
        self.items
            .get(index)
            .map(unmarshal_item)
            .transpose()
            .map_err(StoreError::UnmarshalItemFailed)
    }

    /// Continuation key of a limited `Query`, if more rows remain.
    pub fn last_evaluated_key(&self) -> Result<Option<Item>, StoreError> {
        self.last_key
            .as_ref()
            .map(unmarshal_item)
            .transpose()
            .map_err(StoreError::UnmarshalItemFailed)
    }

    pub fn get_attribute(&self, index: usize, name: &str) -> Option<&AttributeValue> {
        self.items.get(index)?.get(name)
    }

    pub fn get_value(&self, index: usize, name: &str) -> Option<Value> {
        unmarshal_value(self.get_attribute(index, name)?).ok()
    }

    pub fn get_string(&self, index: usize, name: &str) -> Option<&str> {
        self.get_attribute(index, name)?.as_s().ok().map(String::as_str)
    }

    pub fn get_number(&self, index: usize, name: &str) -> Option<f64> {
        self.get_attribute(index, name)?.as_n().ok()?.trim().parse().ok()
    }

    /// Integer view of a number field. `None` for fractional numbers.
    pub fn get_integer(&self, index: usize, name: &str) -> Option<i64> {
        self.get_attribute(index, name)?.as_n().ok()?.trim().parse().ok()
    }

    pub fn get_bool(&self, index: usize, name: &str) -> Option<bool> {
        self.get_attribute(index, name)?.as_bool().ok().copied()
    }

    pub fn get_string_list(&self, index: usize, name: &str) -> Option<Vec<String>> {
        match self.get_attribute(index, name)? {
            AttributeValue::Ss(strings) => Some(strings.clone()),
            AttributeValue::L(items) => items
                .iter()
                .map(|item| item.as_s().ok().cloned())
                .collect(),
            _ => None,
        }
    }

    /// Deserialize one field into `T`.
    ///
    /// Returns `Ok(None)` when the item or field is missing.
    pub fn unmarshal_field<T: DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> Result<Option<T>, StoreError> {
        let Some(attribute) = self.get_attribute(index, name) else {
            return Ok(None);
        };
        let value = unmarshal_value(attribute).map_err(StoreError::UnmarshalItemFailed)?;
        serde_json::from_value(value.to_json())
            .map(Some)
            .map_err(|e| {
                StoreError::UnmarshalItemFailed(MarshalError::Malformed(format!("field `{name}`: {e}")))
            })
    }
}
