// Client-Side Page Windows
//
// The backend pages at sizes of its own choosing. A page window picks
// the client's page `n` of size `p` out of that stream and counts
// every item seen, so the total page count is known at the end.

use crate::adapters::attribute::AttributeMap;
use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub struct PageWindow {
    page_size: usize,
    start: usize,
    budget: usize,
    seen: usize,
    items: Vec<AttributeMap>,
}

impl PageWindow {
    /// Window for 1-based `page` of `page_size` items.
    pub fn new(page: usize, page_size: usize) -> Result<Self, StoreError> {
        if page_size == 0 {
            return Err(StoreError::InvalidRequest("page size must be positive".into()));
        }
        if page == 0 {
            return Err(StoreError::InvalidRequest("pages are numbered from 1".into()));
        }

        let start = page_size.checked_mul(page - 1).ok_or_else(|| {
            StoreError::InvalidRequest(format!("page {page} of size {page_size} is out of range"))
        })?;

        Ok(Self {
            page_size,
            start,
            budget: page_size,
            seen: 0,
            items: Vec::with_capacity(page_size),
        })
    }

    /// Feed one backend page carrying `count` items.
    pub fn offer(&mut self, items: &[AttributeMap], count: usize) {
        if self.seen + count <= self.start {
            self.seen += count;
            return;
        }

        for (offset, item) in items.iter().take(count).enumerate() {
            if self.budget == 0 {
                break;
            }
            if self.seen + offset >= self.start {
                self.items.push(item.clone());
                self.budget -= 1;
            }
        }

        self.seen += count;
    }

    /// Items seen across all pages offered so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// `ceil(seen / page_size)`.
    pub fn page_count(&self) -> usize {
        self.seen.div_ceil(self.page_size)
    }

    pub fn into_items(self) -> Vec<AttributeMap> {
        self.items
    }
}
