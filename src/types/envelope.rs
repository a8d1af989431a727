//! Success envelopes.
//!
//! The gateway wraps every successful payload. The client never re-wraps or strips these
//! shapes; callers receive them exactly as the gateway sent them.

use serde::{Deserialize, Serialize};

/// Request correlation metadata attached to every successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub request_id: String,
    /// ISO-8601 server timestamp, kept as sent.
    pub timestamp: String,
}

/// `{ data: T, meta }`
///
/// `data` is required: a 2xx body without it fails to decode, which surfaces the backend
/// contract violation to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> T {
        self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// `ceil(total / perPage)`, or `None` when `perPage` is zero.
    pub fn expected_total_pages(&self) -> Option<u64> {
        if self.per_page == 0 {
            return None;
        }
        Some(self.total.div_ceil(self.per_page))
    }

    /// Check the pagination invariants against a page holding `len` items.
    pub fn is_consistent(&self, len: usize) -> bool {
        match self.expected_total_pages() {
            Some(pages) => pages == self.total_pages && (len as u64) <= self.per_page,
            None => len == 0 && self.total == 0 && self.total_pages == 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `{ data: T[], pagination, meta }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedEnvelope<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
    pub meta: ResponseMeta,
}

impl<T> PaginatedEnvelope<T> {
    pub fn is_consistent(&self) -> bool {
        self.pagination.is_consistent(self.data.len())
    }

    /// Request for the page after this one, if there is one.
    pub fn next_page(&self) -> Option<PageRequest> {
        self.pagination.has_next().then(|| PageRequest {
            page: self.pagination.page + 1,
            per_page: self.pagination.per_page,
        })
    }
}

/// Page selection for list endpoints, sent as `?page=&perPage=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    /// Pages are 1-based; zero for either value is raised to 1. Callers that must reject zero
    /// validate before constructing.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("perPage".to_string(), self.per_page.to_string()),
        ]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}
