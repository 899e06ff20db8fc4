use serde::{Deserialize, Serialize};

use super::ast::ListArgs;

pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Field names of the list result envelope, in declaration order.
pub const ENVELOPE_FIELDS: [&str; 7] = [
    "items",
    "total",
    "limit",
    "page",
    "totalPages",
    "hasNext",
    "hasPrevious",
];

/// Effective `LIMIT` / `OFFSET` pair of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

impl PageWindow {
    pub fn new(limit: u64, offset: u64) -> Self {
        PageWindow { limit, offset }
    }

    /// `page` wins over `offset`; pages below 1 count as 1.
    pub fn resolve(args: &ListArgs, default_limit: u64) -> Self {
        let limit = args.limit.unwrap_or(default_limit);
        let offset = match args.page {
            Some(page) => (page.max(1) - 1).saturating_mul(limit),
            None => args.offset.unwrap_or(0),
        };
        PageWindow { limit, offset }
    }

    /// 1-based page the window starts on.
    pub fn page(&self) -> u64 {
        if self.limit == 0 {
            1
        } else {
            self.offset / self.limit + 1
        }
    }
}

/// Envelope metadata; `items` is carried by the emitted resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageInfo {
    pub fn compute(total: u64, window: PageWindow) -> Self {
        let total_pages = if window.limit == 0 {
            0
        } else {
            total.div_ceil(window.limit)
        };

        PageInfo {
            total,
            limit: window.limit,
            page: window.page(),
            total_pages,
            has_next: window.offset.saturating_add(window.limit) < total,
            has_previous: window.offset > 0,
        }
    }
}
