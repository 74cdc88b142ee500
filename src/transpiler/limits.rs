//! Pagination: `skip`/`offset`/`take`/`limit`/`page` down to one LIMIT clause.

use std::fmt;

use crate::query::Query;

/// Resolved `LIMIT start, count` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub take: i64,
}

impl Pagination {
    /// Resolve the pagination fields of `query`.
    ///
    /// `take` falls back to `limit`, then `default_limit`; `skip` falls back to
    /// `offset`, then 0. A `page` of 1 or more replaces skip with `page * take`.
    /// Returns `None` when the result cannot form a LIMIT clause.
    pub fn resolve(query: &Query, default_limit: u32) -> Option<Self> {
        let take = query
            .take
            .or(query.limit)
            .unwrap_or_else(|| i64::from(default_limit));
        let requested_skip = query.skip.or(query.offset).filter(|skip| *skip >= 0).unwrap_or(0);
        let page_skip = match query.page {
            Some(page) if page >= 1 => page.saturating_mul(take),
            _ => 0,
        };
        let skip = if page_skip > 0 { page_skip } else { requested_skip };

        (skip >= 0 && take >= 1).then_some(Pagination { skip, take })
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LIMIT {}, {}", self.skip, self.take)
    }
}
