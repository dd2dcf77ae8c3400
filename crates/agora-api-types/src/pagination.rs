use serde::{Deserialize, Serialize};

/// Query parameters accepted by every listing route.
///
/// Missing, zero or negative `page`/`limit` fall back to server defaults
/// instead of failing the request, hence the signed fields. `sort` and
/// `topics` are passed through as raw tokens; the service layer validates
/// them so an unrecognized value gets a proper `invalid_request` error
/// rather than a deserialization failure.
///
/// **ROUTE**: `GET /posts?topics=1,2&sort=votes&page=2&limit=10`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListQuery {
    /// Comma-separated topic ids. Posts tagged with *any* of them match.
    pub topics: Option<String>,
    /// Sort token: `new`, `old` or `votes`.
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// One page of a listing plus the size of the whole filtered result set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Count after filtering, before pagination; for client-side pagers.
    pub total: i64,
}
