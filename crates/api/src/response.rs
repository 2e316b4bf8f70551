//! Shared response envelope types for API handlers.
//!
//! List and entity responses use a `{ "data": ... }` envelope; paginated
//! listings add a `pagination` block.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Page position echoed back with list results.
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// `{ "data": [...], "pagination": {...} }` envelope.
#[derive(Debug, Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
