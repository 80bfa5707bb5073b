use axum::{
    extract::{Path, Query},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{
    input_sanitization::{sanitize_pagination, sanitize_search_query, Pagination},
    Authenticated,
};

/// Raw query string values; everything arrives as text and is clamped here
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub organization_id: String,
    pub query: String,
    pub pagination: Pagination,
    pub offset: u64,
    pub results: Vec<serde_json::Value>,
}

/// GET /api/organizations/{organization_id}/cases/search
pub async fn search_handler(
    Authenticated(context): Authenticated,
    Path(organization_id): Path<String>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let query = sanitize_search_query(params.q.as_deref());
    let pagination = sanitize_pagination(params.page.as_deref(), params.limit.as_deref());

    tracing::debug!(
        request_id = %context.request_id,
        page = pagination.page,
        limit = pagination.limit,
        "Case search"
    );

    Json(SearchResponse {
        organization_id,
        query,
        offset: pagination.offset(),
        pagination,
        results: Vec::new(),
    })
}
