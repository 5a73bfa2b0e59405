//! 商品搜索处理器

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use tracing::debug;

use super::{
    model::{Product, SearchParams},
    service::SearchService,
};
use crate::core::error::{CoreError, QUERY_TOO_SHORT};

#[derive(Clone)]
pub struct AppState {
    pub search_service: SearchService,
}

/// `GET /api/search?query=...`
pub async fn search_products(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Product>>, CoreError> {
    // 重复的 query 参数等无法解析为单个字符串的情况按校验失败处理
    let Query(params) = params.map_err(|rejection| {
        debug!("Rejected search parameters: {}", rejection);
        CoreError::BadRequest(QUERY_TOO_SHORT.to_string())
    })?;
    let query = params.into_query()?;

    let products = state.search_service.search(&query).await?;
    debug!("Query {:?} matched {} products", query, products.len());

    Ok(Json(products))
}
