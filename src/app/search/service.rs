//! 商品搜索业务服务

use std::sync::Arc;

use super::model::{Product, MAX_RESULTS};
use crate::core::error::CoreError;
use crate::infrastructure::database::ProductStore;

#[derive(Clone)]
pub struct SearchService {
    store: Arc<dyn ProductStore>,
}

impl SearchService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// 名称包含 `fragment` 的商品，最多 [`MAX_RESULTS`] 条
    ///
    /// `fragment` 原样拼进 `LIKE` 模式，其中的 `%` 和 `_` 仍按通配符处理。
    pub async fn search(&self, fragment: &str) -> Result<Vec<Product>, CoreError> {
        let pattern = format!("%{}%", fragment);
        let mut products = self
            .store
            .search_by_name(&pattern, MAX_RESULTS as i64)
            .await?;
        products.truncate(MAX_RESULTS);
        Ok(products)
    }
}
