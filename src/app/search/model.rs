//! 商品搜索数据模型

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::{CoreError, QUERY_TOO_SHORT};

/// 单次搜索最多返回的条数
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: String,
}

/// `GET /api/search` 的查询参数
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    #[validate(length(min = 3, message = "Query must be at least 3 characters"))]
    pub query: Option<String>,
}

impl SearchParams {
    /// 校验并取出查询字符串，缺失时与过短同样处理
    pub fn into_query(self) -> Result<String, CoreError> {
        self.validate()?;
        self.query
            .ok_or_else(|| CoreError::BadRequest(QUERY_TOO_SHORT.to_string()))
    }
}
