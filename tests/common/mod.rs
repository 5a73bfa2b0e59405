//! 测试用内存商品库
#![allow(dead_code)]

use async_trait::async_trait;
use live_search::app::search::model::Product;
use live_search::infrastructure::database::ProductStore;

pub struct MemoryStore {
    products: Vec<Product>,
    failing: bool,
}

impl MemoryStore {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let products = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                let name = name.into();
                Product {
                    id: i as i32 + 1,
                    description: format!("About {}", name),
                    name,
                }
            })
            .collect();
        Self {
            products,
            failing: false,
        }
    }

    /// 每次查询都返回数据库错误
    pub fn failing() -> Self {
        Self {
            products: Vec::new(),
            failing: true,
        }
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn search_by_name(&self, pattern: &str, limit: i64) -> Result<Vec<Product>, sqlx::Error> {
        if self.failing {
            return Err(sqlx::Error::PoolTimedOut);
        }

        let fragment = pattern.trim_start_matches('%').trim_end_matches('%');
        Ok(self
            .products
            .iter()
            .filter(|p| p.name.contains(fragment))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
