//! 搜索请求的发送端

use async_trait::async_trait;
use tracing::debug;

use super::ClientError;
use crate::app::search::model::Product;

/// 远程搜索接口
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ClientError>;
}

/// 通过 HTTP 调用 `GET /api/search`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/search", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(&self, query: &str) -> Result<Vec<Product>, ClientError> {
        debug!("GET {}?query={}", self.endpoint, query);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        Ok(response.json::<Vec<Product>>().await?)
    }
}
