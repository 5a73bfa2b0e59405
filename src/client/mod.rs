//! 搜索客户端：输入防抖、条件请求与渲染状态

pub mod backend;
pub mod debouncer;
pub mod search;
pub mod view;

pub use backend::{HttpBackend, SearchBackend};
pub use debouncer::Debouncer;
pub use search::{LiveSearch, SearchOptions, SearchState, SearchStatus};
pub use view::SearchView;

/// 客户端错误，只用于日志，不向用户展示
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {0}")]
    Status(u16),
}
